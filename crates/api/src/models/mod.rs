//! Domain models for the API.
//!
//! Models serialize in the shape the storefront SPA consumes: camelCase
//! field names and the entity ID under `_id`.

pub mod account;
pub mod message;
pub mod order;
pub mod product;
pub mod review;

pub use account::{AdminAccount, Customer};
pub use message::ContactMessage;
pub use order::{Order, OrderItem, ShippingInfo, UserInfo};
pub use product::Product;
pub use review::Review;
