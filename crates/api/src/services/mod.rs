//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Admin passwords, token issuing and verification
//! - `google` - Google ID token verification via the tokeninfo endpoint
//! - `checkout` - Cart merging, pricing and transactional order placement
//! - `reviews` - Review eligibility rules

pub mod auth;
pub mod checkout;
pub mod google;
pub mod reviews;
