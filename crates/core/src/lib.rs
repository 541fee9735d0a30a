//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types shared by the Bazaar components:
//! - `api` - The storefront REST API
//! - `cli` - Migrations, admin accounts and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Database encoding is opt-in through the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, prices, ratings and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
