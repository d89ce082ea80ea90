//! Core types, the store contract, and the enrollment logic for hifz.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::RosterStore`]; the managers in [`membership`],
//! [`ledger`], and [`enrollment`] are generic over it and receive their store
//! handle at construction.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod class;
pub mod enrollment;
pub mod error;
pub mod id;
pub mod identity;
pub mod ledger;
pub mod membership;
pub mod progress;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use id::{ClassId, ProgressId, UserId};
pub use identity::Identity;
pub use user::Role;
