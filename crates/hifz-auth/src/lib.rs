//! Credential verification, token issuance, and per-request authorization.
//!
//! [`Authenticator`] turns a username and secret into a signed
//! [`IssuedToken`]; [`AccessGuard`] turns that token back into an
//! [`hifz_core::Identity`] on every protected request. Both share one
//! [`TokenCodec`].

pub mod authenticator;
pub mod guard;
pub mod secret;
pub mod token;

pub use authenticator::Authenticator;
pub use guard::{AccessGuard, bearer_token};
pub use secret::{SecretError, hash_secret, verify_secret};
pub use token::{IssuedToken, TokenCodec, TokenError};
