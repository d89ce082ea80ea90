//! Error types for `hifz-core`.
//!
//! The variants are the full failure taxonomy of the service. Credential and
//! token failures carry no detail so that callers cannot tell which check
//! rejected them.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("unauthenticated")]
  Unauthenticated,

  #[error("forbidden")]
  Forbidden,

  #[error("{0} not found")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid id: {0}")]
  InvalidId(i64),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("invalid position: {0}")]
  InvalidPosition(String),

  #[error("could not issue token")]
  TokenIssuanceFailed,

  /// The enrollment transaction was rolled back; nothing was written.
  #[error("enrollment failed: {0}")]
  EnrollmentFailed(#[source] BoxError),

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] BoxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
