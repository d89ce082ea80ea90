//! Per-request token verification and role checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hifz_core::{Error, Identity, Result, Role};
use tracing::debug;

use crate::token::TokenCodec;

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
  let (scheme, token) = header.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Turns a presented token into an [`Identity`], or rejects the request.
///
/// Never refreshes or extends a token; an expired token must be replaced by
/// logging in again.
#[derive(Clone, Debug)]
pub struct AccessGuard {
  tokens: Arc<TokenCodec>,
}

impl AccessGuard {
  pub fn new(tokens: Arc<TokenCodec>) -> Self { Self { tokens } }

  /// Verify `token` and, when `allowed` is given, require the caller's role
  /// to be one of them.
  ///
  /// A missing, malformed, forged, or expired token is
  /// [`Error::Unauthenticated`]; a valid token with the wrong role is
  /// [`Error::Forbidden`].
  pub fn authorize(&self, token: Option<&str>, allowed: Option<&[Role]>) -> Result<Identity> {
    self.authorize_at(token, allowed, Utc::now())
  }

  pub fn authorize_at(
    &self,
    token: Option<&str>,
    allowed: Option<&[Role]>,
    now: DateTime<Utc>,
  ) -> Result<Identity> {
    let token = token.ok_or(Error::Unauthenticated)?;
    let identity = self.tokens.verify(token, now).map_err(|e| {
      debug!(error = %e, "token rejected");
      Error::Unauthenticated
    })?;
    if let Some(allowed) = allowed {
      identity.require(allowed)?;
    }
    Ok(identity)
  }
}
