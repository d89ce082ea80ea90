//! Signed, time-limited identity tokens.
//!
//! The wire format is a compact HS256 JWT:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256)
//! ```
//!
//! where the MAC covers the first two segments exactly as transmitted.
//! Tokens are stateless; nothing is persisted on issue.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use hifz_core::{Identity, Role, UserId};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("token signing secret is empty")]
  EmptySecret,

  #[error("malformed token")]
  Malformed,

  #[error("bad token signature")]
  BadSignature,

  #[error("token expired")]
  Expired,

  #[error("token expiry out of range")]
  ExpiryOutOfRange,

  #[error("could not encode claims: {0}")]
  Encode(#[from] serde_json::Error),
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct Header<'a> {
  alg: &'a str,
  typ: &'a str,
}

#[derive(Serialize, Deserialize)]
struct Claims {
  sub:  UserId,
  role: Role,
  iat:  i64,
  exp:  i64,
}

/// A freshly issued token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

// ─── Codec ───────────────────────────────────────────────────────────────────

/// Issues and verifies tokens under one server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
  keyed: HmacSha256,
  ttl:   TimeDelta,
}

impl std::fmt::Debug for TokenCodec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenCodec").field("ttl", &self.ttl).finish_non_exhaustive()
  }
}

impl TokenCodec {
  pub fn new(secret: impl Into<Vec<u8>>, ttl: TimeDelta) -> Result<Self, TokenError> {
    let key = secret.into();
    if key.is_empty() {
      return Err(TokenError::EmptySecret);
    }
    let keyed = <HmacSha256 as Mac>::new_from_slice(&key).map_err(|_| TokenError::EmptySecret)?;
    Ok(Self { keyed, ttl })
  }

  pub fn ttl(&self) -> TimeDelta { self.ttl }

  /// Sign a token for `identity` that expires `ttl` after `now`.
  pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
    let expires_at = now
      .checked_add_signed(self.ttl)
      .ok_or(TokenError::ExpiryOutOfRange)?;

    let header = serde_json::to_vec(&Header { alg: ALGORITHM, typ: "JWT" })?;
    let claims = serde_json::to_vec(&Claims {
      sub:  identity.subject_id,
      role: identity.role,
      iat:  now.timestamp(),
      exp:  expires_at.timestamp(),
    })?;

    let signing_input =
      format!("{}.{}", URL_SAFE_NO_PAD.encode(header), URL_SAFE_NO_PAD.encode(claims));
    let signature = URL_SAFE_NO_PAD.encode(self.mac(&signing_input).finalize().into_bytes());

    Ok(IssuedToken {
      token: format!("{signing_input}.{signature}"),
      expires_at,
    })
  }

  /// Check signature then expiry, and recover the identity.
  ///
  /// A token whose expiry is at or before `now` is rejected even when the
  /// signature is valid.
  pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
    let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
    let (header, claims) = signing_input.split_once('.').ok_or(TokenError::Malformed)?;

    let signature = URL_SAFE_NO_PAD
      .decode(signature)
      .map_err(|_| TokenError::Malformed)?;
    self
      .mac(signing_input)
      .verify_slice(&signature)
      .map_err(|_| TokenError::BadSignature)?;

    let header = URL_SAFE_NO_PAD.decode(header).map_err(|_| TokenError::Malformed)?;
    let header: Header<'_> =
      serde_json::from_slice(&header).map_err(|_| TokenError::Malformed)?;
    if header.alg != ALGORITHM {
      return Err(TokenError::Malformed);
    }

    let claims = URL_SAFE_NO_PAD.decode(claims).map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&claims).map_err(|_| TokenError::Malformed)?;

    if claims.exp <= now.timestamp() {
      return Err(TokenError::Expired);
    }
    Ok(Identity::new(claims.sub, claims.role))
  }

  fn mac(&self, signing_input: &str) -> HmacSha256 {
    let mut mac = self.keyed.clone();
    mac.update(signing_input.as_bytes());
    mac
  }
}
