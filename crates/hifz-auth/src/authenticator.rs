//! Username/secret login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hifz_core::{
  Error, Identity, Result,
  store::{RosterStore, store_error},
};
use tracing::{debug, error, info};

use crate::{
  secret::{SecretError, hash_secret, verify_secret},
  token::{IssuedToken, TokenCodec},
};

/// Verifies credentials against the store and issues tokens.
pub struct Authenticator<S> {
  store:  Arc<S>,
  tokens: Arc<TokenCodec>,
  /// Verified against when the username is unknown, so both failure paths
  /// pay for one argon2 verification.
  decoy:  Arc<str>,
}

impl<S> Clone for Authenticator<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
      decoy:  Arc::clone(&self.decoy),
    }
  }
}

impl<S: RosterStore> Authenticator<S> {
  pub fn new(store: Arc<S>, tokens: Arc<TokenCodec>) -> Result<Self, SecretError> {
    let decoy = hash_secret("hifz-decoy-secret")?.into();
    Ok(Self { store, tokens, decoy })
  }

  pub async fn authenticate(&self, username: &str, secret: &str) -> Result<IssuedToken> {
    self.authenticate_at(username, secret, Utc::now()).await
  }

  /// As [`Self::authenticate`], with the issue time supplied by the caller.
  ///
  /// An unknown username and a wrong secret both yield
  /// [`Error::InvalidCredentials`].
  pub async fn authenticate_at(
    &self,
    username: &str,
    secret: &str,
    now: DateTime<Utc>,
  ) -> Result<IssuedToken> {
    let found = self
      .store
      .find_credentials(username)
      .await
      .map_err(store_error)?;

    let identity = match found {
      Some(creds) if verify_secret(secret, &creds.secret_hash) => {
        Identity::new(creds.user.id, creds.user.role)
      }
      Some(_) => {
        debug!("login rejected");
        return Err(Error::InvalidCredentials);
      }
      None => {
        verify_secret(secret, &self.decoy);
        debug!("login rejected");
        return Err(Error::InvalidCredentials);
      }
    };

    let issued = self.tokens.issue(&identity, now).map_err(|e| {
      error!(error = %e, "token issuance failed");
      Error::TokenIssuanceFailed
    })?;
    info!(subject = %identity.subject_id, role = %identity.role, "login succeeded");
    Ok(issued)
  }
}
