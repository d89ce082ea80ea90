//! Caller extractors. Each runs the access guard once per request.
//!
//! | Extractor | Admits |
//! |-----------|--------|
//! | [`Caller`] | any valid token |
//! | [`Staff`]  | admin, teacher |
//! | [`Admin`]  | admin |

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use hifz_auth::bearer_token;
use hifz_core::{Identity, Role, store::RosterStore};

use crate::{AppState, error::ApiError};

fn authorize<S>(
  parts: &Parts,
  state: &AppState<S>,
  allowed: Option<&[Role]>,
) -> Result<Identity, ApiError> {
  let token = parts
    .headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(bearer_token);
  Ok(state.guard.authorize(token, allowed)?)
}

/// Any authenticated user.
pub struct Caller(pub Identity);

/// A teacher or admin.
pub struct Staff(pub Identity);

/// An admin.
pub struct Admin(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: RosterStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, state, None).map(Caller)
  }
}

impl<S> FromRequestParts<AppState<S>> for Staff
where
  S: RosterStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, state, Some(Role::STAFF)).map(Staff)
  }
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: RosterStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authorize(parts, state, Some(Role::ADMIN)).map(Admin)
  }
}
