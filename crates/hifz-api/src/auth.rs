//! Handlers for login and the current user.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/login` | Body: `{"username":"…","password":"…"}` |
//! | `GET`  | `/api/me` | The caller's profile |

use axum::{Json, extract::State};
use hifz_auth::IssuedToken;
use hifz_core::{
  Error,
  store::{RosterStore, store_error},
  user::User,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, extract::Caller};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<IssuedToken>, ApiError>
where
  S: RosterStore,
{
  let issued = state
    .authenticator
    .authenticate(&body.username, &body.password)
    .await?;
  Ok(Json(issued))
}

/// `GET /api/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
) -> Result<Json<User>, ApiError>
where
  S: RosterStore,
{
  // A token can outlive its user.
  let user = state
    .store
    .get_user(identity.subject_id)
    .await
    .map_err(store_error)?
    .ok_or(Error::Unauthenticated)?;
  Ok(Json(user))
}
