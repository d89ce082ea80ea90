//! Handlers for `/api/users` endpoints. Admin only.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/users` | Optional `?role=admin\|teacher\|student` |
//! | `POST`   | `/api/users` | Body: `{"username","password","role","phone"?}` |
//! | `PUT`    | `/api/users/:id` | Any subset of the create fields |
//! | `DELETE` | `/api/users/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use hifz_auth::hash_secret;
use hifz_core::{
  Error, UserId,
  store::{RosterStore, store_error},
  user::{NewUser, Role, User, UserPatch},
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError, extract::Admin};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub role: Option<Role>,
}

/// `GET /api/users[?role=<role>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _: Admin,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: RosterStore,
{
  let users = state.store.list_users(params.role).await.map_err(store_error)?;
  Ok(Json(users))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub username: String,
  pub password: String,
  pub role:     Role,
  pub phone:    Option<String>,
}

/// `POST /api/users`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Admin(acting): Admin,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let username = body.username.trim();
  if username.is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest("username and password are required".into()));
  }

  let user = state
    .store
    .create_user(NewUser {
      username:    username.to_owned(),
      secret_hash: hash_secret(&body.password)?,
      role:        body.role,
      phone:       body.phone,
    })
    .await
    .map_err(store_error)?;
  info!(user = %user.id, role = %user.role, by = %acting.subject_id, "user created");
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub username: Option<String>,
  pub password: Option<String>,
  pub role:     Option<Role>,
  pub phone:    Option<String>,
}

/// `PUT /api/users/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _: Admin,
  Path(id): Path<UserId>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<User>, ApiError>
where
  S: RosterStore,
{
  let secret_hash = match body.password.as_deref() {
    Some("") => return Err(ApiError::BadRequest("password must not be empty".into())),
    Some(password) => Some(hash_secret(password)?),
    None => None,
  };
  let username = match body.username.as_deref().map(str::trim) {
    Some("") => return Err(ApiError::BadRequest("username must not be empty".into())),
    Some(username) => Some(username.to_owned()),
    None => None,
  };
  let patch = UserPatch {
    username,
    role: body.role,
    phone: body.phone,
    secret_hash,
  };
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".into()));
  }

  let user = state
    .store
    .update_user(id, patch)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
  Ok(Json(user))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /api/users/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _: Admin,
  Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  if !state.store.delete_user(id).await.map_err(store_error)? {
    return Err(Error::NotFound(format!("user {id}")).into());
  }
  Ok(StatusCode::NO_CONTENT)
}
