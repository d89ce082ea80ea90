//! Handlers for `/api/classes` and `/api/teachers/:id/classes`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/classes` | Any caller |
//! | `POST`   | `/api/classes` | Staff. Body: `{"name","teacher_id"?}`; admins must name a teacher |
//! | `GET`    | `/api/classes/:id` | 404 if not found |
//! | `PUT`    | `/api/classes/:id` | Staff. Body: `{"name"}` |
//! | `DELETE` | `/api/classes/:id` | Staff. Removes members and progress too |
//! | `GET`    | `/api/teachers/:id/classes` | Any caller |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hifz_core::{
  ClassId, Error, Role, UserId,
  class::{Class, NewClass},
  store::{RosterStore, store_error},
};
use serde::Deserialize;
use tracing::info;

use crate::{
  AppState,
  error::ApiError,
  extract::{Caller, Staff},
};

fn class_name(raw: String) -> Result<String, ApiError> {
  let name = raw.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("class name is required".into()));
  }
  Ok(name.to_owned())
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /api/classes`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _: Caller,
) -> Result<Json<Vec<Class>>, ApiError>
where
  S: RosterStore,
{
  let classes = state.store.list_classes(None).await.map_err(store_error)?;
  Ok(Json(classes))
}

/// `GET /api/teachers/:id/classes`
pub async fn by_teacher<S>(
  State(state): State<AppState<S>>,
  _: Caller,
  Path(teacher_id): Path<UserId>,
) -> Result<Json<Vec<Class>>, ApiError>
where
  S: RosterStore,
{
  let classes = state
    .store
    .list_classes(Some(teacher_id))
    .await
    .map_err(store_error)?;
  Ok(Json(classes))
}

/// `GET /api/classes/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _: Caller,
  Path(id): Path<ClassId>,
) -> Result<Json<Class>, ApiError>
where
  S: RosterStore,
{
  let class = state
    .store
    .get_class(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("class {id}")))?;
  Ok(Json(class))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:       String,
  /// Must name a teacher. Defaults to the caller when the caller is one.
  pub teacher_id: Option<UserId>,
}

/// `POST /api/classes`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Staff(acting): Staff,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let name = class_name(body.name)?;
  let teacher_id = match body.teacher_id {
    Some(id) => id,
    None if acting.role == Role::Teacher => acting.subject_id,
    None => return Err(ApiError::BadRequest("teacher_id is required".into())),
  };
  let teacher = state
    .store
    .get_user(teacher_id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("user {teacher_id}")))?;
  if teacher.role != Role::Teacher {
    return Err(ApiError::BadRequest(format!("user {teacher_id} is not a teacher")));
  }

  let class = state
    .store
    .create_class(NewClass { name, teacher_id })
    .await
    .map_err(store_error)?;
  info!(class = %class.id, teacher = %class.teacher_id, "class created");
  Ok((StatusCode::CREATED, Json(class)))
}

// ─── Update / delete ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub name: String,
}

/// `PUT /api/classes/:id`
pub async fn rename<S>(
  State(state): State<AppState<S>>,
  _: Staff,
  Path(id): Path<ClassId>,
  Json(body): Json<RenameBody>,
) -> Result<Json<Class>, ApiError>
where
  S: RosterStore,
{
  let class = state
    .store
    .rename_class(id, class_name(body.name)?)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("class {id}")))?;
  Ok(Json(class))
}

/// `DELETE /api/classes/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Staff(acting): Staff,
  Path(id): Path<ClassId>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  if !state.store.delete_class(id).await.map_err(store_error)? {
    return Err(Error::NotFound(format!("class {id}")).into());
  }
  info!(class = %id, by = %acting.subject_id, "class deleted");
  Ok(StatusCode::NO_CONTENT)
}
