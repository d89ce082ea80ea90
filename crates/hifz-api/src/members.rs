//! Handlers for `/api/classes/:id/students`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/classes/:id/students` | Members with their progress |
//! | `POST`   | `/api/classes/:id/students` | Staff. Body: `{"student_id":42}`. Idempotent |
//! | `DELETE` | `/api/classes/:id/students/:student_id` | Staff. Idempotent; progress is kept |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hifz_core::{
  ClassId, Error, Role, UserId,
  progress::EnrolledStudent,
  store::{RosterStore, store_error},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::{Caller, Staff},
};

/// `GET /api/classes/:id/students`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _: Caller,
  Path(class_id): Path<ClassId>,
) -> Result<Json<Vec<EnrolledStudent>>, ApiError>
where
  S: RosterStore,
{
  Ok(Json(state.membership.list_members(class_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub student_id: UserId,
}

/// `POST /api/classes/:id/students`
pub async fn enroll<S>(
  State(state): State<AppState<S>>,
  Staff(acting): Staff,
  Path(class_id): Path<ClassId>,
  Json(body): Json<EnrollBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let student_id = body.student_id;

  // Existence is checked again by the transaction's foreign keys.
  state
    .store
    .get_class(class_id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("class {class_id}")))?;
  let student = state
    .store
    .get_user(student_id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("user {student_id}")))?;
  if student.role != Role::Student {
    return Err(ApiError::BadRequest(format!("user {student_id} is not a student")));
  }

  let enrolled = state.enrollment.enroll(class_id, student_id, &acting).await?;
  Ok((StatusCode::CREATED, Json(enrolled)))
}

/// `DELETE /api/classes/:id/students/:student_id`
pub async fn unenroll<S>(
  State(state): State<AppState<S>>,
  _: Staff,
  Path((class_id, student_id)): Path<(ClassId, UserId)>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore,
{
  state.enrollment.unenroll(class_id, student_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
