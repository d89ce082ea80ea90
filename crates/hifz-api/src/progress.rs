//! Handlers for progress records.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/classes/:id/progress` | Includes former members |
//! | `PUT`  | `/api/progress/:id` | Staff. Body: `{"surah","ayah","page"}` |
//! | `GET`  | `/api/students/me` | The caller's latest record |

use axum::{
  Json,
  extract::{Path, State},
};
use hifz_core::{
  ClassId, Error, ProgressId,
  progress::{Position, Progress, StudentDashboard},
  store::{RosterStore, store_error},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::{Caller, Staff},
};

/// `GET /api/classes/:id/progress`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _: Caller,
  Path(class_id): Path<ClassId>,
) -> Result<Json<Vec<Progress>>, ApiError>
where
  S: RosterStore,
{
  Ok(Json(state.ledger.list_by_class(class_id).await?))
}

/// Raw integers so out-of-range values reach [`Position::new`] and come
/// back as a descriptive 400.
#[derive(Debug, Deserialize)]
pub struct PositionBody {
  pub surah: i64,
  pub ayah:  i64,
  pub page:  i64,
}

/// `PUT /api/progress/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _: Staff,
  Path(id): Path<ProgressId>,
  Json(body): Json<PositionBody>,
) -> Result<Json<Progress>, ApiError>
where
  S: RosterStore,
{
  let position = Position::new(body.surah, body.ayah, body.page)?;
  Ok(Json(state.ledger.update_position(id, position).await?))
}

/// `GET /api/students/me`
pub async fn mine<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
) -> Result<Json<StudentDashboard>, ApiError>
where
  S: RosterStore,
{
  let user = state
    .store
    .get_user(identity.subject_id)
    .await
    .map_err(store_error)?
    .ok_or(Error::Unauthenticated)?;
  let progress = state.ledger.latest_for_student(identity.subject_id).await?;
  Ok(Json(StudentDashboard { username: user.username, progress }))
}
