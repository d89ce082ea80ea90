//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use hifz_auth::SecretError;
use hifz_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Secret(#[from] SecretError),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Core(e) => match e {
        CoreError::InvalidCredentials | CoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CoreError::Forbidden => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::InvalidId(_) | CoreError::UnknownRole(_) | CoreError::InvalidPosition(_) => {
          StatusCode::BAD_REQUEST
        }
        CoreError::StoreUnavailable(_)
        | CoreError::TokenIssuanceFailed
        | CoreError::EnrollmentFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Secret(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// The text shown to the client. Server-side failures are logged in full
  /// and reported with a fixed message.
  fn public_message(&self) -> String {
    match self {
      ApiError::Core(CoreError::StoreUnavailable(_)) => "store unavailable".into(),
      ApiError::Core(CoreError::EnrollmentFailed(_)) => "enrollment failed".into(),
      ApiError::Secret(_) => "internal error".into(),
      other => other.to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.public_message() }))).into_response();
    if matches!(self, ApiError::Core(CoreError::Unauthenticated)) {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer realm=\"hifz\""));
    }
    res
  }
}
