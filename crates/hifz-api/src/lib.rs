//! JSON REST API for hifz.
//!
//! Exposes an axum [`Router`] backed by any [`RosterStore`]. Every route
//! except `/login` requires an `Authorization: Bearer <token>` header;
//! TLS and transport concerns are the caller's responsibility.

pub mod auth;
pub mod classes;
pub mod error;
pub mod extract;
pub mod members;
pub mod progress;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use hifz_auth::{AccessGuard, Authenticator, SecretError, TokenCodec};
use hifz_core::{
  enrollment::EnrollmentCoordinator, ledger::ProgressLedger, membership::MembershipManager,
  store::RosterStore,
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Every component holds the
/// same store handle.
pub struct AppState<S> {
  pub store:         Arc<S>,
  pub membership:    MembershipManager<S>,
  pub ledger:        ProgressLedger<S>,
  pub enrollment:    EnrollmentCoordinator<S>,
  pub authenticator: Authenticator<S>,
  pub guard:         AccessGuard,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:         Arc::clone(&self.store),
      membership:    self.membership.clone(),
      ledger:        self.ledger.clone(),
      enrollment:    self.enrollment.clone(),
      authenticator: self.authenticator.clone(),
      guard:         self.guard.clone(),
    }
  }
}

impl<S: RosterStore> AppState<S> {
  pub fn new(store: Arc<S>, tokens: Arc<TokenCodec>) -> Result<Self, SecretError> {
    Ok(Self {
      membership:    MembershipManager::new(Arc::clone(&store)),
      ledger:        ProgressLedger::new(Arc::clone(&store)),
      enrollment:    EnrollmentCoordinator::new(Arc::clone(&store)),
      authenticator: Authenticator::new(Arc::clone(&store), Arc::clone(&tokens))?,
      guard:         AccessGuard::new(tokens),
      store,
    })
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RosterStore + 'static,
{
  Router::new()
    .route("/login", post(auth::login::<S>))
    .route("/api/me", get(auth::me::<S>))
    .route("/api/students/me", get(progress::mine::<S>))
    // Users
    .route("/api/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/api/users/{user_id}",
      put(users::update::<S>).delete(users::delete_one::<S>),
    )
    // Classes
    .route("/api/classes", get(classes::list::<S>).post(classes::create::<S>))
    .route(
      "/api/classes/{class_id}",
      get(classes::get_one::<S>)
        .put(classes::rename::<S>)
        .delete(classes::delete_one::<S>),
    )
    .route("/api/teachers/{teacher_id}/classes", get(classes::by_teacher::<S>))
    // Membership
    .route(
      "/api/classes/{class_id}/students",
      get(members::list::<S>).post(members::enroll::<S>),
    )
    .route(
      "/api/classes/{class_id}/students/{student_id}",
      delete(members::unenroll::<S>),
    )
    // Progress
    .route("/api/classes/{class_id}/progress", get(progress::list::<S>))
    .route("/api/progress/{progress_id}", put(progress::update::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
