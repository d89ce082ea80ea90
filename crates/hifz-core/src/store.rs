//! The `RosterStore` trait.
//!
//! Implemented by storage backends (e.g. `hifz-store-sqlite`). The managers
//! in this crate and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use tracing::debug;

use crate::{
  ClassId, Error, ProgressId, UserId,
  class::{Class, NewClass},
  progress::{EnrolledStudent, Position, Progress},
  user::{NewUser, Role, User, UserCredentials, UserPatch},
};

// ─── Failure classification ──────────────────────────────────────────────────

const CONFLICT_MESSAGE: &str = "record already exists or is still referenced";

/// Backend errors must say whether they were caused by a uniqueness or
/// referential constraint, so callers can report a conflict instead of an
/// outage.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
  fn is_conflict(&self) -> bool;
}

/// Map a backend error onto the core taxonomy. Constraint details stay in
/// the log; the returned conflict carries a fixed message.
pub fn store_error<E: StoreFailure>(e: E) -> Error {
  if e.is_conflict() {
    debug!(error = %e, "constraint violation");
    Error::Conflict(CONFLICT_MESSAGE.into())
  } else {
    Error::StoreUnavailable(Box::new(e))
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the durable state of the service.
///
/// Membership and initial-progress inserts are idempotent: inserting a row
/// that already exists succeeds and changes nothing. Backends must implement
/// this with an atomic insert-or-ignore primitive, never read-then-write.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: StoreFailure;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Look up a user by exact, case-sensitive username.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// List all users, optionally filtered by role.
  fn list_users(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Persist a new user. A taken username is a conflict.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Apply `patch` in a single statement. Returns `None` if the user does
  /// not exist.
  fn update_user(
    &self,
    id: UserId,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Returns `false` if the user did not exist.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Classes ───────────────────────────────────────────────────────────

  /// List classes, optionally only those taught by `teacher`.
  fn list_classes(
    &self,
    teacher: Option<UserId>,
  ) -> impl Future<Output = Result<Vec<Class>, Self::Error>> + Send + '_;

  fn get_class(
    &self,
    id: ClassId,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  fn create_class(
    &self,
    input: NewClass,
  ) -> impl Future<Output = Result<Class, Self::Error>> + Send + '_;

  /// Returns `None` if the class does not exist.
  fn rename_class(
    &self,
    id: ClassId,
    name: String,
  ) -> impl Future<Output = Result<Option<Class>, Self::Error>> + Send + '_;

  /// Returns `false` if the class did not exist.
  fn delete_class(
    &self,
    id: ClassId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Membership ────────────────────────────────────────────────────────

  /// Insert-if-absent. Returns `true` if a row was written.
  fn add_member(
    &self,
    class_id: ClassId,
    student_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete-if-present. Returns `true` if a row was removed. Progress is
  /// left in place.
  fn remove_member(
    &self,
    class_id: ClassId,
    student_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every member of the class, left-joined with their progress there.
  fn list_members(
    &self,
    class_id: ClassId,
  ) -> impl Future<Output = Result<Vec<EnrolledStudent>, Self::Error>> + Send + '_;

  // ── Progress ──────────────────────────────────────────────────────────

  /// Insert a record at [`Position::START`] unless one already exists for
  /// the pair. Returns the live record either way.
  fn record_initial_progress(
    &self,
    student_id: UserId,
    class_id: ClassId,
    updated_by: UserId,
  ) -> impl Future<Output = Result<Progress, Self::Error>> + Send + '_;

  /// Overwrite the position only. Returns `None` if the id does not exist.
  fn update_position(
    &self,
    id: ProgressId,
    position: Position,
  ) -> impl Future<Output = Result<Option<Progress>, Self::Error>> + Send + '_;

  /// All progress records for a class, including those of former members.
  fn list_progress(
    &self,
    class_id: ClassId,
  ) -> impl Future<Output = Result<Vec<Progress>, Self::Error>> + Send + '_;

  /// The most recently created progress record for a student, in any class.
  fn latest_progress(
    &self,
    student_id: UserId,
  ) -> impl Future<Output = Result<Option<Progress>, Self::Error>> + Send + '_;

  // ── Enrollment ────────────────────────────────────────────────────────

  /// Add the membership and the initial progress record in one
  /// transaction, then return the joined view. On any failure neither row
  /// is written.
  fn enroll(
    &self,
    class_id: ClassId,
    student_id: UserId,
    updated_by: UserId,
  ) -> impl Future<Output = Result<EnrolledStudent, Self::Error>> + Send + '_;
}
