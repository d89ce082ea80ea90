//! Enrollment: membership plus initial progress, all or nothing.
//!
//! The pair is written by [`RosterStore::enroll`] inside one backend
//! transaction. A reader can never observe a member without a progress
//! record for that class.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
  ClassId, Error, Identity, Result, Role, UserId,
  progress::EnrolledStudent,
  store::{RosterStore, store_error},
};

pub struct EnrollmentCoordinator<S> {
  store: Arc<S>,
}

impl<S> Clone for EnrollmentCoordinator<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: RosterStore> EnrollmentCoordinator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Enroll `student_id` in `class_id` on behalf of `acting`, who becomes
  /// the author of the initial progress record.
  ///
  /// Repeating the call is a no-op that returns the same view. Any store
  /// failure surfaces as [`Error::EnrollmentFailed`] after a full rollback.
  pub async fn enroll(
    &self,
    class_id: ClassId,
    student_id: UserId,
    acting: &Identity,
  ) -> Result<EnrolledStudent> {
    acting.require(Role::STAFF)?;

    match self.store.enroll(class_id, student_id, acting.subject_id).await {
      Ok(enrolled) => {
        info!(
          %class_id,
          %student_id,
          acting = %acting.subject_id,
          "student enrolled"
        );
        Ok(enrolled)
      }
      Err(e) => {
        warn!(%class_id, %student_id, error = %e, "enrollment rolled back");
        Err(Error::EnrollmentFailed(Box::new(e)))
      }
    }
  }

  /// Remove the membership only. Progress history is kept.
  pub async fn unenroll(&self, class_id: ClassId, student_id: UserId) -> Result<()> {
    let removed = self
      .store
      .remove_member(class_id, student_id)
      .await
      .map_err(store_error)?;
    info!(%class_id, %student_id, removed, "student unenrolled");
    Ok(())
  }
}
