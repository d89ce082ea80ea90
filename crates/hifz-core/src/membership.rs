//! Class membership as a set: adding an existing member and removing an
//! absent one are both successes.

use std::sync::Arc;

use tracing::debug;

use crate::{
  ClassId, Result, UserId,
  progress::EnrolledStudent,
  store::{RosterStore, store_error},
};

pub struct MembershipManager<S> {
  store: Arc<S>,
}

impl<S> Clone for MembershipManager<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: RosterStore> MembershipManager<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn add_member(&self, class_id: ClassId, student_id: UserId) -> Result<()> {
    let inserted = self
      .store
      .add_member(class_id, student_id)
      .await
      .map_err(store_error)?;
    debug!(%class_id, %student_id, inserted, "add member");
    Ok(())
  }

  pub async fn remove_member(&self, class_id: ClassId, student_id: UserId) -> Result<()> {
    let removed = self
      .store
      .remove_member(class_id, student_id)
      .await
      .map_err(store_error)?;
    debug!(%class_id, %student_id, removed, "remove member");
    Ok(())
  }

  pub async fn list_members(&self, class_id: ClassId) -> Result<Vec<EnrolledStudent>> {
    self.store.list_members(class_id).await.map_err(store_error)
  }
}
