//! The progress ledger: one position per (student, class).

use std::sync::Arc;

use tracing::info;

use crate::{
  ClassId, Error, ProgressId, Result, UserId,
  progress::{Position, Progress},
  store::{RosterStore, store_error},
};

pub struct ProgressLedger<S> {
  store: Arc<S>,
}

impl<S> Clone for ProgressLedger<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: RosterStore> ProgressLedger<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Idempotent: returns the existing record untouched if there is one.
  pub async fn record_initial_progress(
    &self,
    student_id: UserId,
    class_id: ClassId,
    updated_by: UserId,
  ) -> Result<Progress> {
    self
      .store
      .record_initial_progress(student_id, class_id, updated_by)
      .await
      .map_err(store_error)
  }

  /// Move a record to `position`. Neither direction is restricted.
  pub async fn update_position(
    &self,
    id: ProgressId,
    position: Position,
  ) -> Result<Progress> {
    let progress = self
      .store
      .update_position(id, position)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound(format!("progress {id}")))?;
    info!(
      progress_id = %id,
      surah = position.surah,
      ayah = position.ayah,
      page = position.page,
      "progress updated"
    );
    Ok(progress)
  }

  pub async fn list_by_class(&self, class_id: ClassId) -> Result<Vec<Progress>> {
    self.store.list_progress(class_id).await.map_err(store_error)
  }

  pub async fn latest_for_student(&self, student_id: UserId) -> Result<Option<Progress>> {
    self.store.latest_progress(student_id).await.map_err(store_error)
  }
}
