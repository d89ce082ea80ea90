//! Classes: a named group of students owned by one teacher.

use serde::{Deserialize, Serialize};

use crate::{ClassId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
  pub id:         ClassId,
  pub name:       String,
  /// Must reference an existing user; the store enforces this.
  pub teacher_id: UserId,
}

/// Input to [`crate::store::RosterStore::create_class`].
#[derive(Debug, Clone)]
pub struct NewClass {
  pub name:       String,
  pub teacher_id: UserId,
}
