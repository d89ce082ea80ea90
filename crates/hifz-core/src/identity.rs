//! The authenticated caller.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Role, UserId};

/// Who is making a request. Produced once per request by the access guard
/// from a verified token and passed explicitly to anything that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub subject_id: UserId,
  pub role:       Role,
}

impl Identity {
  pub fn new(subject_id: UserId, role: Role) -> Self { Self { subject_id, role } }

  /// Fail with [`Error::Forbidden`] unless the role is one of `allowed`.
  pub fn require(&self, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&self.role) { Ok(()) } else { Err(Error::Forbidden) }
  }
}
