//! Users and their roles.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, UserId};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The closed set of roles a user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Teacher,
  Student,
}

impl Role {
  /// Roles allowed to mutate classes and other users' progress.
  pub const STAFF: &'static [Role] = &[Role::Admin, Role::Teacher];

  /// Roles allowed to manage user accounts.
  pub const ADMIN: &'static [Role] = &[Role::Admin];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Teacher => "teacher",
      Self::Student => "student",
    }
  }

  pub fn is_staff(self) -> bool { Self::STAFF.contains(&self) }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "teacher" => Ok(Self::Teacher),
      "student" => Ok(Self::Student),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// The public view of a user. The secret hash never leaves the store except
/// inside [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:       UserId,
  pub username: String,
  pub role:     Role,
  pub phone:    Option<String>,
}

/// A user together with the stored secret hash; used only for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:        User,
  /// PHC string, e.g. `$argon2id$v=19$…`
  pub secret_hash: String,
}

/// Input to [`crate::store::RosterStore::create_user`]. The secret must
/// already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:    String,
  pub secret_hash: String,
  pub role:        Role,
  pub phone:       Option<String>,
}

/// A partial update: every `Some` field overwrites its column, every `None`
/// leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  pub username:    Option<String>,
  pub role:        Option<Role>,
  pub phone:       Option<String>,
  pub secret_hash: Option<String>,
}

impl UserPatch {
  pub fn is_empty(&self) -> bool {
    self.username.is_none()
      && self.role.is_none()
      && self.phone.is_none()
      && self.secret_hash.is_none()
  }
}
