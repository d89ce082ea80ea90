//! Conversion between Rust domain types and the plain columns stored in
//! SQLite.
//!
//! Ids are stored as `INTEGER`, roles as their lowercase name. Rows are first
//! read into `Raw*` structs inside the connection closure and validated into
//! domain types afterwards, outside the database thread.

use hifz_core::{
  ClassId, ProgressId, UserId,
  class::Class,
  progress::{EnrolledStudent, Position, Progress},
  user::{Role, User, UserCredentials},
};
use rusqlite::Row;

use crate::Result;

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str { role.as_str() }

pub fn decode_role(s: &str) -> Result<Role> { Ok(s.parse()?) }

// ─── Users ───────────────────────────────────────────────────────────────────

pub struct RawUser {
  pub id:       i64,
  pub username: String,
  pub role:     String,
  pub phone:    Option<String>,
}

impl RawUser {
  /// Read `id, username, role, phone` starting at column `at`.
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(at)?,
      username: row.get(at + 1)?,
      role:     row.get(at + 2)?,
      phone:    row.get(at + 3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:       UserId::new(self.id)?,
      username: self.username,
      role:     decode_role(&self.role)?,
      phone:    self.phone,
    })
  }
}

pub struct RawCredentials {
  pub user:        RawUser,
  pub secret_hash: String,
}

impl RawCredentials {
  pub fn into_credentials(self) -> Result<UserCredentials> {
    Ok(UserCredentials {
      user:        self.user.into_user()?,
      secret_hash: self.secret_hash,
    })
  }
}

// ─── Classes ─────────────────────────────────────────────────────────────────

pub struct RawClass {
  pub id:         i64,
  pub name:       String,
  pub teacher_id: i64,
}

impl RawClass {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      teacher_id: row.get(2)?,
    })
  }

  pub fn into_class(self) -> Result<Class> {
    Ok(Class {
      id:         ClassId::new(self.id)?,
      name:       self.name,
      teacher_id: UserId::new(self.teacher_id)?,
    })
  }
}

// ─── Progress ────────────────────────────────────────────────────────────────

pub struct RawProgress {
  pub id:         i64,
  pub student_id: i64,
  pub class_id:   i64,
  pub surah:      i64,
  pub ayah:       i64,
  pub page:       i64,
  pub updated_by: i64,
}

impl RawProgress {
  /// Read `id, student_id, class_id, surah, ayah, page, updated_by`
  /// starting at column `at`.
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(at)?,
      student_id: row.get(at + 1)?,
      class_id:   row.get(at + 2)?,
      surah:      row.get(at + 3)?,
      ayah:       row.get(at + 4)?,
      page:       row.get(at + 5)?,
      updated_by: row.get(at + 6)?,
    })
  }

  /// Like [`RawProgress::from_row`] for the nullable side of a LEFT JOIN.
  pub fn from_row_optional(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    let id: Option<i64> = row.get(at)?;
    match id {
      Some(_) => Self::from_row(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_progress(self) -> Result<Progress> {
    Ok(Progress {
      id:         ProgressId::new(self.id)?,
      student_id: UserId::new(self.student_id)?,
      class_id:   ClassId::new(self.class_id)?,
      position:   Position::new(self.surah, self.ayah, self.page)?,
      updated_by: UserId::new(self.updated_by)?,
    })
  }
}

// ─── Members ─────────────────────────────────────────────────────────────────

pub struct RawMember {
  pub student:  RawUser,
  pub progress: Option<RawProgress>,
}

impl RawMember {
  /// Read four user columns followed by seven nullable progress columns.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student:  RawUser::from_row(row, 0)?,
      progress: RawProgress::from_row_optional(row, 4)?,
    })
  }

  pub fn into_enrolled(self) -> Result<EnrolledStudent> {
    Ok(EnrolledStudent {
      student:  self.student.into_user()?,
      progress: self.progress.map(RawProgress::into_progress).transpose()?,
    })
  }
}
