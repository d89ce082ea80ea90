//! Memorisation progress: a position in the text per (student, class).

use serde::{Deserialize, Serialize};

use crate::{ClassId, Error, ProgressId, Result, UserId, user::User};

/// Number of surahs in the text.
pub const SURAH_COUNT: u32 = 114;

/// Number of pages in the standard printing.
pub const PAGE_COUNT: u32 = 604;

// ─── Position ────────────────────────────────────────────────────────────────

/// A location in the text. Always within the domain bounds: use
/// [`Position::new`] for anything that came from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub surah: u32,
  pub ayah:  u32,
  pub page:  u32,
}

impl Position {
  /// Where every newly enrolled student starts.
  pub const START: Position = Position { surah: 1, ayah: 1, page: 1 };

  pub fn new(surah: i64, ayah: i64, page: i64) -> Result<Self> {
    if !(1..=i64::from(SURAH_COUNT)).contains(&surah) {
      return Err(Error::InvalidPosition(format!(
        "surah must be between 1 and {SURAH_COUNT}, got {surah}"
      )));
    }
    if ayah < 1 || ayah > i64::from(u32::MAX) {
      return Err(Error::InvalidPosition(format!(
        "ayah must be between 1 and {}, got {ayah}",
        u32::MAX
      )));
    }
    if !(1..=i64::from(PAGE_COUNT)).contains(&page) {
      return Err(Error::InvalidPosition(format!(
        "page must be between 1 and {PAGE_COUNT}, got {page}"
      )));
    }
    Ok(Self { surah: surah as u32, ayah: ayah as u32, page: page as u32 })
  }
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// At most one exists per (student, class). Created by enrollment, moved by
/// staff, never deleted when the student leaves the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  pub id:         ProgressId,
  pub student_id: UserId,
  pub class_id:   ClassId,
  #[serde(flatten)]
  pub position:   Position,
  /// The staff member who created the record.
  pub updated_by: UserId,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A class member joined with their progress in that class. `progress` is
/// `None` only for memberships created outside enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledStudent {
  #[serde(flatten)]
  pub student:  User,
  pub progress: Option<Progress>,
}

/// What a student sees about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDashboard {
  pub username: String,
  /// The most recently created progress record, if any.
  pub progress: Option<Progress>,
}
