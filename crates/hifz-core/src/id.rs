//! Integer identifiers for persisted entities.
//!
//! Every id handed to the core must be positive. Ids arriving from callers
//! go through [`UserId::new`] (and friends), which reject anything else with
//! [`Error::InvalidId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
      Deserialize,
    )]
    #[serde(try_from = "i64", into = "i64")]
    pub struct $name(i64);

    impl $name {
      pub fn new(raw: i64) -> Result<Self> {
        if raw > 0 { Ok(Self(raw)) } else { Err(Error::InvalidId(raw)) }
      }

      pub fn get(self) -> i64 { self.0 }
    }

    impl TryFrom<i64> for $name {
      type Error = Error;

      fn try_from(raw: i64) -> Result<Self> { Self::new(raw) }
    }

    impl From<$name> for i64 {
      fn from(id: $name) -> i64 { id.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

id_type!(
  /// Identifies a row in `users`, whatever its role.
  UserId
);
id_type!(ClassId);
id_type!(ProgressId);
