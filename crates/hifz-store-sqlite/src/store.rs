//! [`SqliteStore`], the SQLite implementation of [`RosterStore`].

use std::path::Path;

use hifz_core::{
  ClassId, ProgressId, UserId,
  class::{Class, NewClass},
  progress::{EnrolledStudent, Position, Progress},
  store::RosterStore,
  user::{NewUser, Role, User, UserCredentials, UserPatch},
};
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;

use crate::{
  Result,
  encode::{RawClass, RawCredentials, RawMember, RawProgress, RawUser, encode_role},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hifz store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// is serialised onto the connection's thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Shared statements ───────────────────────────────────────────────────────
//
// Plain functions over `&Connection` so the same statements run standalone
// and inside the enrollment transaction (which derefs to `Connection`).

fn insert_membership(conn: &Connection, class_id: i64, student_id: i64) -> rusqlite::Result<bool> {
  let n = conn.execute(
    "INSERT INTO class_members (class_id, student_id) VALUES (?1, ?2)
     ON CONFLICT (class_id, student_id) DO NOTHING",
    rusqlite::params![class_id, student_id],
  )?;
  Ok(n > 0)
}

fn insert_initial_progress(
  conn:       &Connection,
  student_id: i64,
  class_id:   i64,
  updated_by: i64,
) -> rusqlite::Result<bool> {
  let start = Position::START;
  let n = conn.execute(
    "INSERT INTO progress (student_id, class_id, surah, ayah, page, updated_by)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT (student_id, class_id) DO NOTHING",
    rusqlite::params![
      student_id,
      class_id,
      start.surah,
      start.ayah,
      start.page,
      updated_by,
    ],
  )?;
  Ok(n > 0)
}

fn select_progress(conn: &Connection, student_id: i64, class_id: i64) -> rusqlite::Result<RawProgress> {
  conn.query_row(
    "SELECT p.id, p.student_id, p.class_id, p.surah, p.ayah, p.page, p.updated_by
     FROM progress p
     WHERE p.student_id = ?1 AND p.class_id = ?2",
    rusqlite::params![student_id, class_id],
    |row| RawProgress::from_row(row, 0),
  )
}

fn select_member(conn: &Connection, class_id: i64, student_id: i64) -> rusqlite::Result<RawMember> {
  conn.query_row(
    "SELECT
       u.id, u.username, u.role, u.phone,
       p.id, p.student_id, p.class_id, p.surah, p.ayah, p.page, p.updated_by
     FROM class_members cm
     JOIN users u ON u.id = cm.student_id
     LEFT JOIN progress p
       ON p.student_id = cm.student_id AND p.class_id = cm.class_id
     WHERE cm.class_id = ?1 AND cm.student_id = ?2",
    rusqlite::params![class_id, student_id],
    RawMember::from_row,
  )
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
    let username = username.to_owned();

    let raw: Option<RawCredentials> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT u.id, u.username, u.role, u.phone, u.secret_hash
             FROM users u WHERE u.username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawCredentials {
                user:        RawUser::from_row(row, 0)?,
                secret_hash: row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCredentials::into_credentials).transpose()
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let id = id.get();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT u.id, u.username, u.role, u.phone FROM users u WHERE u.id = ?1",
            rusqlite::params![id],
            |row| RawUser::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
    let role_str = role.map(encode_role);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.id, u.username, u.role, u.phone FROM users u
           WHERE ?1 IS NULL OR u.role = ?1
           ORDER BY u.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], |row| RawUser::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let NewUser { username, secret_hash, role, phone } = input;
    let role_str = encode_role(role);
    let name     = username.clone();
    let tel      = phone.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, secret_hash, role, phone) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, secret_hash, role_str, tel],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User { id: UserId::new(id)?, username, role, phone })
  }

  async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
    let id = id.get();
    let UserPatch { username, role, phone, secret_hash } = patch;
    let role_str = role.map(encode_role);

    // One statement for every combination of supplied fields: a NULL
    // parameter keeps the current column value.
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE users SET
               username    = COALESCE(?1, username),
               role        = COALESCE(?2, role),
               phone       = COALESCE(?3, phone),
               secret_hash = COALESCE(?4, secret_hash)
             WHERE id = ?5
             RETURNING id, username, role, phone",
            rusqlite::params![username, role_str, phone, secret_hash, id],
            |row| RawUser::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    let id = id.get();
    let n = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", rusqlite::params![id])?))
      .await?;
    Ok(n > 0)
  }

  // ── Classes ───────────────────────────────────────────────────────────────

  async fn list_classes(&self, teacher: Option<UserId>) -> Result<Vec<Class>> {
    let teacher_id = teacher.map(UserId::get);

    let raws: Vec<RawClass> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, teacher_id FROM classes
           WHERE ?1 IS NULL OR teacher_id = ?1
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![teacher_id], RawClass::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClass::into_class).collect()
  }

  async fn get_class(&self, id: ClassId) -> Result<Option<Class>> {
    let id = id.get();

    let raw: Option<RawClass> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, name, teacher_id FROM classes WHERE id = ?1",
            rusqlite::params![id],
            RawClass::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawClass::into_class).transpose()
  }

  async fn create_class(&self, input: NewClass) -> Result<Class> {
    let NewClass { name, teacher_id } = input;
    let class_name = name.clone();
    let teacher    = teacher_id.get();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO classes (name, teacher_id) VALUES (?1, ?2)",
          rusqlite::params![class_name, teacher],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Class { id: ClassId::new(id)?, name, teacher_id })
  }

  async fn rename_class(&self, id: ClassId, name: String) -> Result<Option<Class>> {
    let id = id.get();

    let raw: Option<RawClass> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE classes SET name = ?1 WHERE id = ?2 RETURNING id, name, teacher_id",
            rusqlite::params![name, id],
            RawClass::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawClass::into_class).transpose()
  }

  async fn delete_class(&self, id: ClassId) -> Result<bool> {
    let id = id.get();
    let n = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM classes WHERE id = ?1", rusqlite::params![id])?))
      .await?;
    Ok(n > 0)
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn add_member(&self, class_id: ClassId, student_id: UserId) -> Result<bool> {
    let (class_id, student_id) = (class_id.get(), student_id.get());
    let inserted = self
      .conn
      .call(move |conn| Ok(insert_membership(conn, class_id, student_id)?))
      .await?;
    Ok(inserted)
  }

  async fn remove_member(&self, class_id: ClassId, student_id: UserId) -> Result<bool> {
    let (class_id, student_id) = (class_id.get(), student_id.get());
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM class_members WHERE class_id = ?1 AND student_id = ?2",
          rusqlite::params![class_id, student_id],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn list_members(&self, class_id: ClassId) -> Result<Vec<EnrolledStudent>> {
    let class_id = class_id.get();

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             u.id, u.username, u.role, u.phone,
             p.id, p.student_id, p.class_id, p.surah, p.ayah, p.page, p.updated_by
           FROM class_members cm
           JOIN users u ON u.id = cm.student_id
           LEFT JOIN progress p
             ON p.student_id = cm.student_id AND p.class_id = cm.class_id
           WHERE cm.class_id = ?1
           ORDER BY u.username",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![class_id], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_enrolled).collect()
  }

  // ── Progress ──────────────────────────────────────────────────────────────

  async fn record_initial_progress(
    &self,
    student_id: UserId,
    class_id:   ClassId,
    updated_by: UserId,
  ) -> Result<Progress> {
    let (student_id, class_id, updated_by) =
      (student_id.get(), class_id.get(), updated_by.get());

    let raw: RawProgress = self
      .conn
      .call(move |conn| {
        insert_initial_progress(conn, student_id, class_id, updated_by)?;
        Ok(select_progress(conn, student_id, class_id)?)
      })
      .await?;

    raw.into_progress()
  }

  async fn update_position(&self, id: ProgressId, position: Position) -> Result<Option<Progress>> {
    let id = id.get();

    let raw: Option<RawProgress> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE progress SET surah = ?1, ayah = ?2, page = ?3
             WHERE id = ?4
             RETURNING id, student_id, class_id, surah, ayah, page, updated_by",
            rusqlite::params![position.surah, position.ayah, position.page, id],
            |row| RawProgress::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProgress::into_progress).transpose()
  }

  async fn list_progress(&self, class_id: ClassId) -> Result<Vec<Progress>> {
    let class_id = class_id.get();

    let raws: Vec<RawProgress> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.id, p.student_id, p.class_id, p.surah, p.ayah, p.page, p.updated_by
           FROM progress p
           WHERE p.class_id = ?1
           ORDER BY p.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![class_id], |row| RawProgress::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgress::into_progress).collect()
  }

  async fn latest_progress(&self, student_id: UserId) -> Result<Option<Progress>> {
    let student_id = student_id.get();

    let raw: Option<RawProgress> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT p.id, p.student_id, p.class_id, p.surah, p.ayah, p.page, p.updated_by
             FROM progress p
             WHERE p.student_id = ?1
             ORDER BY p.id DESC
             LIMIT 1",
            rusqlite::params![student_id],
            |row| RawProgress::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProgress::into_progress).transpose()
  }

  // ── Enrollment ────────────────────────────────────────────────────────────

  async fn enroll(
    &self,
    class_id:   ClassId,
    student_id: UserId,
    updated_by: UserId,
  ) -> Result<EnrolledStudent> {
    let (class_id, student_id, updated_by) =
      (class_id.get(), student_id.get(), updated_by.get());

    let (raw, joined, started): (RawMember, bool, bool) = self
      .conn
      .call(move |conn| {
        // Dropping `tx` without commit rolls back both inserts.
        let tx = conn.transaction()?;
        let joined  = insert_membership(&tx, class_id, student_id)?;
        let started = insert_initial_progress(&tx, student_id, class_id, updated_by)?;
        let member  = select_member(&tx, class_id, student_id)?;
        tx.commit()?;
        Ok((member, joined, started))
      })
      .await?;

    debug!(class_id, student_id, joined, started, "enroll committed");
    raw.into_enrolled()
  }
}
