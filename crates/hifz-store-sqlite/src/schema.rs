//! SQL schema for the hifz SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT    NOT NULL UNIQUE,
    secret_hash TEXT    NOT NULL,   -- argon2 PHC string, never plaintext
    role        TEXT    NOT NULL CHECK (role IN ('admin', 'teacher', 'student')),
    phone       TEXT
);

CREATE TABLE IF NOT EXISTS classes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    teacher_id INTEGER NOT NULL REFERENCES users(id)
);

-- Existence of the row is the membership; there is no other identity.
CREATE TABLE IF NOT EXISTS class_members (
    class_id   INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
    student_id INTEGER NOT NULL REFERENCES users(id)   ON DELETE CASCADE,
    UNIQUE (class_id, student_id)
);

-- Not cascaded from class_members: leaving a class keeps the history.
CREATE TABLE IF NOT EXISTS progress (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES users(id)   ON DELETE CASCADE,
    class_id   INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
    surah      INTEGER NOT NULL CHECK (surah BETWEEN 1 AND 114),
    ayah       INTEGER NOT NULL CHECK (ayah >= 1),
    page       INTEGER NOT NULL CHECK (page BETWEEN 1 AND 604),
    updated_by INTEGER NOT NULL REFERENCES users(id),
    UNIQUE (student_id, class_id)
);

CREATE INDEX IF NOT EXISTS classes_teacher_idx ON classes(teacher_id);
CREATE INDEX IF NOT EXISTS progress_class_idx  ON progress(class_id);

PRAGMA user_version = 1;
";
