//! SQL schema for the Contacto SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS contacts (
    contact_id    TEXT PRIMARY KEY,   -- hyphenated lowercase UUID
    name          TEXT NOT NULL,
    name_key      TEXT NOT NULL,      -- case/accent/width-folded name
    mobile_phone  TEXT NOT NULL,
    job_title     TEXT NOT NULL,
    birth_date    TEXT NOT NULL       -- YYYY-MM-DD
);

-- (name, mobile phone) is unique under the folded name.
CREATE UNIQUE INDEX IF NOT EXISTS contacts_name_phone_idx
    ON contacts(name_key, mobile_phone);
CREATE INDEX IF NOT EXISTS contacts_job_title_idx  ON contacts(job_title COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS contacts_birth_date_idx ON contacts(birth_date);

PRAGMA user_version = 1;
";
