//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings, which sort in the same
//! order as the UUIDs themselves. Birth dates are stored as `YYYY-MM-DD`.

use chrono::NaiveDate;
use contacto_core::contact::Contact;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every contact read, in [`RawContact::from_row`] order.
pub const CONTACT_COLUMNS: &str =
  "contact_id, name, mobile_phone, job_title, birth_date";

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id:   String,
  pub name:         String,
  pub mobile_phone: String,
  pub job_title:    String,
  pub birth_date:   String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawContact {
      contact_id:   row.get(0)?,
      name:         row.get(1)?,
      mobile_phone: row.get(2)?,
      job_title:    row.get(3)?,
      birth_date:   row.get(4)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:           decode_uuid(&self.contact_id)?,
      name:         self.name,
      mobile_phone: self.mobile_phone,
      job_title:    self.job_title,
      birth_date:   decode_date(&self.birth_date)?,
    })
  }
}

/// Column values written for a contact, `name_key` included.
pub struct ContactRow {
  pub contact_id:   String,
  pub name:         String,
  pub name_key:     String,
  pub mobile_phone: String,
  pub job_title:    String,
  pub birth_date:   String,
}

impl From<&Contact> for ContactRow {
  fn from(c: &Contact) -> Self {
    ContactRow {
      contact_id:   encode_uuid(c.id),
      name:         c.name.clone(),
      name_key:     c.name_key(),
      mobile_phone: c.mobile_phone.clone(),
      job_title:    c.job_title.clone(),
      birth_date:   encode_date(c.birth_date),
    }
  }
}
