//! A single person record and the rules its fields obey.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{Error, Result};

pub const NAME_MAX_CHARS: usize = 100;
pub const MOBILE_PHONE_MAX_CHARS: usize = 20;
pub const JOB_TITLE_MAX_CHARS: usize = 50;

// ─── Contact ──────────────────────────────────────────────────────────────────

/// A persisted contact. `id` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:           Uuid,
  pub name:         String,
  pub mobile_phone: String,
  pub job_title:    String,
  #[serde(with = "iso_date")]
  pub birth_date:   NaiveDate,
}

impl Contact {
  /// Key under which the (name, phone) uniqueness invariant is enforced.
  pub fn name_key(&self) -> String { name_key(&self.name) }
}

// ─── Creation ─────────────────────────────────────────────────────────────────

/// Body accepted by `POST /contacts`.
///
/// String fields default to empty so a missing field surfaces as a
/// validation message rather than a deserialisation failure. `birthDate` is
/// optional; absent, `null` or blank stores [`unknown_birth_date`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
  #[serde(default)]
  pub id:           Option<Uuid>,
  #[serde(default)]
  pub name:         String,
  #[serde(default)]
  pub mobile_phone: String,
  #[serde(default)]
  pub job_title:    String,
  #[serde(default, deserialize_with = "iso_date::deserialize_opt")]
  pub birth_date:   Option<NaiveDate>,
}

/// Birth date recorded when a contact is created without one (`0001-01-01`).
pub fn unknown_birth_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
}

impl NewContact {
  /// Validate every field and assign an id if the caller did not supply one.
  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:           self.id.unwrap_or_else(Uuid::new_v4),
      name:         validate_name(&self.name)?,
      mobile_phone: validate_mobile_phone(&self.mobile_phone)?,
      job_title:    validate_job_title(&self.job_title)?,
      birth_date:   self.birth_date.unwrap_or_else(unknown_birth_date),
    })
  }
}

// ─── Field rules ──────────────────────────────────────────────────────────────

pub fn validate_name(raw: &str) -> Result<String> {
  required_text("name", raw, NAME_MAX_CHARS)
}

pub fn validate_job_title(raw: &str) -> Result<String> {
  required_text("jobTitle", raw, JOB_TITLE_MAX_CHARS)
}

/// Digits with an optional single leading `+`.
pub fn validate_mobile_phone(raw: &str) -> Result<String> {
  let phone = required_text("mobilePhone", raw, MOBILE_PHONE_MAX_CHARS)?;
  let digits = phone.strip_prefix('+').unwrap_or(&phone);
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return Err(Error::validation(format!(
      "mobilePhone may only contain digits and a leading '+', got {phone:?}"
    )));
  }
  Ok(phone)
}

fn required_text(field: &str, raw: &str, max: usize) -> Result<String> {
  let value = raw.trim();
  if value.is_empty() {
    return Err(Error::validation(format!("{field} is required")));
  }
  let len = value.chars().count();
  if len > max {
    return Err(Error::validation(format!(
      "{field} must be at most {max} characters, got {len}"
    )));
  }
  Ok(value.to_owned())
}

/// Parse a string-form GUID as received in a path or body.
pub fn parse_id(raw: &str) -> Result<Uuid> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Err(Error::validation("id cannot be empty"));
  }
  Uuid::parse_str(raw)
    .map_err(|_| Error::validation(format!("invalid GUID format: {raw:?}")))
}

/// Comparison form of a name: compatibility-decomposed, stripped of
/// combining marks, lowercased. "Ｊosé" and "jose" share a key.
pub fn name_key(name: &str) -> String {
  name
    .trim()
    .nfkd()
    .filter(|c| !is_combining_mark(*c))
    .flat_map(char::to_lowercase)
    .collect()
}

// ─── Dates ────────────────────────────────────────────────────────────────────

/// Accepts `YYYY-MM-DD`, RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]`;
/// any time component is dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(date);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(dt.date_naive());
  }
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
    .map(|dt| dt.date())
    .map_err(|_| Error::validation(format!("invalid date: {raw:?}")))
}

/// Serde adapter writing calendar dates as `YYYY-MM-DD`.
pub mod iso_date {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format("%Y-%m-%d"))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_date(&raw).map_err(de::Error::custom)
  }

  /// `null`, absent, or blank all mean "no date".
  pub fn deserialize_opt<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(d)? {
      Some(raw) if !raw.trim().is_empty() => {
        super::parse_date(&raw).map(Some).map_err(de::Error::custom)
      }
      _ => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_contact(name: &str, phone: &str, job: &str) -> NewContact {
    NewContact {
      id:           None,
      name:         name.into(),
      mobile_phone: phone.into(),
      job_title:    job.into(),
      birth_date:   NaiveDate::from_ymd_opt(1990, 5, 1),
    }
  }

  #[test]
  fn missing_birth_date_defaults_to_unknown() {
    let input: NewContact = serde_json::from_value(serde_json::json!({
      "name": "Alice",
      "mobilePhone": "123",
      "jobTitle": "Lead"
    }))
    .unwrap();
    let c = input.into_contact().unwrap();
    assert_eq!(c.birth_date, NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
    assert_eq!(serde_json::to_value(&c).unwrap()["birthDate"], "0001-01-01");
  }

  #[test]
  fn into_contact_trims_and_assigns_id() {
    let c = new_contact("  Alice  ", " +375291650 ", " Lead ").into_contact().unwrap();
    assert_eq!(c.name, "Alice");
    assert_eq!(c.mobile_phone, "+375291650");
    assert_eq!(c.job_title, "Lead");
    assert!(!c.id.is_nil());
  }

  #[test]
  fn into_contact_keeps_supplied_id() {
    let id = Uuid::new_v4();
    let mut input = new_contact("Alice", "123", "Lead");
    input.id = Some(id);
    assert_eq!(input.into_contact().unwrap().id, id);
  }

  #[test]
  fn missing_fields_are_validation_errors() {
    let err = new_contact("   ", "123", "Lead").into_contact().unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("name")));
    let err = new_contact("Alice", "", "Lead").into_contact().unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("mobilePhone")));
    let err = new_contact("Alice", "123", "").into_contact().unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("jobTitle")));
  }

  #[test]
  fn length_limits_count_characters() {
    assert!(validate_name(&"é".repeat(100)).is_ok());
    assert!(validate_name(&"a".repeat(101)).is_err());
    assert!(validate_job_title(&"a".repeat(50)).is_ok());
    assert!(validate_job_title(&"a".repeat(51)).is_err());
    assert!(validate_mobile_phone(&"1".repeat(20)).is_ok());
    assert!(validate_mobile_phone(&"1".repeat(21)).is_err());
  }

  #[test]
  fn phone_allows_only_digits_and_leading_plus() {
    assert!(validate_mobile_phone("+375291650").is_ok());
    assert!(validate_mobile_phone("375291650").is_ok());
    assert!(validate_mobile_phone("+").is_err());
    assert!(validate_mobile_phone("37+5").is_err());
    assert!(validate_mobile_phone("123-456").is_err());
  }

  #[test]
  fn parse_id_distinguishes_blank_and_malformed() {
    assert!(matches!(parse_id("  "), Err(Error::Validation(ref m)) if m.contains("empty")));
    assert!(matches!(parse_id("nope"), Err(Error::Validation(ref m)) if m.contains("GUID")));
    let id = Uuid::new_v4();
    assert_eq!(parse_id(&id.to_string()).unwrap(), id);
  }

  #[test]
  fn name_key_folds_case_accents_and_width() {
    assert_eq!(name_key("ALICE"), name_key("alice"));
    assert_eq!(name_key("José"), name_key("jose"));
    assert_eq!(name_key("Ｊｏｓｅ"), "jose");
    assert_ne!(name_key("Alice"), name_key("Alicia"));
  }

  #[test]
  fn parse_date_accepts_date_and_datetime_forms() {
    let expected = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
    assert_eq!(parse_date("1990-05-01").unwrap(), expected);
    assert_eq!(parse_date("1990-05-01T00:00:00").unwrap(), expected);
    assert_eq!(parse_date("1990-05-01T13:45:00.000Z").unwrap(), expected);
    assert!(parse_date("01/05/1990").is_err());
  }

  #[test]
  fn contact_json_uses_camel_case_and_plain_dates() {
    let c = new_contact("Alice", "123", "Lead").into_contact().unwrap();
    let json = serde_json::to_value(&c).unwrap();
    assert_eq!(json["mobilePhone"], "123");
    assert_eq!(json["jobTitle"], "Lead");
    assert_eq!(json["birthDate"], "1990-05-01");
  }
}
