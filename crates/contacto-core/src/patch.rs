//! Sparse updates to an existing [`Contact`].
//!
//! Each field is merged by hand. A field that is absent, `null`, or a string
//! that is blank after trimming leaves the target untouched; a blank string
//! never clears a field.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Result,
  contact::{
    Contact, iso_date, parse_id, validate_job_title, validate_mobile_phone,
    validate_name,
  },
};

/// Body accepted by `PATCH /contacts/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
  /// String-form GUID of the contact being updated.
  pub id:           String,
  #[serde(default)]
  pub name:         Option<String>,
  #[serde(default)]
  pub mobile_phone: Option<String>,
  #[serde(default)]
  pub job_title:    Option<String>,
  #[serde(default, deserialize_with = "iso_date::deserialize_opt")]
  pub birth_date:   Option<NaiveDate>,
}

/// A contact field written by [`ContactPatch::merge_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
  Name,
  MobilePhone,
  JobTitle,
  BirthDate,
}

impl ContactField {
  pub fn as_str(self) -> &'static str {
    match self {
      ContactField::Name => "name",
      ContactField::MobilePhone => "mobilePhone",
      ContactField::JobTitle => "jobTitle",
      ContactField::BirthDate => "birthDate",
    }
  }
}

impl ContactPatch {
  /// The contact this patch targets.
  pub fn target_id(&self) -> Result<Uuid> { parse_id(&self.id) }

  /// `true` if merging would change nothing.
  pub fn is_noop(&self) -> bool {
    present(&self.name).is_none()
      && present(&self.mobile_phone).is_none()
      && present(&self.job_title).is_none()
      && self.birth_date.is_none()
  }

  /// Merge onto `target` and return the fields that were written.
  ///
  /// Every supplied value is validated before any assignment, so a rejected
  /// patch leaves `target` exactly as it was.
  pub fn merge_into(&self, target: &mut Contact) -> Result<Vec<ContactField>> {
    let name = present(&self.name).map(validate_name).transpose()?;
    let mobile_phone = present(&self.mobile_phone)
      .map(validate_mobile_phone)
      .transpose()?;
    let job_title = present(&self.job_title)
      .map(validate_job_title)
      .transpose()?;

    let mut written = Vec::new();
    if let Some(name) = name {
      target.name = name;
      written.push(ContactField::Name);
    }
    if let Some(mobile_phone) = mobile_phone {
      target.mobile_phone = mobile_phone;
      written.push(ContactField::MobilePhone);
    }
    if let Some(job_title) = job_title {
      target.job_title = job_title;
      written.push(ContactField::JobTitle);
    }
    if let Some(birth_date) = self.birth_date {
      target.birth_date = birth_date;
      written.push(ContactField::BirthDate);
    }
    Ok(written)
  }
}

/// Trimmed value of a string field, or `None` when it should be skipped.
fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
