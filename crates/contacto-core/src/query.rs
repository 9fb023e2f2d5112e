//! Paginated, searchable, sortable views over the contact collection.

use crate::contact::name_key;

/// Page size used when the caller does not supply `take`.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Ordering applied before a page is cut.
///
/// The id is always the final tie-breaker, so every ordering is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  Name,
  JobTitle,
  BirthDate,
  /// Fallback for absent or unrecognised keys; always ascending.
  #[default]
  Id,
}

impl SortKey {
  /// Case-insensitive; anything other than `name`, `jobtitle` or
  /// `birthdate` falls back to [`SortKey::Id`].
  pub fn parse(raw: Option<&str>) -> Self {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
      Some("name") => SortKey::Name,
      Some("jobtitle") => SortKey::JobTitle,
      Some("birthdate") => SortKey::BirthDate,
      _ => SortKey::Id,
    }
  }
}

/// Parameters for [`ContactStore::page`](crate::store::ContactStore::page).
#[derive(Debug, Clone)]
pub struct PageQuery {
  pub skip:      usize,
  pub take:      usize,
  /// Substring matched against names only, ignoring case and accents.
  pub search:    Option<String>,
  pub sort_by:   SortKey,
  pub ascending: bool,
}

impl Default for PageQuery {
  fn default() -> Self {
    Self {
      skip:      0,
      take:      DEFAULT_PAGE_SIZE,
      search:    None,
      sort_by:   SortKey::Id,
      ascending: true,
    }
  }
}

impl PageQuery {
  /// Normalised search term, or `None` when it is blank.
  pub fn search_key(&self) -> Option<String> {
    self
      .search
      .as_deref()
      .map(name_key)
      .filter(|k| !k.is_empty())
  }

  /// Direction actually applied; id order ignores `ascending`.
  pub fn effective_ascending(&self) -> bool {
    self.sort_by == SortKey::Id || self.ascending
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_key_parse_is_case_insensitive() {
    assert_eq!(SortKey::parse(Some("Name")), SortKey::Name);
    assert_eq!(SortKey::parse(Some("JOBTITLE")), SortKey::JobTitle);
    assert_eq!(SortKey::parse(Some("birthDate")), SortKey::BirthDate);
  }

  #[test]
  fn unknown_sort_key_falls_back_to_id() {
    assert_eq!(SortKey::parse(None), SortKey::Id);
    assert_eq!(SortKey::parse(Some("mobilephone")), SortKey::Id);
    assert_eq!(SortKey::parse(Some("")), SortKey::Id);
  }

  #[test]
  fn blank_search_is_ignored() {
    let q = PageQuery { search: Some("   ".into()), ..Default::default() };
    assert_eq!(q.search_key(), None);

    let q = PageQuery { search: Some(" LIC ".into()), ..Default::default() };
    assert_eq!(q.search_key().as_deref(), Some("lic"));
  }

  #[test]
  fn id_order_ignores_direction() {
    let q = PageQuery { ascending: false, ..Default::default() };
    assert!(q.effective_ascending());

    let q = PageQuery { sort_by: SortKey::Name, ascending: false, ..Default::default() };
    assert!(!q.effective_ascending());
  }
}
