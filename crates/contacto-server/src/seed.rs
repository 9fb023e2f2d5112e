//! Demo data for an empty store.

use chrono::{Days, Months, NaiveDate};
use contacto_core::{contact::Contact, store::ContactStore};
use uuid::Uuid;

pub const DEMO_CONTACTS: u64 = 50;

/// Insert [`DEMO_CONTACTS`] generated contacts if the store holds none.
///
/// Returns how many were inserted; `0` when the store already had data.
pub async fn seed_if_empty<S: ContactStore>(
  store: &S,
  today: NaiveDate,
) -> Result<u64, S::Error> {
  if store.count().await? > 0 {
    tracing::debug!("store already populated, skipping demo data");
    return Ok(0);
  }

  let base = today.checked_sub_months(Months::new(25 * 12)).unwrap_or(today);
  for i in 1..=DEMO_CONTACTS {
    store
      .create(Contact {
        id:           Uuid::new_v4(),
        name:         format!("User {i}"),
        mobile_phone: format!("37529165{i:02}"),
        job_title:    format!("Manager {i:02}"),
        birth_date:   base.checked_add_days(Days::new(30 * i)).unwrap_or(base),
      })
      .await?;
  }

  tracing::info!(count = DEMO_CONTACTS, "seeded demo contacts");
  Ok(DEMO_CONTACTS)
}

#[cfg(test)]
mod tests {
  use contacto_core::query::{PageQuery, SortKey};
  use contacto_store_sqlite::SqliteStore;
  use tokio_util::sync::CancellationToken;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 2, 29).unwrap() }

  #[tokio::test]
  async fn seeds_an_empty_store_once() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    assert_eq!(seed_if_empty(&store, today()).await.unwrap(), DEMO_CONTACTS);
    assert_eq!(store.count().await.unwrap(), 50);
    assert_eq!(seed_if_empty(&store, today()).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 50);
  }

  #[tokio::test]
  async fn demo_contacts_follow_the_pattern() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    seed_if_empty(&store, today()).await.unwrap();

    let query = PageQuery {
      take: 1,
      search: Some("user 7".into()),
      sort_by: SortKey::Name,
      ..Default::default()
    };
    let page = store.page(&query, &CancellationToken::new()).await.unwrap();
    let seven = &page[0];
    assert_eq!(seven.name, "User 7");
    assert_eq!(seven.mobile_phone, "3752916507");
    assert_eq!(seven.job_title, "Manager 07");
    // 2024-02-29 minus 25 years clamps to 1999-02-28.
    assert_eq!(seven.birth_date, NaiveDate::from_ymd_opt(1999, 9, 26).unwrap());
  }
}
