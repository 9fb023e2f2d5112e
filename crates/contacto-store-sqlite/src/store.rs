//! [`SqliteStore`], the SQLite implementation of [`ContactStore`].

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use rusqlite::{ErrorCode, OptionalExtension as _, TransactionBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use contacto_core::{
  contact::Contact,
  patch::ContactPatch,
  query::{PageQuery, SortKey},
  store::ContactStore,
};

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, ContactRow, RawContact, encode_uuid},
  schema::SCHEMA,
};

/// SQLite VM instructions between checks of the abort flag.
const PROGRESS_STEPS: i32 = 1_000;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
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

  /// Open an in-memory store, for tests.
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

  /// Run a contact SELECT that stops as soon as `cancel` fires.
  ///
  /// On cancellation an abort flag is raised; the progress handler installed
  /// for the statement sees it and SQLite interrupts the query on its own
  /// thread.
  async fn select_cancellable(
    &self,
    select: ContactSelect,
    cancel: &CancellationToken,
  ) -> Result<Vec<Contact>> {
    if cancel.is_cancelled() {
      return Err(contacto_core::Error::Cancelled.into());
    }

    let abort = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&abort);

    let work = self.conn.call(move |conn| {
      // Caller already gone.
      if flag.load(Ordering::Relaxed) {
        return Ok(Vec::new());
      }
      let handler_flag = Arc::clone(&flag);
      conn.progress_handler(
        PROGRESS_STEPS,
        Some(move || handler_flag.load(Ordering::Relaxed)),
      );
      let rows = select.run(conn);
      conn.progress_handler(0, None::<fn() -> bool>);
      Ok(rows?)
    });

    let raws = tokio::select! {
      biased;
      _ = cancel.cancelled() => {
        abort.store(true, Ordering::Relaxed);
        return Err(contacto_core::Error::Cancelled.into());
      }
      res = work => res,
    };

    let raws = match raws {
      Ok(raws) => raws,
      Err(tokio_rusqlite::Error::Rusqlite(e))
        if e.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) =>
      {
        return Err(contacto_core::Error::Cancelled.into());
      }
      Err(e) => return Err(e.into()),
    };

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL on the connection thread.
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(conn.execute_batch(sql)?))
      .await?;
    Ok(())
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// A fully-parameterised contact SELECT, built on the async side and
/// executed on the connection thread.
struct ContactSelect {
  sql:        String,
  search_key: Option<String>,
  limit:      i64,
  offset:     i64,
}

impl ContactSelect {
  fn new(
    search_key: Option<String>,
    sort_by: SortKey,
    ascending: bool,
    limit: i64,
    offset: i64,
  ) -> Self {
    let sql = format!(
      "SELECT {CONTACT_COLUMNS}
       FROM contacts
       WHERE ?1 IS NULL OR instr(name_key, ?1) > 0
       {}
       LIMIT ?2 OFFSET ?3",
      order_clause(sort_by, ascending)
    );
    Self { sql, search_key, limit, offset }
  }

  fn run(&self, conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawContact>> {
    let mut stmt = conn.prepare(&self.sql)?;
    stmt
      .query_map(
        rusqlite::params![self.search_key.as_deref(), self.limit, self.offset],
        RawContact::from_row,
      )?
      .collect()
  }
}

/// Every ordering ends on `contact_id` so pages never overlap or reorder.
fn order_clause(sort_by: SortKey, ascending: bool) -> String {
  let dir = if ascending { "ASC" } else { "DESC" };
  match sort_by {
    SortKey::Name => format!("ORDER BY name_key {dir}, contact_id ASC"),
    SortKey::JobTitle => {
      format!("ORDER BY job_title COLLATE NOCASE {dir}, contact_id ASC")
    }
    SortKey::BirthDate => format!("ORDER BY birth_date {dir}, contact_id ASC"),
    SortKey::Id => "ORDER BY contact_id ASC".to_owned(),
  }
}

fn to_sql_count(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn select_by_id(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawContact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
      rusqlite::params![id_str],
      RawContact::from_row,
    )
    .optional()
}

/// `true` if another contact already holds this (name key, phone) pair.
fn pair_taken(
  conn: &rusqlite::Connection,
  row: &ContactRow,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM contacts
         WHERE name_key = ?1 AND mobile_phone = ?2 AND contact_id != ?3",
        rusqlite::params![row.name_key, row.mobile_phone, row.contact_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn duplicate(contact: &Contact) -> Error {
  contacto_core::Error::Duplicate {
    name:         contact.name.clone(),
    mobile_phone: contact.mobile_phone.clone(),
  }
  .into()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

fn insert_contact(conn: &mut rusqlite::Connection, contact: &Contact) -> Result<()> {
  let row = ContactRow::from(contact);
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  if select_by_id(&tx, &row.contact_id)?.is_some() {
    return Err(contacto_core::Error::IdTaken(contact.id).into());
  }
  if pair_taken(&tx, &row)? {
    return Err(duplicate(contact));
  }

  let inserted = tx.execute(
    "INSERT INTO contacts (
       contact_id, name, name_key, mobile_phone, job_title, birth_date
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      row.contact_id,
      row.name,
      row.name_key,
      row.mobile_phone,
      row.job_title,
      row.birth_date,
    ],
  );
  match inserted {
    Err(e) if is_constraint_violation(&e) => return Err(duplicate(contact)),
    other => other?,
  };

  tx.commit()?;
  Ok(())
}

fn update_contact(
  conn: &mut rusqlite::Connection,
  id: Uuid,
  patch: &ContactPatch,
) -> Result<Contact> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let mut contact = select_by_id(&tx, &encode_uuid(id))?
    .ok_or(contacto_core::Error::NotFound(id))?
    .into_contact()?;

  let written = patch.merge_into(&mut contact)?;
  if written.is_empty() {
    return Ok(contact);
  }

  let row = ContactRow::from(&contact);
  if pair_taken(&tx, &row)? {
    return Err(duplicate(&contact));
  }

  let changed = tx.execute(
    "UPDATE contacts
     SET name = ?2, name_key = ?3, mobile_phone = ?4, job_title = ?5, birth_date = ?6
     WHERE contact_id = ?1",
    rusqlite::params![
      row.contact_id,
      row.name,
      row.name_key,
      row.mobile_phone,
      row.job_title,
      row.birth_date,
    ],
  );
  let changed = match changed {
    Err(e) if is_constraint_violation(&e) => return Err(duplicate(&contact)),
    other => other?,
  };
  if changed == 0 {
    return Err(contacto_core::Error::Conflict(id).into());
  }

  tx.commit()?;
  Ok(contact)
}

fn delete_contact(conn: &mut rusqlite::Connection, id: Uuid) -> Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let deleted = tx.execute(
    "DELETE FROM contacts WHERE contact_id = ?1",
    rusqlite::params![encode_uuid(id)],
  )?;
  if deleted == 0 {
    return Err(contacto_core::Error::NotFound(id).into());
  }
  tx.commit()?;
  Ok(())
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }

  async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<Contact>> {
    // A negative LIMIT means "no limit" to SQLite.
    let select = ContactSelect::new(None, SortKey::Name, true, -1, 0);
    self.select_cancellable(select, cancel).await
  }

  async fn page(
    &self,
    query: &PageQuery,
    cancel: &CancellationToken,
  ) -> Result<Vec<Contact>> {
    let select = ContactSelect::new(
      query.search_key(),
      query.sort_by,
      query.effective_ascending(),
      to_sql_count(query.take),
      to_sql_count(query.skip),
    );
    self.select_cancellable(select, cancel).await
  }

  async fn get(&self, id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_by_id(conn, &id_str)?))
      .await?;
    raw.map(RawContact::into_contact).transpose()
  }

  async fn create(&self, contact: Contact) -> Result<Contact> {
    let stored = contact.clone();
    self
      .conn
      .call(move |conn| Ok(insert_contact(conn, &stored)))
      .await??;

    tracing::info!(id = %contact.id, "contact created");
    Ok(contact)
  }

  async fn update(&self, id: Uuid, patch: &ContactPatch) -> Result<Contact> {
    let patch = patch.clone();
    let contact = self
      .conn
      .call(move |conn| Ok(update_contact(conn, id, &patch)))
      .await??;

    tracing::info!(%id, "contact updated");
    Ok(contact)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(delete_contact(conn, id)))
      .await??;

    tracing::info!(%id, "contact deleted");
    Ok(())
  }
}
