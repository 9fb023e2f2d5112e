//! The `ContactStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `contacto-store-sqlite`).
//! Higher layers (`contacto-api`, `contacto-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{contact::Contact, error::Error, patch::ContactPatch, query::PageQuery};

/// Exposes the domain failure carried by a backend error, if any.
///
/// Lets callers tell "not found" or "duplicate" apart from an I/O failure
/// without knowing the backend's error type.
pub trait DomainError {
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

/// Abstraction over a contact store backend.
///
/// Writes are atomic: a uniqueness check and the insert, or a lookup and the
/// mutation, commit together or not at all. Reads take a
/// [`CancellationToken`] and resolve to [`Error::Cancelled`] once it fires.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  /// Number of stored contacts.
  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Every contact, ordered by name.
  fn list_all<'a>(
    &'a self,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// One filtered, sorted page.
  fn page<'a>(
    &'a self,
    query: &'a PageQuery,
    cancel: &'a CancellationToken,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Persist an already-validated contact.
  ///
  /// Fails with [`Error::Duplicate`] if the (name, mobile phone) pair is taken
  /// and [`Error::IdTaken`] if the id is.
  fn create(
    &self,
    contact: Contact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Merge `patch` onto contact `id` and return the stored result.
  fn update<'a>(
    &'a self,
    id: Uuid,
    patch: &'a ContactPatch,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + 'a;

  /// Permanently delete contact `id`; [`Error::NotFound`] if absent.
  fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
