//! Error types for `contacto-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected before the store was touched.
  #[error("{0}")]
  Validation(String),

  #[error("contact {0} not found")]
  NotFound(Uuid),

  #[error("contact with name {name:?} and mobile phone {mobile_phone:?} already exists")]
  Duplicate {
    name:         String,
    mobile_phone: String,
  },

  #[error("contact id {0} is already in use")]
  IdTaken(Uuid),

  /// The record disappeared between lookup and write.
  #[error("contact {0} not found or already deleted")]
  Conflict(Uuid),

  #[error("operation cancelled")]
  Cancelled,
}

impl Error {
  pub(crate) fn validation(msg: impl Into<String>) -> Self {
    Error::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
