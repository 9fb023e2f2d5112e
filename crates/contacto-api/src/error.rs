//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is logged once, where it is converted, and answered with a
//! JSON body `{"error": "...", "kind": "..."}`. Internal failures carry a
//! generic message; their cause only reaches the log.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use contacto_core::{Error as DomainFailure, store::DomainError};
use serde_json::json;
use thiserror::Error;

/// Non-standard status used when the client went away mid-request.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  /// Uniqueness violation on create or update.
  #[error("{0}")]
  Duplicate(String),

  /// The record vanished between lookup and write.
  #[error("{0}")]
  Stale(String),

  #[error("client disconnected")]
  Cancelled,

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  /// Classify a store (or domain) failure raised while performing `op`,
  /// e.g. `"updating the contact"`.
  pub fn from_store<E>(op: &'static str, err: E) -> Self
  where
    E: std::error::Error + DomainError,
  {
    match err.domain() {
      Some(DomainFailure::Validation(msg)) => {
        tracing::warn!(op, "validation failed: {msg}");
        ApiError::BadRequest(msg.clone())
      }
      Some(DomainFailure::NotFound(id)) => {
        tracing::warn!(op, %id, "contact not found");
        ApiError::NotFound(format!("Contact with id {id} not found."))
      }
      Some(e @ (DomainFailure::Duplicate { .. } | DomainFailure::IdTaken(_))) => {
        tracing::warn!(op, "{e}");
        ApiError::Duplicate(e.to_string())
      }
      Some(DomainFailure::Conflict(id)) => {
        tracing::warn!(op, %id, "contact changed underneath the write");
        ApiError::Stale(format!(
          "Contact with id {id} not found or already deleted."
        ))
      }
      Some(DomainFailure::Cancelled) => {
        tracing::warn!(op, "client disconnected");
        ApiError::Cancelled
      }
      None => ApiError::internal(op, &err),
    }
  }

  /// Log `err` and hide it behind a generic message.
  pub fn internal(op: &'static str, err: &dyn std::error::Error) -> Self {
    tracing::error!(op, error = %err, "request failed");
    ApiError::Internal(format!("An error occurred while {op}."))
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) | ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) | ApiError::Stale(_) => StatusCode::NOT_FOUND,
      ApiError::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      ApiError::BadRequest(_) => "validation",
      ApiError::NotFound(_) => "not_found",
      ApiError::Duplicate(_) | ApiError::Stale(_) => "conflict",
      ApiError::Cancelled => "cancelled",
      ApiError::Internal(_) => "internal",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = json!({ "error": self.to_string(), "kind": self.kind() });
    (status, Json(body)).into_response()
  }
}
