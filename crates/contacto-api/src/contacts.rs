//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | All contacts, sorted by name |
//! | `GET`    | `/contacts/p` | `?skip&take&search&sortBy&ascending` |
//! | `GET`    | `/contacts/{id}` | 400 on a malformed id, 404 if not found |
//! | `POST`   | `/contacts` | Body: [`NewContact`]; returns 201 + `Location` |
//! | `PATCH`  | `/contacts/{id}` | Body: [`ContactPatch`]; returns the merged contact |
//! | `DELETE` | `/contacts/{id}` | 204, or 404 if already gone |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    OriginalUri, Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::{StatusCode, header},
  response::IntoResponse,
};
use contacto_core::{
  contact::{Contact, NewContact, parse_id},
  patch::ContactPatch,
  query::{PageQuery, SortKey},
  store::ContactStore,
};
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::{ApiState, PageLimits, cancel::RequestCancellation, error::ApiError};

const OP_LIST: &str = "retrieving contacts";
const OP_GET: &str = "retrieving the contact";
const OP_CREATE: &str = "creating the contact";
const OP_UPDATE: &str = "updating the contact";
const OP_DELETE: &str = "deleting the contact";

/// Wait for a detached read. A panicked or aborted task is an internal error.
async fn join_read<T>(
  handle: JoinHandle<Result<T, ApiError>>,
  op: &'static str,
) -> Result<T, ApiError> {
  handle.await.map_err(|e| ApiError::internal(op, &e))?
}

// ─── List all ─────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list_all<S>(
  State(state): State<ApiState<S>>,
  RequestCancellation(cancel): RequestCancellation,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactStore + 'static,
{
  let store = Arc::clone(&state.store);
  // Detached so a disconnect is still observed and logged by the task.
  let handle = tokio::spawn(async move {
    store
      .list_all(&cancel)
      .await
      .map_err(|e| ApiError::from_store(OP_LIST, e))
  });
  Ok(Json(join_read(handle, OP_LIST).await?))
}

// ─── Page ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
  #[serde(default)]
  pub skip:      usize,
  /// Defaults to the configured page size; clamped to the maximum.
  pub take:      Option<usize>,
  pub search:    Option<String>,
  /// `name`, `jobtitle` or `birthdate`; anything else orders by id.
  pub sort_by:   Option<String>,
  #[serde(default = "default_ascending")]
  pub ascending: bool,
}

fn default_ascending() -> bool { true }

impl PageParams {
  pub fn into_query(self, limits: PageLimits) -> PageQuery {
    PageQuery {
      skip:      self.skip,
      take:      self.take.unwrap_or(limits.default_take).min(limits.max_take),
      sort_by:   SortKey::parse(self.sort_by.as_deref()),
      search:    self.search,
      ascending: self.ascending,
    }
  }
}

/// `GET /contacts/p[?skip=..][&take=..][&search=..][&sortBy=..][&ascending=..]`
pub async fn list_page<S>(
  State(state): State<ApiState<S>>,
  RequestCancellation(cancel): RequestCancellation,
  params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactStore + 'static,
{
  let Query(params) = params.map_err(|e| {
    tracing::warn!("rejected page query: {}", e.body_text());
    ApiError::BadRequest(e.body_text())
  })?;
  let query = params.into_query(state.limits);

  tracing::info!(
    skip = query.skip,
    take = query.take,
    search = query.search.as_deref().unwrap_or("N/A"),
    sort_by = ?query.sort_by,
    ascending = query.ascending,
    "retrieving contact page"
  );

  let store = Arc::clone(&state.store);
  let handle = tokio::spawn(async move {
    store
      .page(&query, &cancel)
      .await
      .map_err(|e| ApiError::from_store(OP_LIST, e))
  });
  let contacts = join_read(handle, OP_LIST).await?;

  tracing::info!(count = contacts.len(), "retrieved contact page");
  Ok(Json(contacts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore + 'static,
{
  let id = parse_id(&raw_id).map_err(|e| ApiError::from_store(OP_GET, e))?;
  let contact = state
    .store
    .get(id)
    .await
    .map_err(|e| ApiError::from_store(OP_GET, e))?
    .ok_or_else(|| ApiError::NotFound(format!("Contact with id {id} not found.")))?;
  Ok(Json(contact))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts`. Returns 201 and the stored [`Contact`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  OriginalUri(uri): OriginalUri,
  body: Result<Json<NewContact>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore + 'static,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let contact = body
    .into_contact()
    .map_err(|e| ApiError::from_store(OP_CREATE, e))?;

  let contact = state
    .store
    .create(contact)
    .await
    .map_err(|e| ApiError::from_store(OP_CREATE, e))?;

  let location = format!("{}/{}", uri.path().trim_end_matches('/'), contact.id);
  Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(contact)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /contacts/{id}`. The body's `id` must name the same contact.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(raw_id): Path<String>,
  body: Result<Json<ContactPatch>, JsonRejection>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore + 'static,
{
  let id = parse_id(&raw_id).map_err(|e| ApiError::from_store(OP_UPDATE, e))?;
  let Json(patch) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let target = patch
    .target_id()
    .map_err(|e| ApiError::from_store(OP_UPDATE, e))?;

  if target != id {
    tracing::warn!(%id, %target, "patch body names a different contact");
    return Err(ApiError::BadRequest(format!(
      "body id {target} does not match path id {id}"
    )));
  }
  if patch.is_noop() {
    tracing::debug!(%id, "patch carries no changes");
  }

  let contact = state
    .store
    .update(id, &patch)
    .await
    .map_err(|e| ApiError::from_store(OP_UPDATE, e))?;
  Ok(Json(contact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ContactStore + 'static,
{
  let id = parse_id(&raw_id).map_err(|e| ApiError::from_store(OP_DELETE, e))?;
  state
    .store
    .delete(id)
    .await
    .map_err(|e| ApiError::from_store(OP_DELETE, e))?;
  Ok(StatusCode::NO_CONTENT)
}
