//! JSON REST API for Contacto.
//!
//! Exposes an axum [`Router`] backed by any [`contacto_core::store::ContactStore`].
//! TLS, CORS, and static files are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", contacto_api::api_router(ApiState::new(store)))
//! ```

pub mod cancel;
pub mod contacts;
pub mod error;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use contacto_core::{query::DEFAULT_PAGE_SIZE, store::ContactStore};

pub use error::ApiError;

/// Bounds applied to `take` on the paginated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
  pub default_take: usize,
  pub max_take:     usize,
}

impl Default for PageLimits {
  fn default() -> Self {
    Self { default_take: DEFAULT_PAGE_SIZE, max_take: 100 }
  }
}

/// Shared handler state.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub limits: PageLimits,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, limits: PageLimits::default() }
  }

  pub fn with_limits(mut self, limits: PageLimits) -> Self {
    self.limits = limits;
    self
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), limits: self.limits }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: ContactStore + 'static,
{
  Router::new()
    .route(
      "/contacts",
      get(contacts::list_all::<S>).post(contacts::create::<S>),
    )
    .route("/contacts/p", get(contacts::list_page::<S>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>)
        .patch(contacts::update::<S>)
        .delete(contacts::delete_one::<S>),
    )
    .layer(middleware::from_fn(cancel::cancel_on_drop))
    .with_state(state)
}
