//! HTTP host for the Contacto API.
//!
//! Wraps [`contacto_api::api_router`] under `/api` with request tracing,
//! security headers and CORS, and optionally serves a built web client.

pub mod security;
pub mod seed;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use contacto_api::{ApiState, PageLimits, api_router};
use contacto_core::{query::DEFAULT_PAGE_SIZE, store::ContactStore};
use serde::Deserialize;
use tower_http::{
  cors::CorsLayer,
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CONTACTO_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Origins allowed to call the API from a browser.
  pub cors_origins:      Vec<String>,
  pub default_page_size: usize,
  pub max_page_size:     usize,
  /// Fill an empty store with generated contacts on startup. Off by default
  /// so a fresh deployment starts empty; `--seed` turns it on per run.
  pub seed_demo_data:    bool,
  /// Directory holding a built web client; unknown paths fall back to its
  /// `index.html`.
  pub static_dir:        Option<PathBuf>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_owned(),
      port:              7123,
      store_path:        PathBuf::from("contacto.db"),
      cors_origins:      vec!["https://localhost:46532".to_owned()],
      default_page_size: DEFAULT_PAGE_SIZE,
      max_page_size:     100,
      seed_demo_data:    false,
      static_dir:        None,
    }
  }
}

impl ServerConfig {
  pub fn page_limits(&self) -> PageLimits {
    PageLimits {
      default_take: self.default_page_size.min(self.max_page_size),
      max_take:     self.max_page_size,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router for `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: ContactStore + 'static,
{
  let state = ApiState::new(store).with_limits(config.page_limits());
  let mut router = Router::new().nest("/api", api_router(state));

  if let Some(dir) = &config.static_dir {
    tracing::info!(dir = %dir.display(), "serving web client");
    let index = ServeFile::new(dir.join("index.html"));
    router = router.fallback_service(ServeDir::new(dir).fallback(index));
  }

  let router = router.layer(cors_layer(&config.cors_origins));
  security::with_security_headers(router).layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  let mut allowed = Vec::with_capacity(origins.len());
  for origin in origins {
    match HeaderValue::from_str(origin) {
      Ok(value) => allowed.push(value),
      Err(e) => tracing::warn!("ignoring invalid CORS origin {origin:?}: {e}"),
    }
  }

  CorsLayer::new()
    .allow_origin(allowed)
    .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
