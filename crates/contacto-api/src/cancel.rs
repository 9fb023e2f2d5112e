//! Per-request cancellation.
//!
//! [`cancel_on_drop`] gives every request a [`CancellationToken`] that fires
//! when the request future is dropped, which is what hyper does when the
//! client disconnects. Handlers pick the token up with the
//! [`RequestCancellation`] extractor and hand it to detached store work.

use std::convert::Infallible;

use axum::{
  extract::{FromRequestParts, Request},
  http::request::Parts,
  middleware::Next,
  response::Response,
};
use tokio_util::sync::CancellationToken;

/// The cancellation token for the current request.
#[derive(Debug, Clone)]
pub struct RequestCancellation(pub CancellationToken);

/// Middleware installing a [`RequestCancellation`] for the request.
///
/// A token already present in the request extensions becomes the parent, so
/// an outer layer can cancel the request too.
pub async fn cancel_on_drop(mut req: Request, next: Next) -> Response {
  let token = match req.extensions().get::<RequestCancellation>() {
    Some(parent) => parent.0.child_token(),
    None => CancellationToken::new(),
  };
  req.extensions_mut().insert(RequestCancellation(token.clone()));

  let _guard = token.drop_guard();
  next.run(req).await
}

impl<S: Send + Sync> FromRequestParts<S> for RequestCancellation {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    Ok(
      parts
        .extensions
        .get::<RequestCancellation>()
        .cloned()
        .unwrap_or_else(|| RequestCancellation(CancellationToken::new())),
    )
  }
}
