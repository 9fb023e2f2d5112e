//! Browser-hardening response headers.

use axum::{
  Router,
  http::{HeaderName, HeaderValue},
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers stamped on every response unless a handler already set them.
pub const SECURITY_HEADERS: [(&str, &str); 6] = [
  ("x-content-type-options", "nosniff"),
  ("x-frame-options", "DENY"),
  ("x-xss-protection", "1; mode=block"),
  ("referrer-policy", "strict-origin-when-cross-origin"),
  (
    "permissions-policy",
    "accelerometer=(), camera=(), geolocation=(), gyroscope=(), \
     magnetometer=(), microphone=(), payment=(), usb=()",
  ),
  (
    "content-security-policy",
    "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; \
     font-src 'self'; img-src 'self' data:; connect-src 'self'; \
     frame-ancestors 'none';",
  ),
];

/// Wrap `router` so each response carries [`SECURITY_HEADERS`].
pub fn with_security_headers(router: Router) -> Router {
  SECURITY_HEADERS
    .iter()
    .fold(router, |router, &(name, value)| {
      router.layer(SetResponseHeaderLayer::if_not_present(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
      ))
    })
}
