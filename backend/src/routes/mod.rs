mod docs;
mod health;
/// Version 1 of the API
pub mod v1;

use aide::axum::{routing::get, ApiRouter};
use axum::extract::DefaultBodyLimit;

/// Request bodies carry base64 photos of up to 5 MiB
///
/// Larger wish bodies are reported as an oversized photo by the wish handler.
const MAX_REQUEST_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .merge(v1::handler())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
}
