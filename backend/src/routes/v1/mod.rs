/// Form limits
pub mod config;
/// Wish submission, preview and lookup
pub mod wishes;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/v1/config", get(config::get_config))
        .api_route("/v1/wishes", post(wishes::create_wish))
        .api_route("/v1/wishes/preview", post(wishes::preview_wish))
        .api_route("/v1/wishes/{id}", get(wishes::get_wish))
}
