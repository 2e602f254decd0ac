use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use birthday_wishes::{
    server,
    submission::{PipelineConfig, SubmissionPipeline, ValidationRules},
    types::Environment,
    wish_backend::{BackendCall, InMemoryWishBackend},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "test-birthday-images";
pub const TEST_TABLE: &str = "test-birthday-wishes";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router over an in-memory backend
pub struct TestSetup {
    pub router: Router,
    pub backend: Arc<InMemoryWishBackend>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_rules(ValidationRules::default())
    }

    pub fn with_rules(rules: ValidationRules) -> Self {
        setup_test_env();

        let backend = Arc::new(InMemoryWishBackend::new());
        let pipeline = Arc::new(SubmissionPipeline::new(
            backend.clone(),
            PipelineConfig {
                bucket: TEST_BUCKET.to_string(),
                table: TEST_TABLE.to_string(),
                default_recipient: "Cheata".to_string(),
                rules,
            },
        ));

        let router = server::router(Environment::Development, pipeline);

        Self { router, backend }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Image payload as the API expects it
pub fn image_payload(filename: &str, content_type: &str, bytes: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "content_type": content_type,
        "data": STANDARD.encode(bytes),
    })
}
