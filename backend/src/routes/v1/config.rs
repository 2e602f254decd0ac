use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::submission::SubmissionPipeline;

/// Limits the client should enforce before submitting
#[derive(Debug, Serialize, JsonSchema)]
pub struct ConfigResponse {
    /// Whether a recipient name must be provided
    recipient_required: bool,
    /// Recipient used when none is provided
    default_recipient: String,
    /// Minimum author name length in characters
    min_name_chars: usize,
    /// Maximum author name length in characters
    max_name_chars: usize,
    /// Minimum message length in characters
    min_message_chars: usize,
    /// Maximum photo size in bytes
    max_image_size_bytes: usize,
}

/// Form limits for this deployment
pub async fn get_config(
    Extension(pipeline): Extension<Arc<SubmissionPipeline>>,
) -> Json<ConfigResponse> {
    let config = pipeline.config();

    Json(ConfigResponse {
        recipient_required: config.rules.recipient_required,
        default_recipient: config.default_recipient.clone(),
        min_name_chars: config.rules.min_name_chars,
        max_name_chars: config.rules.max_name_chars,
        min_message_chars: config.rules.min_message_chars,
        max_image_size_bytes: config.rules.max_image_bytes,
    })
}
