use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    Extension, Json,
};
use axum_valid::{Valid, ValidRejection, ValidationRejection};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Local;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;
use wish_storage::wish::StoredWish;

use crate::{
    submission::{
        ImageFile, ImagePreview, Preview, PreviewConfig, SubmissionError, SubmissionPipeline,
        ValidationError, ValidationRules, WishDraft, WishFields,
    },
    types::AppError,
};

/// Photo attached to a wish
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct ImageUpload {
    /// Original file name
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// MIME type of the file
    #[validate(length(min = 1, max = 255))]
    pub content_type: String,
    /// Base64-encoded file contents
    pub data: String,
}

/// Request to submit a wish
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateWishRequest {
    /// Name of the person sending the wish
    pub author_name: String,
    /// Name of the person the wish is for
    #[serde(default)]
    pub recipient_name: Option<String>,
    /// The wish itself
    pub message: String,
    /// Optional photo
    #[serde(default)]
    #[validate(nested)]
    pub image: Option<ImageUpload>,
}

/// Response when a wish was stored
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateWishResponse {
    /// Unique ID of the stored wish
    pub id: String,
    /// Public URL of the photo, empty when none was attached
    pub image_url: String,
    /// ISO-8601 UTC timestamp of creation
    pub created_at: String,
}

/// Request to render a preview card
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewRequest {
    /// Name of the person sending the wish
    pub author_name: String,
    /// Name of the person the wish is for
    pub recipient_name: Option<String>,
    /// The wish itself
    pub message: String,
}

impl CreateWishRequest {
    fn into_draft(self) -> Result<WishDraft, AppError> {
        let image = self
            .image
            .map(|upload| {
                let bytes = STANDARD
                    .decode(upload.data.as_bytes())
                    .map_err(|_| AppError::invalid_input("Image data is not valid base64"))?;
                Ok::<_, AppError>(ImageFile::new(upload.filename, upload.content_type, bytes))
            })
            .transpose()?;

        Ok(WishDraft {
            fields: WishFields {
                author_name: self.author_name,
                recipient_name: self.recipient_name,
                message: self.message,
            },
            image,
        })
    }
}

/// Maps a body that could not be extracted onto the API error envelope
///
/// A body over the request size limit can only come from an oversized photo,
/// so it is reported like any other photo that is too large.
fn body_rejection(
    rejection: ValidRejection<JsonRejection>,
    headers: &HeaderMap,
    rules: &ValidationRules,
) -> AppError {
    match rejection {
        ValidationRejection::Valid(errors) => AppError::invalid_input(errors.to_string()),
        ValidationRejection::Inner(rejection)
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
        {
            // Only known to be over the limit when the client sent no length
            let size = headers
                .get(CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
                .unwrap_or(rules.max_image_bytes + 1);

            SubmissionError::Invalid(ValidationError::ImageTooLarge {
                size,
                max_bytes: rules.max_image_bytes,
            })
            .into()
        }
        ValidationRejection::Inner(rejection) => AppError::new(
            rejection.status(),
            "invalid_input",
            rejection.body_text(),
            false,
        ),
    }
}

/// Submit a birthday wish
///
/// Validates the wish, stores the photo (if any) and then the wish itself.
/// The wish is only stored once its photo is.
///
/// # Returns
///
/// Returns `201 CREATED` with the stored wish ID and photo URL
///
/// # Errors
///
/// - `400 BAD_REQUEST` - A validation rule failed (including a photo too large
///   for the request body); the message says which
/// - `502 BAD_GATEWAY` - Storing the photo or the wish failed
#[instrument(skip_all)]
pub async fn create_wish(
    Extension(pipeline): Extension<Arc<SubmissionPipeline>>,
    headers: HeaderMap,
    payload: Result<Valid<Json<CreateWishRequest>>, ValidRejection<JsonRejection>>,
) -> Result<(StatusCode, Json<CreateWishResponse>), AppError> {
    let rules = &pipeline.config().rules;
    let Valid(Json(payload)) =
        payload.map_err(|rejection| body_rejection(rejection, &headers, rules))?;
    let draft = payload.into_draft()?;

    let stored = pipeline.submit(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateWishResponse {
            id: stored.id,
            image_url: stored.image_url,
            created_at: stored.created_at.to_rfc3339(),
        }),
    ))
}

/// Render the preview card for the given fields
///
/// Blank fields are replaced by placeholders. The photo slot always shows
/// the placeholder glyph; photos are previewed client-side.
pub async fn preview_wish(Json(payload): Json<PreviewRequest>) -> Json<Preview> {
    let fields = WishFields {
        author_name: payload.author_name,
        recipient_name: payload.recipient_name,
        message: payload.message,
    };

    Json(Preview::render(
        &fields,
        ImagePreview::default(),
        &PreviewConfig::default(),
        Local::now().date_naive(),
    ))
}

/// Get a stored wish by ID
///
/// # Errors
///
/// - `404 NOT_FOUND` - No wish with this ID
/// - `503 SERVICE_UNAVAILABLE` - Storage lookup failed
#[instrument(skip(pipeline))]
pub async fn get_wish(
    Extension(pipeline): Extension<Arc<SubmissionPipeline>>,
    Path(id): Path<String>,
) -> Result<Json<StoredWish>, AppError> {
    pipeline
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Wish not found"))
}
