//! Validate → upload photo → persist wish

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, instrument, warn};
use wish_storage::wish::{NewWish, StoredWish};

use super::draft::{ImageFile, WishDraft};
use super::error::SubmissionError;
use super::validator::{validate, ValidationRules};
use crate::wish_backend::{BackendResult, ObjectUpload, WishBackend};

const KEY_TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const KEY_TOKEN_LEN: usize = 6;
const MAX_EXTENSION_LEN: usize = 10;

/// Stage of a submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Checking the draft
    Validating,
    /// Storing the photo
    UploadingImage,
    /// Inserting the wish
    Persisting,
    /// The wish was stored
    Success,
    /// The attempt failed
    Failed,
}

impl SubmissionPhase {
    /// Whether a submission is currently running
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Validating | Self::UploadingImage | Self::Persisting)
    }
}

/// Where and how wishes are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bucket receiving photos
    pub bucket: String,
    /// Table receiving wishes
    pub table: String,
    /// Recipient stored when the form did not collect one
    pub default_recipient: String,
    /// Validation limits
    pub rules: ValidationRules,
}

/// Runs submissions against a [`WishBackend`]
pub struct SubmissionPipeline {
    backend: Arc<dyn WishBackend>,
    config: PipelineConfig,
}

impl SubmissionPipeline {
    /// Creates a pipeline over the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn WishBackend>, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    /// Pipeline configuration
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validates and stores a wish
    ///
    /// # Errors
    ///
    /// See [`SubmissionPipeline::submit_with_progress`]
    pub async fn submit(&self, draft: WishDraft) -> Result<StoredWish, SubmissionError> {
        self.submit_with_progress(draft, |_| {}).await
    }

    /// Validates and stores a wish, reporting each stage to `on_phase`
    ///
    /// `on_phase` sees `Validating`, then `UploadingImage` (only when the draft
    /// carries a photo), then `Persisting`. The insert is only attempted once
    /// the photo is stored, so a persisted wish never points at a missing
    /// object. A failed insert after a successful upload leaves the object
    /// orphaned.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Invalid` when a validation rule fails
    /// Returns `SubmissionError::Upload` when storing the photo fails
    /// Returns `SubmissionError::Persist` when inserting the wish fails
    #[instrument(skip_all)]
    pub async fn submit_with_progress<F>(
        &self,
        draft: WishDraft,
        mut on_phase: F,
    ) -> Result<StoredWish, SubmissionError>
    where
        F: FnMut(SubmissionPhase) + Send,
    {
        on_phase(SubmissionPhase::Validating);
        if let Err(err) = validate(&draft, &self.config.rules) {
            warn!("Rejected wish: {err}");
            return Err(err.into());
        }

        let WishDraft { fields, image } = draft;

        let (image_url, uploaded_key) = match image {
            Some(image) => {
                on_phase(SubmissionPhase::UploadingImage);
                let key = object_key(&image, Utc::now(), &mut rand::thread_rng());
                let url = self
                    .upload_image(&key, image)
                    .await
                    .map_err(SubmissionError::Upload)?;
                (url, Some(key))
            }
            None => (String::new(), None),
        };

        on_phase(SubmissionPhase::Persisting);
        let wish = NewWish {
            author_name: fields.author_name().to_string(),
            recipient_name: fields
                .recipient_name()
                .unwrap_or(self.config.default_recipient.as_str())
                .to_string(),
            message: fields.message().to_string(),
            image_url,
        };

        let stored = self
            .backend
            .insert_record(&self.config.table, wish)
            .await
            .map_err(|err| {
                if let Some(key) = &uploaded_key {
                    warn!("Wish insert failed, object {key} is orphaned: {err}");
                }
                SubmissionError::Persist(err)
            })?;

        info!(wish_id = %stored.id, "Wish submitted");
        Ok(stored)
    }

    /// Fetches a stored wish by ID
    ///
    /// # Errors
    ///
    /// Returns the backend error if the lookup fails
    pub async fn get(&self, id: &str) -> BackendResult<Option<StoredWish>> {
        self.backend.get_record(&self.config.table, id).await
    }

    async fn upload_image(&self, key: &str, image: ImageFile) -> BackendResult<String> {
        debug!("Uploading photo {} as {}", image.filename, key);

        let upload = ObjectUpload {
            bytes: image.bytes,
            content_type: image.content_type,
        };
        let uploaded = self
            .backend
            .upload_object(&self.config.bucket, key, upload)
            .await?;

        Ok(uploaded.url)
    }
}

/// Builds a collision-resistant object key: `wish_<millis>_<token>.<ext>`
pub fn object_key<R: Rng + ?Sized>(image: &ImageFile, now: DateTime<Utc>, rng: &mut R) -> String {
    let token: String = (0..KEY_TOKEN_LEN)
        .map(|_| char::from(KEY_TOKEN_ALPHABET[rng.gen_range(0..KEY_TOKEN_ALPHABET.len())]))
        .collect();

    format!(
        "wish_{}_{token}.{}",
        now.timestamp_millis(),
        file_extension(image)
    )
}

/// Lower-cased extension of the file name, falling back to the MIME subtype
fn file_extension(image: &ImageFile) -> String {
    let from_name = image
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| is_clean_extension(ext));

    from_name
        .or_else(|| {
            image
                .content_type
                .parse::<mime::Mime>()
                .ok()
                .map(|mime| mime.subtype().as_str().to_ascii_lowercase())
                .filter(|ext| is_clean_extension(ext))
        })
        .unwrap_or_else(|| "bin".to_string())
}

fn is_clean_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric())
}
