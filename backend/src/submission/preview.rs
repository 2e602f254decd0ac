//! Live preview of the wish card

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

use super::draft::{ImageFile, WishFields};

/// Glyph shown on the card while no photo is selected
pub const IMAGE_PLACEHOLDER_GLYPH: &str = "📷";

/// Placeholder strings used for blank fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Shown instead of a blank author name
    pub author_placeholder: String,
    /// Shown instead of a blank recipient name
    pub recipient_placeholder: String,
    /// Shown instead of a blank message
    pub message_placeholder: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            author_placeholder: "YOU".to_string(),
            recipient_placeholder: "FRIEND".to_string(),
            message_placeholder: "Your beautiful birthday wish will appear here...".to_string(),
        }
    }
}

/// What the card shows in its photo slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImagePreview {
    /// No photo selected
    Placeholder {
        /// Glyph to display
        glyph: String,
    },
    /// A decoded photo
    Image {
        /// `data:` URL of the photo
        data_url: String,
        /// Original file name
        filename: String,
    },
}

impl Default for ImagePreview {
    fn default() -> Self {
        Self::Placeholder {
            glyph: IMAGE_PLACEHOLDER_GLYPH.to_string(),
        }
    }
}

/// Display strings for the wish card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Preview {
    /// Author line
    pub author: String,
    /// Recipient line
    pub recipient: String,
    /// Message body
    pub message: String,
    /// Card date, e.g. `OCT 17, 26`
    pub date: String,
    /// Photo slot
    pub image: ImagePreview,
}

impl Preview {
    /// Renders the card for the current field values
    ///
    /// Blank (after trimming) fields fall back to the configured placeholders.
    #[must_use]
    pub fn render(
        fields: &WishFields,
        image: ImagePreview,
        config: &PreviewConfig,
        today: NaiveDate,
    ) -> Self {
        let or_placeholder = |value: &str, placeholder: &str| {
            if value.is_empty() {
                placeholder.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            author: or_placeholder(fields.author_name(), &config.author_placeholder),
            recipient: fields
                .recipient_name()
                .unwrap_or(config.recipient_placeholder.as_str())
                .to_string(),
            message: or_placeholder(fields.message(), &config.message_placeholder),
            date: date_label(today),
            image,
        }
    }
}

/// Formats the card date as `MON DD, YY` in upper case
#[must_use]
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %d, %y").to_string().to_uppercase()
}

/// Errors raised while turning a photo into a displayable URL
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The file has no contents
    #[error("The selected image is empty")]
    EmptyFile,

    /// The encoding task did not complete
    #[error("Failed to read the selected image: {0}")]
    Decode(String),
}

/// Reads a photo into a `data:<mime>;base64,...` URL
///
/// Encoding runs on the blocking pool since photos can be several megabytes.
///
/// # Errors
///
/// Returns [`PreviewError::EmptyFile`] for empty files and
/// [`PreviewError::Decode`] when the encoding task fails
pub async fn read_image_data_url(image: &ImageFile) -> Result<String, PreviewError> {
    if image.bytes.is_empty() {
        return Err(PreviewError::EmptyFile);
    }

    let bytes = image.bytes.clone();
    let content_type = image.content_type.clone();

    tokio::task::spawn_blocking(move || {
        format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
    })
    .await
    .map_err(|e| PreviewError::Decode(e.to_string()))
}
