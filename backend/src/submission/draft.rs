//! Value types for an in-progress wish

use serde::{Deserialize, Serialize};

/// The text fields of a wish form, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishFields {
    /// Name of the person sending the wish
    pub author_name: String,
    /// Name of the person the wish is for, when the form collects it
    pub recipient_name: Option<String>,
    /// The wish itself
    pub message: String,
}

impl WishFields {
    /// Author name with surrounding whitespace removed
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author_name.trim()
    }

    /// Recipient name with surrounding whitespace removed, `None` when blank
    #[must_use]
    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Message with surrounding whitespace removed
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.trim()
    }
}

/// A photo picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name, used for the preview and the upload extension
    pub filename: String,
    /// MIME type reported for the file
    pub content_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Creates a new image file descriptor
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// File size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Everything needed for one submission attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishDraft {
    /// Text fields
    pub fields: WishFields,
    /// Optional photo
    pub image: Option<ImageFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_trimmed() {
        let fields = WishFields {
            author_name: "  Alice ".to_string(),
            recipient_name: Some("\tBob\n".to_string()),
            message: " Happy birthday! ".to_string(),
        };

        assert_eq!(fields.author_name(), "Alice");
        assert_eq!(fields.recipient_name(), Some("Bob"));
        assert_eq!(fields.message(), "Happy birthday!");
    }

    #[test]
    fn test_blank_recipient_is_none() {
        let fields = WishFields {
            recipient_name: Some("   ".to_string()),
            ..WishFields::default()
        };

        assert_eq!(fields.recipient_name(), None);
    }

    #[test]
    fn test_image_size() {
        let image = ImageFile::new("cake.png", "image/png", vec![0_u8; 42]);

        assert_eq!(image.size(), 42);
    }
}
