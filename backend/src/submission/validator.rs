//! Ordered validation of a wish before it is sent
//!
//! Rules run in a fixed order and the first violation wins:
//!
//! 1. required fields are present
//! 2. author name length
//! 3. message length
//! 4. photo MIME type
//! 5. photo is not empty
//! 6. photo size

use thiserror::Error;

use super::draft::{ImageFile, WishDraft};

/// One kibibyte
pub const KIB: usize = 1024;

/// One mebibyte
pub const MIB: usize = 1024 * KIB;

/// Renders a byte count in the largest unit that divides it exactly
///
/// `5 * MIB` is `5MB`, `512 * KIB` is `512KB`, anything else is shown in bytes.
#[must_use]
pub fn size_label(bytes: usize) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Limits applied by [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    /// Whether the form collects a recipient name that must be filled in
    pub recipient_required: bool,
    /// Minimum author name length in characters
    pub min_name_chars: usize,
    /// Maximum author name length in characters
    pub max_name_chars: usize,
    /// Minimum message length in characters
    pub min_message_chars: usize,
    /// Maximum photo size in bytes
    pub max_image_bytes: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            recipient_required: false,
            min_name_chars: 2,
            max_name_chars: 100,
            min_message_chars: 10,
            max_image_bytes: 5 * MIB,
        }
    }
}

/// The first rule a draft violated, rendered as a user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is blank
    #[error("Please fill in all required fields!")]
    MissingRequiredFields,

    /// Author name below the minimum length
    #[error("Please enter a valid name (at least {min} characters)")]
    NameTooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// Author name above the maximum length
    #[error("Please keep your name under {max} characters")]
    NameTooLong {
        /// Maximum accepted length
        max: usize,
    },

    /// Message below the minimum length
    #[error("Please write a longer birthday wish (at least {min} characters)")]
    MessageTooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// Photo is not an image
    #[error("Please select a valid image file (JPG, PNG, GIF)")]
    InvalidImageType {
        /// The rejected MIME type
        content_type: String,
    },

    /// Photo has no contents
    #[error("The selected image is empty")]
    EmptyImage,

    /// Photo exceeds the size limit
    #[error("Image size should be less than {}!", size_label(*max_bytes))]
    ImageTooLarge {
        /// Size of the rejected file
        size: usize,
        /// Maximum accepted size
        max_bytes: usize,
    },
}

/// Validates a draft against the rules, stopping at the first failure
///
/// # Errors
///
/// Returns the first [`ValidationError`] in rule order
pub fn validate(draft: &WishDraft, rules: &ValidationRules) -> Result<(), ValidationError> {
    let fields = &draft.fields;
    let author_name = fields.author_name();
    let message = fields.message();

    let recipient_missing = rules.recipient_required && fields.recipient_name().is_none();
    if author_name.is_empty() || message.is_empty() || recipient_missing {
        return Err(ValidationError::MissingRequiredFields);
    }

    let name_chars = author_name.chars().count();
    if name_chars < rules.min_name_chars {
        return Err(ValidationError::NameTooShort {
            min: rules.min_name_chars,
        });
    }
    if name_chars > rules.max_name_chars {
        return Err(ValidationError::NameTooLong {
            max: rules.max_name_chars,
        });
    }

    if message.chars().count() < rules.min_message_chars {
        return Err(ValidationError::MessageTooShort {
            min: rules.min_message_chars,
        });
    }

    if let Some(image) = &draft.image {
        validate_image(image, rules)?;
    }

    Ok(())
}

/// Checks only the photo rules: type, then emptiness, then size
///
/// # Errors
///
/// Returns [`ValidationError::InvalidImageType`], [`ValidationError::EmptyImage`]
/// or [`ValidationError::ImageTooLarge`]
pub fn validate_image(image: &ImageFile, rules: &ValidationRules) -> Result<(), ValidationError> {
    if !image.content_type.starts_with("image/") {
        return Err(ValidationError::InvalidImageType {
            content_type: image.content_type.clone(),
        });
    }

    if image.size() == 0 {
        return Err(ValidationError::EmptyImage);
    }

    if image.size() > rules.max_image_bytes {
        return Err(ValidationError::ImageTooLarge {
            size: image.size(),
            max_bytes: rules.max_image_bytes,
        });
    }

    Ok(())
}
