//! Errors surfaced by a submission attempt

use thiserror::Error;

use super::validator::ValidationError;
use crate::wish_backend::BackendError;

/// Why a submission did not produce a stored wish
///
/// `Display` yields the short message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Another submission of the same form is still running
    #[error("Your wish is already being sent")]
    InFlight,

    /// The draft broke a validation rule
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Storing the photo failed; nothing was persisted
    #[error("Image upload failed: {0}")]
    Upload(BackendError),

    /// Inserting the wish failed
    #[error("Database error: {0}")]
    Persist(BackendError),
}

impl SubmissionError {
    /// Whether resubmitting the same draft could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::Persist(_) | Self::InFlight)
    }
}
