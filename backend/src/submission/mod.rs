//! Wish submission: validation, preview, and the upload-then-persist pipeline

pub mod draft;
mod error;
pub mod form;
pub mod pipeline;
pub mod preview;
pub mod validator;

pub use draft::{ImageFile, WishDraft, WishFields};
pub use error::SubmissionError;
pub use form::{FormConfig, StatusKind, StatusMessage, WishForm};
pub use pipeline::{PipelineConfig, SubmissionPhase, SubmissionPipeline};
pub use preview::{ImagePreview, Preview, PreviewConfig, PreviewError};
pub use validator::{ValidationError, ValidationRules};
