//! Storage collaborator used by the submission pipeline
//!
//! The pipeline only ever talks to a [`WishBackend`]; production wires in
//! [`AwsWishBackend`] (S3 + `DynamoDB`), tests use the in-memory backend.

mod aws;
#[cfg(any(test, feature = "test-utils"))]
mod memory;

use async_trait::async_trait;
use thiserror::Error;
use wish_storage::wish::{NewWish, StoredWish};

pub use aws::AwsWishBackend;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{BackendCall, InMemoryWishBackend};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by a storage collaborator
///
/// The message is shown to the user, wrapped by the pipeline step that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service refused the request
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached or failed internally
    #[error("{0}")]
    Unavailable(String),
}

/// An object to be written to blob storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUpload {
    /// Object contents
    pub bytes: Vec<u8>,
    /// MIME type stored alongside the object
    pub content_type: String,
}

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    /// Publicly readable URL of the object
    pub url: String,
}

/// Object storage and row-insert operations the pipeline depends on
#[async_trait]
pub trait WishBackend: Send + Sync {
    /// Stores `object` under `key` in `bucket` and returns its public URL
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        object: ObjectUpload,
    ) -> BackendResult<UploadedObject>;

    /// Inserts a wish into `table`, returning the row with its generated ID
    async fn insert_record(&self, table: &str, wish: NewWish) -> BackendResult<StoredWish>;

    /// Fetches a previously inserted wish
    async fn get_record(&self, table: &str, id: &str) -> BackendResult<Option<StoredWish>>;
}
