//! S3 + `DynamoDB` implementation of [`WishBackend`]

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;
use wish_storage::wish::{NewWish, StoredWish, WishStorage, WishStorageError};

use super::{BackendError, BackendResult, ObjectUpload, UploadedObject, WishBackend};
use crate::media_storage::{BucketError, MediaStorage};

/// Backend that keeps photos in S3 and wishes in `DynamoDB`
pub struct AwsWishBackend {
    media_storage: Arc<MediaStorage>,
    wish_storage: Arc<WishStorage>,
}

impl AwsWishBackend {
    /// Creates a backend from pre-configured storage clients
    #[must_use]
    pub const fn new(media_storage: Arc<MediaStorage>, wish_storage: Arc<WishStorage>) -> Self {
        Self {
            media_storage,
            wish_storage,
        }
    }
}

impl From<BucketError> for BackendError {
    fn from(err: BucketError) -> Self {
        match err {
            BucketError::ObjectExists(key) => Self::Rejected(format!("object {key} already exists")),
            BucketError::S3Error(msg) => Self::Rejected(msg),
            BucketError::UpstreamError(msg) => Self::Unavailable(msg),
        }
    }
}

impl From<WishStorageError> for BackendError {
    fn from(err: WishStorageError) -> Self {
        match err {
            WishStorageError::SerializationError(msg) => Self::Rejected(msg),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl WishBackend for AwsWishBackend {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        object: ObjectUpload,
    ) -> BackendResult<UploadedObject> {
        let url = self
            .media_storage
            .put_object(bucket, key, object.bytes, &object.content_type)
            .await
            .inspect_err(|e| error!("Failed to upload {key} to {bucket}: {e}"))?;

        Ok(UploadedObject { url })
    }

    async fn insert_record(&self, table: &str, wish: NewWish) -> BackendResult<StoredWish> {
        self.wish_storage
            .create(table, wish)
            .await
            .inspect_err(|e| error!("Failed to insert wish into {table}: {e}"))
            .map_err(BackendError::from)
    }

    async fn get_record(&self, table: &str, id: &str) -> BackendResult<Option<StoredWish>> {
        self.wish_storage
            .get_one(table, id)
            .await
            .map_err(BackendError::from)
    }
}
