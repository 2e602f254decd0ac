//! S3-based photo storage operations
mod error;

use std::sync::Arc;

use aws_sdk_s3::{error::SdkError, primitives::ByteStream, Client as S3Client};
use tracing::{debug, info};

pub use error::{BucketError, BucketResult};

/// Joins a public base URL and an object key
#[must_use]
pub fn public_object_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{key}", public_base_url.trim_end_matches('/'))
}

/// Photo storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    public_base_url: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `public_base_url` - Base URL under which stored objects are publicly readable
    #[must_use]
    pub fn new(s3_client: Arc<S3Client>, public_base_url: impl Into<String>) -> Self {
        Self {
            s3_client,
            public_base_url: public_base_url.into(),
        }
    }

    /// Public URL of the object stored under `key`
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, key)
    }

    /// Stores an object and returns its public URL
    ///
    /// The write is conditional (`If-None-Match: *`), so an existing object
    /// is never overwritten.
    ///
    /// # Arguments
    ///
    /// * `bucket` - Target bucket
    /// * `key` - Object key
    /// * `bytes` - Object contents
    /// * `content_type` - MIME type stored with the object
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ObjectExists` if the key is already taken
    /// Returns `BucketError::UpstreamError` for 5xx and transport errors
    /// Returns `BucketError::S3Error` for other S3 service errors
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BucketResult<String> {
        debug!(
            "Uploading object {} to bucket {} ({} bytes)",
            key,
            bucket,
            bytes.len()
        );

        let content_length = i64::try_from(bytes.len())
            .map_err(|_| BucketError::S3Error(format!("Object {key} is too large")))?;

        let result = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(content_length)
            .content_type(content_type)
            .if_none_match("*")
            .body(ByteStream::from(bytes))
            .send()
            .await;

        match result {
            Ok(_) => {
                let url = self.public_url(key);
                info!("Uploaded object {} to {}", key, url);
                Ok(url)
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() == 412 =>
            {
                Err(BucketError::ObjectExists(key.to_string()))
            }
            Err(e) => Err(BucketError::from(e)),
        }
    }
}
