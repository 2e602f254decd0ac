//! Error types for wish storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, put_item::PutItemError};
use thiserror::Error;

/// Result type alias for wish storage operations
pub type WishStorageResult<T> = Result<T, WishStorageError>;

/// Storage error types for wish operations
#[derive(Debug, Error)]
pub enum WishStorageError {
    /// Failed to insert wish into `DynamoDB`
    #[error("Failed to insert wish into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get wish from `DynamoDB`
    #[error("Failed to get wish from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to (de)serialize a wish item
    #[error("Failed to parse wish: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for WishStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
