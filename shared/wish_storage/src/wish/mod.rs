//! Wish storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::{DateTime, Utc};
pub use error::{WishStorageError, WishStorageResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_dynamo::to_item;
use strum::Display;
use tracing::info;

/// A persisted birthday wish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoredWish {
    /// Primary key - unique wish ID (UUID v4)
    pub id: String,
    /// Name of the person sending the wish
    pub author_name: String,
    /// Name of the person the wish is for
    pub recipient_name: String,
    /// The wish itself
    pub message: String,
    /// Public URL of the attached photo, empty when none was attached
    pub image_url: String,
    /// Timestamp of wish creation
    pub created_at: DateTime<Utc>,
}

/// Fields of a wish that is about to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWish {
    /// Name of the person sending the wish
    pub author_name: String,
    /// Name of the person the wish is for
    pub recipient_name: String,
    /// The wish itself
    pub message: String,
    /// Public URL of the attached photo, empty when none was attached
    pub image_url: String,
}

/// `DynamoDB` attribute names for the wishes table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WishAttribute {
    /// Primary key - unique wish ID
    Id,
    /// Author name
    AuthorName,
    /// Recipient name
    RecipientName,
    /// Message body
    Message,
    /// Photo URL
    ImageUrl,
    /// Creation timestamp
    CreatedAt,
}

/// Storage client for wish operations
///
/// The table is chosen per call so one client can serve several tables.
pub struct WishStorage {
    dynamodb_client: Arc<DynamoDbClient>,
}

impl WishStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>) -> Self {
        Self { dynamodb_client }
    }

    /// Create a new wish with a generated UUID
    ///
    /// The put is conditional on the ID being unused, so an existing row is
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `WishStorageError` if serialization or the `DynamoDB` put operation fails
    pub async fn create(&self, table_name: &str, wish: NewWish) -> WishStorageResult<StoredWish> {
        let stored = StoredWish {
            id: uuid::Uuid::new_v4().to_string(),
            author_name: wish.author_name,
            recipient_name: wish.recipient_name,
            message: wish.message,
            image_url: wish.image_url,
            created_at: Utc::now(),
        };

        let item = to_item(&stored)?;

        self.dynamodb_client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", WishAttribute::Id.to_string())
            .send()
            .await?;

        info!(wish_id = %stored.id, table = table_name, "Wish stored");

        Ok(stored)
    }

    /// Get a single wish by ID
    ///
    /// # Errors
    ///
    /// Returns `WishStorageError` if the `DynamoDB` get operation fails or the item is malformed
    pub async fn get_one(&self, table_name: &str, id: &str) -> WishStorageResult<Option<StoredWish>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(table_name)
            .key(
                WishAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| {
                serde_dynamo::from_item(item.clone())
                    .map_err(|e| WishStorageError::SerializationError(e.to_string()))
            })
            .transpose()
    }
}
