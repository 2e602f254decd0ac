//! `DynamoDB` round-trip tests for the wishes table.
//!
//! These need LocalStack on `localhost:4566`; run them with `cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use pretty_assertions::assert_eq;
use tokio::time::sleep;
use uuid::Uuid;
use wish_storage::wish::{NewWish, WishAttribute, WishStorage};

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Test context that deletes its table on drop
struct TestContext {
    storage: WishStorage,
    table_name: String,
    dynamodb_client: Arc<DynamoDbClient>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

async fn setup_test() -> TestContext {
    let table_name = format!("test-wishes-{}", Uuid::new_v4());

    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    let dynamodb_client = Arc::new(DynamoDbClient::new(&config));

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(WishAttribute::Id.to_string())
                .key_type(KeyType::Hash)
                .build()
                .expect("Failed to build key schema"),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(WishAttribute::Id.to_string())
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("Failed to build attribute definition"),
        )
        .send()
        .await
        .expect("Failed to create test table");

    // Wait for table to be ready
    sleep(Duration::from_millis(100)).await;

    TestContext {
        storage: WishStorage::new(dynamodb_client.clone()),
        table_name,
        dynamodb_client,
    }
}

fn new_wish(image_url: &str) -> NewWish {
    NewWish {
        author_name: "Alice".to_string(),
        recipient_name: "Cheata".to_string(),
        message: "Happy birthday to you!".to_string(),
        image_url: image_url.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_create_and_get_wish() {
    let context = setup_test().await;

    let created = context
        .storage
        .create(&context.table_name, new_wish("http://localhost:4566/birthday-images/wish.png"))
        .await
        .expect("Failed to create wish");

    let fetched = context
        .storage
        .get_one(&context.table_name, &created.id)
        .await
        .expect("Failed to get wish")
        .expect("Wish should exist");

    assert_eq!(fetched, created);
    assert_eq!(
        fetched.image_url,
        "http://localhost:4566/birthday-images/wish.png"
    );
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_create_wish_without_image() {
    let context = setup_test().await;

    let created = context
        .storage
        .create(&context.table_name, new_wish(""))
        .await
        .expect("Failed to create wish");

    let fetched = context
        .storage
        .get_one(&context.table_name, &created.id)
        .await
        .expect("Failed to get wish")
        .expect("Wish should exist");

    assert_eq!(fetched.image_url, "");
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_get_missing_wish() {
    let context = setup_test().await;

    let fetched = context
        .storage
        .get_one(&context.table_name, "does-not-exist")
        .await
        .expect("Get should not fail");

    assert!(fetched.is_none());
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_created_wishes_get_distinct_ids() {
    let context = setup_test().await;

    let first = context
        .storage
        .create(&context.table_name, new_wish(""))
        .await
        .expect("Failed to create wish");
    let second = context
        .storage
        .create(&context.table_name, new_wish(""))
        .await
        .expect("Failed to create wish");

    assert_ne!(first.id, second.id);
}
