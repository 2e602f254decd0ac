use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use birthday_wishes::{
    media_storage::MediaStorage, server, submission::SubmissionPipeline, types::Environment,
    wish_backend::AwsWishBackend,
};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};
use wish_storage::wish::WishStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // Use JSON format for staging/production (Datadog), regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        environment.media_public_base_url(),
    ));

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let wish_storage = Arc::new(WishStorage::new(dynamodb_client));

    let backend = Arc::new(AwsWishBackend::new(media_storage, wish_storage));
    let pipeline = Arc::new(SubmissionPipeline::new(
        backend,
        environment.pipeline_config(),
    ));

    server::start(environment, pipeline).await
}
