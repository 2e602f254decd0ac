//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use tracing::Level;

use crate::submission::{PipelineConfig, ValidationRules};

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const DEFAULT_DEV_BUCKET: &str = "birthday-images";
const DEFAULT_DEV_WISHES_TABLE: &str = "birthday-wishes";
const DEFAULT_RECIPIENT: &str = "Cheata";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name for wish photos
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set outside development
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development => {
                env::var("S3_BUCKET_NAME").unwrap_or_else(|_| DEFAULT_DEV_BUCKET.to_string())
            }
        }
    }

    /// Returns the `DynamoDB` table name for wishes
    ///
    /// # Panics
    ///
    /// Panics if `DYNAMODB_WISHES_TABLE_NAME` is not set outside development
    #[must_use]
    pub fn wishes_table(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("DYNAMODB_WISHES_TABLE_NAME")
                .expect("DYNAMODB_WISHES_TABLE_NAME environment variable is not set"),
            Self::Development => env::var("DYNAMODB_WISHES_TABLE_NAME")
                .unwrap_or_else(|_| DEFAULT_DEV_WISHES_TABLE.to_string()),
        }
    }

    /// Base URL under which uploaded photos are publicly readable
    ///
    /// Defaults to the virtual-hosted bucket URL, or the `LocalStack`
    /// path-style URL in development.
    #[must_use]
    pub fn media_public_base_url(&self) -> String {
        if let Ok(url) = env::var("MEDIA_PUBLIC_BASE_URL") {
            return url;
        }

        let bucket = self.s3_bucket();
        match self {
            Self::Production | Self::Staging => format!("https://{bucket}.s3.amazonaws.com"),
            Self::Development => format!("{LOCALSTACK_ENDPOINT}/{bucket}"),
        }
    }

    /// Whether the form must collect a recipient name
    #[must_use]
    pub fn recipient_required(&self) -> bool {
        env::var("WISH_RECIPIENT_REQUIRED")
            .map(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false)
    }

    /// Recipient stored when the form does not collect one
    #[must_use]
    pub fn default_recipient(&self) -> String {
        env::var("WISH_DEFAULT_RECIPIENT")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_RECIPIENT.to_string())
    }

    /// Submission pipeline settings for this environment
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            bucket: self.s3_bucket(),
            table: self.wishes_table(),
            default_recipient: self.default_recipient(),
            rules: ValidationRules {
                recipient_required: self.recipient_required(),
                ..ValidationRules::default()
            },
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some(LOCALSTACK_ENDPOINT),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Log level when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}
