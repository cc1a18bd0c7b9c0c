//! Integration tests for MockStack server (DynamoDB, Lambda, IAM, STS).
//!
//! These tests require a running MockStack server at `localhost:4566`.
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p mockstack-integration -- --ignored
//! ```

use std::sync::Once;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;

static INIT: Once = Once::new();

/// Account the server mints ARNs for unless `ACCOUNT_ID` says otherwise.
pub const DEFAULT_ACCOUNT: &str = "000000000000";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("MOCKSTACK_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Shared SDK configuration pointing at the local server.
#[must_use]
pub fn sdk_config() -> SdkConfig {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(SharedCredentialsProvider::new(creds))
        .endpoint_url(endpoint_url())
        .build()
}

#[must_use]
pub fn dynamodb_client() -> aws_sdk_dynamodb::Client {
    aws_sdk_dynamodb::Client::new(&sdk_config())
}

#[must_use]
pub fn lambda_client() -> aws_sdk_lambda::Client {
    aws_sdk_lambda::Client::new(&sdk_config())
}

#[must_use]
pub fn iam_client() -> aws_sdk_iam::Client {
    aws_sdk_iam::Client::new(&sdk_config())
}

#[must_use]
pub fn sts_client() -> aws_sdk_sts::Client {
    aws_sdk_sts::Client::new(&sdk_config())
}

/// Generate a unique resource name for a test.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Trust policy allowing Lambda to assume a role.
pub const LAMBDA_TRUST_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"Service":"lambda.amazonaws.com"},"Action":"sts:AssumeRole"}]}"#;

/// Permissions policy granting read access to one bucket.
pub const READ_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"s3:GetObject","Resource":"arn:aws:s3:::example/*"}]}"#;

mod test_dynamodb;
mod test_health;
mod test_iam;
mod test_lambda;
mod test_sts;
