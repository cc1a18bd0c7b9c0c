//! DynamoDB configuration.

use mockstack_core::{AccountId, AwsRegion, MockStackConfig, MockStackError};

/// DynamoDB service configuration.
#[derive(Debug, Clone, Default)]
pub struct DynamoDBConfig {
    /// Region stamped into table, backup and export ARNs.
    pub default_region: AwsRegion,
    /// Account stamped into every ARN.
    pub account_id: AccountId,
}

impl DynamoDBConfig {
    /// Create configuration from environment variables (`DEFAULT_REGION`, `ACCOUNT_ID`).
    pub fn from_env() -> Result<Self, MockStackError> {
        MockStackConfig::from_env().map(|c| Self::from_gateway(&c))
    }

    /// Take region and account from the gateway configuration.
    #[must_use]
    pub fn from_gateway(config: &MockStackConfig) -> Self {
        Self {
            default_region: config.default_region.clone(),
            account_id: config.account_id.clone(),
        }
    }
}
