//! Lambda configuration.

use mockstack_core::{AccountId, AwsRegion, MockStackConfig, MockStackError};

/// Lambda service configuration.
#[derive(Debug, Clone, Default)]
pub struct LambdaConfig {
    pub default_region: AwsRegion,
    pub account_id: AccountId,
}

impl LambdaConfig {
    /// Read `DEFAULT_REGION` and `ACCOUNT_ID` from the environment.
    pub fn from_env() -> Result<Self, MockStackError> {
        MockStackConfig::from_env().map(|c| Self::from_gateway(&c))
    }

    /// Derive service settings from the gateway configuration.
    #[must_use]
    pub fn from_gateway(config: &MockStackConfig) -> Self {
        Self {
            default_region: config.default_region.clone(),
            account_id: config.account_id.clone(),
        }
    }
}
