//! STS configuration.

use mockstack_core::{AccountId, MockStackConfig, MockStackError};

#[derive(Debug, Clone, Default)]
pub struct StsConfig {
    /// Account reported for callers without an issued session.
    pub account_id: AccountId,
}

impl StsConfig {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self, MockStackError> {
        MockStackConfig::from_env().map(|c| Self::from_gateway(&c))
    }

    /// Derive service settings from the gateway configuration.
    #[must_use]
    pub fn from_gateway(config: &MockStackConfig) -> Self {
        Self {
            account_id: config.account_id.clone(),
        }
    }
}
