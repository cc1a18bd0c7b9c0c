//! IAM configuration.

use mockstack_core::{AccountId, MockStackConfig, MockStackError};

/// IAM is a global service; only the account is configurable.
#[derive(Debug, Clone, Default)]
pub struct IamConfig {
    pub account_id: AccountId,
}

impl IamConfig {
    /// Read `ACCOUNT_ID` from the environment.
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
