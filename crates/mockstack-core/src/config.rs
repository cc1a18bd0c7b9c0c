//! Configuration management for MockStack.
//!
//! All configuration is driven by environment variables, matching LocalStack conventions.

use crate::error::MockStackError;
use crate::types::{AccountId, AwsRegion};

/// Every service the gateway knows how to host.
pub const KNOWN_SERVICES: &[&str] = &["dynamodb", "lambda", "iam", "sts"];

/// Global configuration for MockStack.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockStackConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Region stamped into every ARN the emulator mints.
    pub default_region: AwsRegion,
    /// Account stamped into every ARN the emulator mints.
    pub account_id: AccountId,
    /// Log level filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Services to enable; empty means all known services.
    pub services: Vec<String>,
}

impl Default for MockStackConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:4566".to_owned(),
            default_region: AwsRegion::default(),
            account_id: AccountId::default(),
            log_level: "info".to_owned(),
            services: Vec::new(),
        }
    }
}

impl MockStackConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `GATEWAY_LISTEN`, `DEFAULT_REGION`, `ACCOUNT_ID`, `LOG_LEVEL`
    /// and `SERVICES`.
    pub fn from_env() -> Result<Self, MockStackError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MockStackError> {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("DEFAULT_REGION") {
            config.default_region = AwsRegion::parse(&v)?;
        }
        if let Some(v) = lookup("ACCOUNT_ID") {
            config.account_id = AccountId::new(v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("SERVICES") {
            config.services = parse_services(&v);
        }

        Ok(config)
    }

    /// Whether a service is enabled by this configuration.
    #[must_use]
    pub fn is_enabled(&self, service: &str) -> bool {
        self.services.is_empty() || self.services.iter().any(|s| s == service)
    }

    /// Names from `SERVICES` that no build of the gateway can host.
    #[must_use]
    pub fn unknown_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .map(String::as_str)
            .filter(|s| !KNOWN_SERVICES.contains(s))
            .collect()
    }
}

/// Parse a comma-separated services string, lowercasing and dropping blanks.
fn parse_services(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = MockStackConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:4566");
        assert_eq!(config.default_region.as_str(), "us-east-1");
        assert_eq!(config.account_id.as_str(), "000000000000");
        assert!(config.is_enabled("dynamodb"));
    }

    #[test]
    fn test_should_read_overrides_from_lookup() {
        let config = MockStackConfig::from_lookup(lookup_from(&[
            ("GATEWAY_LISTEN", "127.0.0.1:5000"),
            ("DEFAULT_REGION", "eu-west-1"),
            ("ACCOUNT_ID", "123456789012"),
            ("SERVICES", " IAM, sts ,,"),
        ]))
        .unwrap();
        assert_eq!(config.gateway_listen, "127.0.0.1:5000");
        assert_eq!(config.default_region.as_str(), "eu-west-1");
        assert_eq!(config.account_id.as_str(), "123456789012");
        assert_eq!(config.services, vec!["iam", "sts"]);
        assert!(config.is_enabled("sts"));
        assert!(!config.is_enabled("lambda"));
    }

    #[test]
    fn test_should_reject_bad_account_id() {
        let err = MockStackConfig::from_lookup(lookup_from(&[("ACCOUNT_ID", "42")])).unwrap_err();
        assert!(matches!(err, MockStackError::InvalidAccountId(_)));
    }

    #[test]
    fn test_should_report_unknown_services() {
        let config = MockStackConfig::from_lookup(lookup_from(&[("SERVICES", "s3,iam")])).unwrap();
        assert_eq!(config.unknown_services(), vec!["s3"]);
    }
}
