//! Account and region identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::MockStackError;

/// AWS Account ID (12-digit string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Account every emulated resource belongs to unless configured otherwise.
    pub const DEFAULT: &str = "000000000000";

    /// Create a new account ID, rejecting anything but 12 ASCII digits.
    pub fn new(id: impl Into<String>) -> Result<Self, MockStackError> {
        let id = id.into();
        if id.len() != 12 || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MockStackError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = MockStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// AWS Region identifier such as `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Region used when nothing else is configured.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a region without validating its shape.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Parse a region name, requiring the `<area>-<direction>-<digit>` shape
    /// (`us-east-1`, `ap-southeast-2`, `us-gov-west-1`).
    pub fn parse(region: &str) -> Result<Self, MockStackError> {
        let segments: Vec<&str> = region.split('-').collect();
        let well_formed = segments.len() >= 3
            && segments[..segments.len() - 1]
                .iter()
                .all(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase()))
            && segments
                .last()
                .is_some_and(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
        if well_formed {
            Ok(Self(region.to_owned()))
        } else {
            Err(MockStackError::InvalidRegion(region.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_twelve_digit_account() {
        let id: AccountId = "123456789012".parse().unwrap();
        assert_eq!(id.to_string(), "123456789012");
    }

    #[test]
    fn test_should_reject_malformed_account() {
        assert!(AccountId::new("12345").is_err());
        assert!(AccountId::new("abcdefghijkl").is_err());
        assert!(AccountId::new("1234567890123").is_err());
    }

    #[test]
    fn test_should_parse_region_names() {
        assert!(AwsRegion::parse("us-east-1").is_ok());
        assert!(AwsRegion::parse("us-gov-west-1").is_ok());
        assert!(AwsRegion::parse("eu-central-2").is_ok());
        assert!(AwsRegion::parse("useast1").is_err());
        assert!(AwsRegion::parse("us-east-").is_err());
        assert!(AwsRegion::parse("US-EAST-1").is_err());
    }

    #[test]
    fn test_should_default_to_us_east_1() {
        assert_eq!(AwsRegion::default().as_str(), "us-east-1");
        assert_eq!(AccountId::default().as_str(), "000000000000");
    }
}
