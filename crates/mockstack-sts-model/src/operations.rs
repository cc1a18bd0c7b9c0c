//! STS operation enum.

use std::fmt;

use mockstack_core::AwsOperation;

/// Supported STS actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StsOperation {
    GetCallerIdentity,
    AssumeRole,
    AssumeRoleWithWebIdentity,
    GetSessionToken,
    GetAccessKeyInfo,
}

impl StsOperation {
    pub const ALL: &'static [Self] = &[
        Self::GetCallerIdentity,
        Self::AssumeRole,
        Self::AssumeRoleWithWebIdentity,
        Self::GetSessionToken,
        Self::GetAccessKeyInfo,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetCallerIdentity => "GetCallerIdentity",
            Self::AssumeRole => "AssumeRole",
            Self::AssumeRoleWithWebIdentity => "AssumeRoleWithWebIdentity",
            Self::GetSessionToken => "GetSessionToken",
            Self::GetAccessKeyInfo => "GetAccessKeyInfo",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }

    #[must_use]
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::GetCallerIdentity | Self::GetSessionToken => &[],
            Self::AssumeRole => &["RoleArn", "RoleSessionName"],
            Self::AssumeRoleWithWebIdentity => &["RoleArn", "RoleSessionName", "WebIdentityToken"],
            Self::GetAccessKeyInfo => &["AccessKeyId"],
        }
    }
}

impl AwsOperation for StsOperation {
    fn from_name(name: &str) -> Option<Self> {
        Self::from_name(name)
    }

    fn as_str(&self) -> &'static str {
        Self::as_str(self)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        Self::required_fields(self)
    }
}

impl fmt::Display for StsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
