//! Amazon Resource Names.
//!
//! `arn:<partition>:<service>:<region>:<account-id>:<resource>`, where the
//! region and account may be empty (IAM, global tables) and the resource may
//! itself contain `:` and `/`.

use std::fmt;
use std::str::FromStr;

/// Reasons an ARN string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    /// Does not start with `arn:`.
    #[error("Invalid ARN: '{0}' does not start with 'arn:'")]
    MissingPrefix(String),

    /// Fewer than six colon-separated components.
    #[error("Invalid ARN: '{0}' has too few components")]
    TooFewComponents(String),

    /// A component that must be non-empty is empty.
    #[error("Invalid ARN: '{arn}' has an empty {component}")]
    EmptyComponent {
        /// Name of the empty component.
        component: &'static str,
        /// The offending ARN.
        arn: String,
    },
}

/// A parsed ARN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    /// Build an ARN in the `aws` partition.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: "aws".to_owned(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        }
    }

    /// The resource type: everything before the first `/` or `:` of the resource.
    ///
    /// `table/users/backup/01` -> `table`, `function:my-fn:3` -> `function`.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.resource
            .split_once(['/', ':'])
            .map_or(self.resource.as_str(), |(ty, _)| ty)
    }

    /// The resource identifier: everything after the first `/` or `:`.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.resource.split_once(['/', ':']).map(|(_, id)| id)
    }

    /// Split the resource on `/` (`table/users/stream/x` -> `[table, users, stream, x]`).
    pub fn resource_segments(&self) -> impl Iterator<Item = &str> {
        self.resource.split('/')
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.first() != Some(&"arn") {
            return Err(ArnError::MissingPrefix(s.to_owned()));
        }
        if parts.len() < 6 {
            return Err(ArnError::TooFewComponents(s.to_owned()));
        }
        for (component, value) in [
            ("partition", parts[1]),
            ("service", parts[2]),
            ("resource", parts[5]),
        ] {
            if value.is_empty() {
                return Err(ArnError::EmptyComponent {
                    component,
                    arn: s.to_owned(),
                });
            }
        }
        Ok(Self {
            partition: parts[1].to_owned(),
            service: parts[2].to_owned(),
            region: parts[3].to_owned(),
            account_id: parts[4].to_owned(),
            resource: parts[5].to_owned(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}
