//! IAM error types.

use std::fmt;

use mockstack_core::{ServiceError, StoreError, invalid_action_message};

/// IAM error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum IamErrorCode {
    /// The named role, policy, version or user does not exist.
    NoSuchEntity,
    /// An entity with the same name already exists.
    EntityAlreadyExists,
    /// The entity still has dependents (attached policies, inline policies, attachments).
    DeleteConflict,
    /// A per-entity quota was exceeded.
    LimitExceeded,
    /// A policy document is not valid JSON or lacks required elements.
    MalformedPolicyDocument,
    /// A parameter fails its pattern or length constraint.
    #[default]
    ValidationError,
    /// A parameter value is out of range.
    InvalidInput,
    /// Internal failure.
    ServiceFailure,
    /// Unknown or missing action.
    InvalidAction,
}

impl IamErrorCode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchEntity => "NoSuchEntity",
            Self::EntityAlreadyExists => "EntityAlreadyExists",
            Self::DeleteConflict => "DeleteConflict",
            Self::LimitExceeded => "LimitExceeded",
            Self::MalformedPolicyDocument => "MalformedPolicyDocument",
            Self::ValidationError => "ValidationError",
            Self::InvalidInput => "InvalidInput",
            Self::ServiceFailure => "ServiceFailure",
            Self::InvalidAction => "InvalidAction",
        }
    }

    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::NoSuchEntity => http::StatusCode::NOT_FOUND,
            Self::EntityAlreadyExists | Self::DeleteConflict | Self::LimitExceeded => {
                http::StatusCode::CONFLICT
            }
            Self::ServiceFailure => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedPolicyDocument
            | Self::ValidationError
            | Self::InvalidInput
            | Self::InvalidAction => http::StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for IamErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An IAM error response.
#[derive(Debug)]
pub struct IamError {
    pub code: IamErrorCode,
    pub message: String,
    pub status_code: http::StatusCode,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for IamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IamError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for IamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IamError {
    #[must_use]
    pub fn with_message(code: IamErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn no_such_entity(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::NoSuchEntity, message)
    }

    /// `The role with name <name> cannot be found.`
    #[must_use]
    pub fn role_not_found(role_name: &str) -> Self {
        Self::no_such_entity(format!("The role with name {role_name} cannot be found."))
    }

    #[must_use]
    pub fn policy_not_found(policy_arn: &str) -> Self {
        Self::no_such_entity(format!("Policy {policy_arn} does not exist or is not attachable."))
    }

    #[must_use]
    pub fn user_not_found(user_name: &str) -> Self {
        Self::no_such_entity(format!("The user with name {user_name} cannot be found."))
    }

    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::EntityAlreadyExists, message)
    }

    #[must_use]
    pub fn delete_conflict(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::DeleteConflict, message)
    }

    #[must_use]
    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::LimitExceeded, message)
    }

    #[must_use]
    pub fn malformed_policy(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::MalformedPolicyDocument, message)
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::ValidationError, message)
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::InvalidInput, message)
    }
}

impl ServiceError for IamError {
    fn code(&self) -> &'static str {
        self.code.as_str()
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn status_code(&self) -> http::StatusCode {
        self.status_code
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::validation(message)
    }

    fn invalid_action(action: &str) -> Self {
        Self::with_message(IamErrorCode::InvalidAction, invalid_action_message(action))
    }

    fn serialization(message: impl Into<String>) -> Self {
        Self::validation(message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(IamErrorCode::ServiceFailure, message)
    }
}

impl From<StoreError> for IamError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(key) => Self::no_such_entity(format!("{key} cannot be found.")),
            StoreError::AlreadyExists(key) => Self::already_exists(format!("{key} already exists.")),
            StoreError::RevisionMismatch { key, .. } => Self::with_message(
                IamErrorCode::ServiceFailure,
                format!("Concurrent modification of {key}"),
            ),
        }
        .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_codes_to_iam_statuses() {
        assert_eq!(
            IamError::role_not_found("r").status_code,
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            IamError::delete_conflict("x").status_code,
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            IamError::malformed_policy("x").status_code,
            http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_should_classify_faults() {
        assert_eq!(IamError::role_not_found("r").fault(), "Sender");
        assert_eq!(
            <IamError as ServiceError>::internal_error("boom").fault(),
            "Receiver"
        );
    }

    #[test]
    fn test_should_name_missing_role_in_message() {
        let err = IamError::role_not_found("admin");
        assert_eq!(err.message, "The role with name admin cannot be found.");
        assert_eq!(err.code.as_str(), "NoSuchEntity");
    }
}
