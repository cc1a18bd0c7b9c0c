//! STS error types.

use std::fmt;

use mockstack_core::{ServiceError, StoreError, invalid_action_message};

/// STS error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum StsErrorCode {
    #[default]
    ValidationError,
    /// A session policy is not valid JSON.
    MalformedPolicyDocument,
    /// A session policy exceeds the packed size limit.
    PackedPolicyTooLarge,
    InvalidAction,
    InternalFailure,
}

impl StsErrorCode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::MalformedPolicyDocument => "MalformedPolicyDocument",
            Self::PackedPolicyTooLarge => "PackedPolicyTooLarge",
            Self::InvalidAction => "InvalidAction",
            Self::InternalFailure => "InternalFailure",
        }
    }

    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::InternalFailure => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError
            | Self::MalformedPolicyDocument
            | Self::PackedPolicyTooLarge
            | Self::InvalidAction => http::StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for StsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An STS error response.
#[derive(Debug)]
pub struct StsError {
    pub code: StsErrorCode,
    pub message: String,
    pub status_code: http::StatusCode,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for StsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StsError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for StsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl StsError {
    #[must_use]
    pub fn with_message(code: StsErrorCode, message: impl Into<String>) -> Self {
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
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(StsErrorCode::ValidationError, message)
    }

    /// `1 validation error detected: Value '<v>' at '<field>' failed to satisfy constraint: <c>`.
    #[must_use]
    pub fn constraint(field: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::validation(format!(
            "1 validation error detected: Value '{value}' at '{field}' failed to satisfy \
             constraint: {constraint}"
        ))
    }
}

impl ServiceError for StsError {
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
        Self::with_message(StsErrorCode::InvalidAction, invalid_action_message(action))
    }

    fn serialization(message: impl Into<String>) -> Self {
        Self::validation(message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(StsErrorCode::InternalFailure, message)
    }
}

impl From<StoreError> for StsError {
    fn from(err: StoreError) -> Self {
        Self::with_message(StsErrorCode::InternalFailure, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_format_constraint_messages() {
        let err = StsError::constraint(
            "durationSeconds",
            60,
            "Member must have value greater than or equal to 900",
        );
        assert_eq!(
            err.message,
            "1 validation error detected: Value '60' at 'durationSeconds' failed to satisfy \
             constraint: Member must have value greater than or equal to 900"
        );
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_report_internal_failures_as_receiver_faults() {
        let err = <StsError as ServiceError>::internal_error("boom");
        assert_eq!(err.code(), "InternalFailure");
        assert_eq!(err.fault(), "Receiver");
    }
}
