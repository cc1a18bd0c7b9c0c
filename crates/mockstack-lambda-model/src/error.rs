//! Lambda error types.

use std::fmt;

use mockstack_core::{ServiceError, StoreError, invalid_action_message};

/// Lambda control-plane error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum LambdaErrorCode {
    /// Function, statement or other resource not found.
    ResourceNotFoundException,
    /// Function or statement already exists.
    ResourceConflictException,
    /// `RevisionId` does not match the current revision.
    PreconditionFailedException,
    /// A parameter value is out of range or malformed.
    #[default]
    InvalidParameterValueException,
    /// Required member missing or request shape invalid.
    ValidationException,
    /// Request body is not valid JSON.
    InvalidRequestContentException,
    /// Internal failure.
    ServiceException,
    /// Unknown or missing action.
    InvalidAction,
}

impl LambdaErrorCode {
    /// Short code, also used as the JSON `__type`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::ResourceConflictException => "ResourceConflictException",
            Self::PreconditionFailedException => "PreconditionFailedException",
            Self::InvalidParameterValueException => "InvalidParameterValueException",
            Self::ValidationException => "ValidationException",
            Self::InvalidRequestContentException => "InvalidRequestContentException",
            Self::ServiceException => "ServiceException",
            Self::InvalidAction => "InvalidAction",
        }
    }

    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::ResourceNotFoundException => http::StatusCode::NOT_FOUND,
            Self::ResourceConflictException => http::StatusCode::CONFLICT,
            Self::PreconditionFailedException => http::StatusCode::PRECONDITION_FAILED,
            Self::ServiceException => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidParameterValueException
            | Self::ValidationException
            | Self::InvalidRequestContentException
            | Self::InvalidAction => http::StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for LambdaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Lambda error response.
#[derive(Debug)]
pub struct LambdaError {
    pub code: LambdaErrorCode,
    pub message: String,
    pub status_code: http::StatusCode,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for LambdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LambdaError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for LambdaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl LambdaError {
    #[must_use]
    pub fn new(code: LambdaErrorCode) -> Self {
        Self::with_message(code, code.as_str())
    }

    #[must_use]
    pub fn with_message(code: LambdaErrorCode, message: impl Into<String>) -> Self {
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

    /// `Function not found: <arn>`.
    #[must_use]
    pub fn function_not_found(function_arn: &str) -> Self {
        Self::with_message(
            LambdaErrorCode::ResourceNotFoundException,
            format!("Function not found: {function_arn}"),
        )
    }

    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::with_message(LambdaErrorCode::ResourceNotFoundException, message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(LambdaErrorCode::ResourceConflictException, message)
    }

    /// Member shape or pattern violation.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(LambdaErrorCode::ValidationException, message)
    }

    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::with_message(LambdaErrorCode::InvalidParameterValueException, message)
    }

    /// The standard message for a stale `RevisionId`.
    #[must_use]
    pub fn precondition_failed() -> Self {
        Self::with_message(
            LambdaErrorCode::PreconditionFailedException,
            "The Revision Id provided does not match the latest Revision Id. Call the \
             GetFunction/GetAlias API to retrieve the latest Revision Id",
        )
    }
}

impl ServiceError for LambdaError {
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
        Self::with_message(LambdaErrorCode::InvalidAction, invalid_action_message(action))
    }

    fn serialization(message: impl Into<String>) -> Self {
        Self::with_message(LambdaErrorCode::InvalidRequestContentException, message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(LambdaErrorCode::ServiceException, message)
    }
}

impl From<StoreError> for LambdaError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(key) => Self::resource_not_found(format!(
                "The resource you requested does not exist. ({key})"
            )),
            StoreError::AlreadyExists(key) => Self::conflict(format!("Resource already exist: {key}")),
            StoreError::RevisionMismatch { .. } => Self::precondition_failed(),
        }
        .with_source(err)
    }
}

/// Create a `LambdaError` from an error code.
///
/// ```
/// use mockstack_lambda_model::lambda_error;
/// use mockstack_lambda_model::LambdaErrorCode;
///
/// let err = lambda_error!(ResourceConflictException, "exists");
/// assert_eq!(err.code, LambdaErrorCode::ResourceConflictException);
/// assert_eq!(err.status_code, http::StatusCode::CONFLICT);
/// ```
#[macro_export]
macro_rules! lambda_error {
    ($code:ident) => {
        $crate::error::LambdaError::new($crate::error::LambdaErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::LambdaError::with_message($crate::error::LambdaErrorCode::$code, $msg)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_codes_to_lambda_statuses() {
        assert_eq!(
            LambdaError::function_not_found("arn").status_code,
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            LambdaError::precondition_failed().status_code,
            http::StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            LambdaError::invalid_parameter("x").status_code,
            http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_should_convert_revision_mismatch_to_precondition_failed() {
        let err: LambdaError = StoreError::RevisionMismatch {
            key: "lambda:function:f".to_owned(),
            expected: "1".to_owned(),
            found: Some("2".to_owned()),
        }
        .into();
        assert_eq!(err.code, LambdaErrorCode::PreconditionFailedException);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_should_use_short_code_as_error_type() {
        let err = LambdaError::conflict("exists");
        assert_eq!(ServiceError::error_type(&err), "ResourceConflictException");
    }
}
