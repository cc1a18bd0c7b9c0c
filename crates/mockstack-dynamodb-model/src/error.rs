//! DynamoDB error types.
//!
//! DynamoDB errors use JSON format with a `__type` field containing the
//! fully-qualified error type name.

use std::fmt;

use mockstack_core::{ServiceError, StoreError, invalid_action_message};

/// DynamoDB control-plane error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum DynamoDBErrorCode {
    /// Table (or import target) already exists.
    ResourceInUseException,
    /// Table or other resource not found.
    ResourceNotFoundException,
    /// Source table of a backup operation not found.
    TableNotFoundException,
    /// Restore target already exists.
    TableAlreadyExistsException,
    /// Backup not found.
    BackupNotFoundException,
    /// Backup name already used for the table.
    BackupInUseException,
    /// Global table not found.
    GlobalTableNotFoundException,
    /// Global table already exists.
    GlobalTableAlreadyExistsException,
    /// Replica region already part of the global table.
    ReplicaAlreadyExistsException,
    /// Replica region not part of the global table.
    ReplicaNotFoundException,
    /// No resource policy, or its revision differs from the expected one.
    PolicyNotFoundException,
    /// Export not found.
    ExportNotFoundException,
    /// Export client token reused with different parameters.
    ExportConflictException,
    /// Import not found.
    ImportNotFoundException,
    /// Point-in-time recovery is not enabled for the table.
    PointInTimeRecoveryUnavailableException,
    /// Account limit exceeded.
    LimitExceededException,
    /// Validation error.
    #[default]
    ValidationException,
    /// Request body is not valid JSON.
    SerializationException,
    /// Internal server error.
    InternalServerError,
    /// Unknown or missing action.
    InvalidAction,
}

impl DynamoDBErrorCode {
    /// Returns the fully-qualified error type string for JSON `__type` field.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ResourceInUseException => {
                "com.amazonaws.dynamodb.v20120810#ResourceInUseException"
            }
            Self::ResourceNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException"
            }
            Self::TableNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#TableNotFoundException"
            }
            Self::TableAlreadyExistsException => {
                "com.amazonaws.dynamodb.v20120810#TableAlreadyExistsException"
            }
            Self::BackupNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#BackupNotFoundException"
            }
            Self::BackupInUseException => "com.amazonaws.dynamodb.v20120810#BackupInUseException",
            Self::GlobalTableNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#GlobalTableNotFoundException"
            }
            Self::GlobalTableAlreadyExistsException => {
                "com.amazonaws.dynamodb.v20120810#GlobalTableAlreadyExistsException"
            }
            Self::ReplicaAlreadyExistsException => {
                "com.amazonaws.dynamodb.v20120810#ReplicaAlreadyExistsException"
            }
            Self::ReplicaNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#ReplicaNotFoundException"
            }
            Self::PolicyNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#PolicyNotFoundException"
            }
            Self::ExportNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#ExportNotFoundException"
            }
            Self::ExportConflictException => {
                "com.amazonaws.dynamodb.v20120810#ExportConflictException"
            }
            Self::ImportNotFoundException => {
                "com.amazonaws.dynamodb.v20120810#ImportNotFoundException"
            }
            Self::PointInTimeRecoveryUnavailableException => {
                "com.amazonaws.dynamodb.v20120810#PointInTimeRecoveryUnavailableException"
            }
            Self::LimitExceededException => {
                "com.amazonaws.dynamodb.v20120810#LimitExceededException"
            }
            Self::ValidationException => "com.amazon.coral.validate#ValidationException",
            Self::SerializationException => {
                "com.amazonaws.dynamodb.v20120810#SerializationException"
            }
            Self::InternalServerError => "com.amazonaws.dynamodb.v20120810#InternalServerError",
            Self::InvalidAction => "com.amazonaws.dynamodb.v20120810#InvalidAction",
        }
    }

    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceInUseException => "ResourceInUseException",
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::TableNotFoundException => "TableNotFoundException",
            Self::TableAlreadyExistsException => "TableAlreadyExistsException",
            Self::BackupNotFoundException => "BackupNotFoundException",
            Self::BackupInUseException => "BackupInUseException",
            Self::GlobalTableNotFoundException => "GlobalTableNotFoundException",
            Self::GlobalTableAlreadyExistsException => "GlobalTableAlreadyExistsException",
            Self::ReplicaAlreadyExistsException => "ReplicaAlreadyExistsException",
            Self::ReplicaNotFoundException => "ReplicaNotFoundException",
            Self::PolicyNotFoundException => "PolicyNotFoundException",
            Self::ExportNotFoundException => "ExportNotFoundException",
            Self::ExportConflictException => "ExportConflictException",
            Self::ImportNotFoundException => "ImportNotFoundException",
            Self::PointInTimeRecoveryUnavailableException => {
                "PointInTimeRecoveryUnavailableException"
            }
            Self::LimitExceededException => "LimitExceededException",
            Self::ValidationException => "ValidationException",
            Self::SerializationException => "SerializationException",
            Self::InternalServerError => "InternalServerError",
            Self::InvalidAction => "InvalidAction",
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for DynamoDBErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DynamoDB error response.
#[derive(Debug)]
pub struct DynamoDBError {
    /// The error code.
    pub code: DynamoDBErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for DynamoDBError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamoDBError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for DynamoDBError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl DynamoDBError {
    /// Create a new `DynamoDBError` from an error code.
    #[must_use]
    pub fn new(code: DynamoDBErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.as_str().to_owned(),
            code,
            source: None,
        }
    }

    /// Create a new `DynamoDBError` with a custom message.
    #[must_use]
    pub fn with_message(code: DynamoDBErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// Table already exists.
    #[must_use]
    pub fn resource_in_use(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::ResourceInUseException, message)
    }

    /// Table or resource not found.
    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::ResourceNotFoundException, message)
    }

    /// Requested table does not exist: `Requested resource not found: Table: <name> not found`.
    #[must_use]
    pub fn table_not_found(table_name: &str) -> Self {
        Self::resource_not_found(format!(
            "Requested resource not found: Table: {table_name} not found"
        ))
    }

    /// Validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::ValidationException, message)
    }

    /// Serialization error.
    #[must_use]
    pub fn serialization_exception(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::SerializationException, message)
    }

    /// Internal server error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::InternalServerError, message)
    }
}

impl ServiceError for DynamoDBError {
    fn code(&self) -> &'static str {
        self.code.as_str()
    }

    fn error_type(&self) -> &'static str {
        self.code.error_type()
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
        Self::with_message(DynamoDBErrorCode::InvalidAction, invalid_action_message(action))
    }

    fn serialization(message: impl Into<String>) -> Self {
        Self::serialization_exception(message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::internal_error(message)
    }
}

impl From<StoreError> for DynamoDBError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::NotFound(_) => DynamoDBErrorCode::ResourceNotFoundException,
            StoreError::AlreadyExists(_) => DynamoDBErrorCode::ResourceInUseException,
            StoreError::RevisionMismatch { .. } => DynamoDBErrorCode::PolicyNotFoundException,
        };
        Self::with_message(code, err.to_string()).with_source(err)
    }
}

/// Create a `DynamoDBError` from an error code.
///
/// # Examples
///
/// ```
/// use mockstack_dynamodb_model::dynamodb_error;
/// use mockstack_dynamodb_model::error::DynamoDBErrorCode;
///
/// let err = dynamodb_error!(ValidationException);
/// assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
///
/// let err = dynamodb_error!(BackupNotFoundException, "Backup not found");
/// assert_eq!(err.message, "Backup not found");
/// ```
#[macro_export]
macro_rules! dynamodb_error {
    ($code:ident) => {
        $crate::error::DynamoDBError::new($crate::error::DynamoDBErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::DynamoDBError::with_message($crate::error::DynamoDBErrorCode::$code, $msg)
    };
}
