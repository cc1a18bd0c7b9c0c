//! Contracts between the protocol layer and each emulated service.
//!
//! The dispatcher in `mockstack-http` is generic over an operation enum
//! ([`AwsOperation`]) and an error type ([`ServiceError`]); every service
//! model crate implements both.

use std::fmt;

/// An enumerated AWS API action of a single service.
pub trait AwsOperation: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Parse an action name (`CreateTable`) into the operation.
    fn from_name(name: &str) -> Option<Self>;

    /// The action name as it appears on the wire.
    fn as_str(&self) -> &'static str;

    /// Top-level parameters that must be present and non-empty.
    fn required_fields(&self) -> &'static [&'static str] {
        &[]
    }
}

/// An AWS error that can be rendered by either wire protocol.
pub trait ServiceError: std::error::Error + Send + Sync + 'static {
    /// Short error code (`ResourceNotFoundException`, `NoSuchEntity`).
    fn code(&self) -> &'static str;

    /// Value of the JSON `__type` field; defaults to the short code.
    fn error_type(&self) -> &'static str {
        self.code()
    }

    /// Human-readable message.
    fn message(&self) -> &str;

    /// HTTP status of the error response.
    fn status_code(&self) -> http::StatusCode;

    /// `Sender` for client faults, `Receiver` for server faults.
    fn fault(&self) -> &'static str {
        if self.status_code().is_server_error() {
            "Receiver"
        } else {
            "Sender"
        }
    }

    /// Malformed or missing input.
    fn validation(message: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Unroutable or unknown action name.
    fn invalid_action(action: &str) -> Self
    where
        Self: Sized;

    /// Request body could not be decoded.
    fn serialization(message: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Failure inside the emulator itself.
    fn internal_error(message: impl Into<String>) -> Self
    where
        Self: Sized;
}

/// Lower-case the first character of a wire field name (`TableName` -> `tableName`),
/// the way AWS validation messages refer to members.
#[must_use]
pub fn lower_camel(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// Message for an action that could not be resolved or is not supported.
#[must_use]
pub fn invalid_action_message(action: &str) -> String {
    if action.is_empty() {
        "Could not determine the action from the request".to_owned()
    } else {
        format!("The action {action} is not valid for this web service")
    }
}

/// AWS-style message for a required member that is absent or empty.
#[must_use]
pub fn missing_field_message(field: &str) -> String {
    format!(
        "1 validation error detected: Value null at '{}' failed to satisfy constraint: \
         Member must not be null",
        lower_camel(field)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_lower_camel_field_names() {
        assert_eq!(lower_camel("TableName"), "tableName");
        assert_eq!(lower_camel("ARN"), "aRN");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn test_should_name_invalid_action() {
        assert!(invalid_action_message("Frobnicate").contains("Frobnicate"));
        assert!(invalid_action_message("").starts_with("Could not determine"));
    }

    #[test]
    fn test_should_format_missing_field_message() {
        let msg = missing_field_message("RoleName");
        assert!(msg.contains("'roleName'"));
        assert!(msg.starts_with("1 validation error detected"));
    }
}
