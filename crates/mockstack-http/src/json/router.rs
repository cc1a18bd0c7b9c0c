//! Action resolution for the `awsJson` protocol.
//!
//! Every request is `POST /` with the action in the `X-Amz-Target` header:
//!
//! ```text
//! X-Amz-Target: DynamoDB_20120810.CreateTable
//! X-Amz-Target: AWSLambda_20150331.GetFunction
//! ```
//!
//! The header is split on `.` and the last segment is the action name. An
//! [`ExplicitAction`] request extension takes precedence over the header.

use mockstack_core::{AwsOperation, ServiceError};

use crate::context::ExplicitAction;

/// Content types accepted on JSON protocol requests.
const JSON_CONTENT_TYPES: &[&str] = &[
    "application/x-amz-json-1.0",
    "application/x-amz-json-1.1",
    "application/json",
];

/// Extract the action name from the explicit extension or the target header.
#[must_use]
pub fn action_name(extensions: &http::Extensions, headers: &http::HeaderMap) -> Option<String> {
    if let Some(ExplicitAction(action)) = extensions.get::<ExplicitAction>() {
        return Some(action.clone());
    }
    let target = headers.get("x-amz-target")?.to_str().ok()?;
    target
        .rsplit('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Resolve the operation a JSON protocol request addresses.
pub fn resolve_operation<O, E>(
    extensions: &http::Extensions,
    headers: &http::HeaderMap,
) -> Result<O, E>
where
    O: AwsOperation,
    E: ServiceError,
{
    let name = action_name(extensions, headers).ok_or_else(|| E::invalid_action(""))?;
    O::from_name(&name).ok_or_else(|| E::invalid_action(&name))
}

/// Check that a present `Content-Type` is a JSON type. A missing header is accepted.
pub fn check_content_type<E: ServiceError>(headers: &http::HeaderMap) -> Result<(), E> {
    let Some(value) = headers.get(http::header::CONTENT_TYPE) else {
        return Ok(());
    };
    let essence = value
        .to_str()
        .unwrap_or_default()
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if JSON_CONTENT_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(E::validation(format!(
            "Unsupported content type '{essence}' for a JSON protocol request"
        )))
    }
}
