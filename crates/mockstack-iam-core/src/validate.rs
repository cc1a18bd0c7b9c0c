//! IAM parameter validation.

use mockstack_core::pagination::page_size;
use mockstack_iam_model::IamError;
use serde_json::Value;

pub(crate) const DEFAULT_MAX_ITEMS: usize = 100;
pub(crate) const MAX_ITEMS_LIMIT: i32 = 1000;
pub(crate) const MAX_TAGS: usize = 50;
pub(crate) const MAX_POLICY_VERSIONS: usize = 5;

const MIN_SESSION_DURATION: i32 = 3600;
const MAX_SESSION_DURATION: i32 = 43_200;
const MAX_DESCRIPTION: usize = 1000;
const MAX_PATH: usize = 512;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+=,.@_-".contains(c)
}

/// `[\w+=,.@-]{1,max}`.
fn validate_name(field: &str, value: &str, max: usize) -> Result<(), IamError> {
    if value.is_empty() || value.len() > max {
        return Err(IamError::validation(format!(
            "1 validation error detected: Value '{value}' at '{field}' failed to satisfy \
             constraint: Member must have length less than or equal to {max}"
        )));
    }
    if !value.chars().all(is_name_char) {
        return Err(IamError::validation(format!(
            "1 validation error detected: Value '{value}' at '{field}' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: [\\w+=,.@-]+"
        )));
    }
    Ok(())
}

pub(crate) fn validate_role_name(name: &str) -> Result<(), IamError> {
    validate_name("roleName", name, 64)
}

pub(crate) fn validate_policy_name(name: &str) -> Result<(), IamError> {
    validate_name("policyName", name, 128)
}

pub(crate) fn validate_user_name(name: &str) -> Result<(), IamError> {
    validate_name("userName", name, 64)
}

/// `/` or `/segment/.../`, printable ASCII, at most 512 characters.
pub(crate) fn validate_path(path: &str) -> Result<(), IamError> {
    let well_formed = path.len() <= MAX_PATH
        && path.starts_with('/')
        && path.ends_with('/')
        && path.bytes().all(|b| (0x21..=0x7e).contains(&b));
    if well_formed {
        Ok(())
    } else {
        Err(IamError::validation(format!(
            "The specified value for path is invalid. It must begin and end with / and \
             contain only alphanumeric characters and/or / characters. Value: {path}"
        )))
    }
}

/// Parse `path` or default to `/`.
pub(crate) fn resolve_path(path: Option<String>) -> Result<String, IamError> {
    let path = path.unwrap_or_else(|| "/".to_owned());
    validate_path(&path)?;
    Ok(path)
}

pub(crate) fn validate_description(description: Option<&str>) -> Result<(), IamError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION => Err(IamError::validation(format!(
            "1 validation error detected: Value at 'description' failed to satisfy \
             constraint: Member must have length less than or equal to {MAX_DESCRIPTION}"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn validate_max_session_duration(seconds: i32) -> Result<(), IamError> {
    if (MIN_SESSION_DURATION..=MAX_SESSION_DURATION).contains(&seconds) {
        Ok(())
    } else {
        Err(IamError::validation(format!(
            "1 validation error detected: Value '{seconds}' at 'maxSessionDuration' failed to \
             satisfy constraint: Member must have value between {MIN_SESSION_DURATION} and \
             {MAX_SESSION_DURATION}"
        )))
    }
}

/// A policy document must be a JSON object; `Version`, if present, must be
/// one of the two published policy language versions. Statements are stored
/// as given and never evaluated.
pub(crate) fn validate_policy_document(document: &str) -> Result<(), IamError> {
    let value: Value = serde_json::from_str(document)
        .map_err(|e| IamError::malformed_policy("Syntax errors in policy.").with_source(e))?;
    let Value::Object(map) = value else {
        return Err(IamError::malformed_policy("Syntax errors in policy."));
    };
    match map.get("Version") {
        None => Ok(()),
        Some(Value::String(v)) if v == "2012-10-17" || v == "2008-10-17" => Ok(()),
        Some(_) => Err(IamError::malformed_policy(
            "The policy failed legacy parsing",
        )),
    }
}

/// `MaxItems` in `1..=1000`, default 100.
pub(crate) fn max_items(requested: Option<i32>) -> Result<usize, IamError> {
    if let Some(n) = requested {
        if !(1..=MAX_ITEMS_LIMIT).contains(&n) {
            return Err(IamError::validation(format!(
                "1 validation error detected: Value '{n}' at 'maxItems' failed to satisfy \
                 constraint: Member must have value between 1 and {MAX_ITEMS_LIMIT}"
            )));
        }
    }
    Ok(page_size(requested, DEFAULT_MAX_ITEMS, 1000))
}

/// Whether `path` starts with the optional `PathPrefix` filter.
pub(crate) fn path_matches(path: &str, prefix: Option<&str>) -> bool {
    prefix.is_none_or(|p| path.starts_with(p))
}

#[cfg(test)]
mod tests {
    use mockstack_iam_model::IamErrorCode;

    use super::*;

    #[test]
    fn test_should_accept_iam_name_characters() {
        assert!(validate_role_name("lambda_exec+role=1,a.b@c-d").is_ok());
        assert!(validate_role_name("bad/name").is_err());
        assert!(validate_role_name("").is_err());
        assert!(validate_role_name(&"r".repeat(65)).is_err());
        assert!(validate_policy_name(&"p".repeat(128)).is_ok());
    }

    #[test]
    fn test_should_require_slash_delimited_paths() {
        assert!(validate_path("/").is_ok());
        assert!(validate_path("/service-role/").is_ok());
        assert!(validate_path("service-role/").is_err());
        assert!(validate_path("/no-trailing").is_err());
        assert!(validate_path("/with space/").is_err());
    }

    #[test]
    fn test_should_reject_malformed_documents() {
        let err = validate_policy_document("{not json").unwrap_err();
        assert_eq!(err.code, IamErrorCode::MalformedPolicyDocument);
        assert!(validate_policy_document("[]").is_err());
        assert!(validate_policy_document(r#"{"Version":"2020-01-01"}"#).is_err());
        assert!(
            validate_policy_document(r#"{"Version":"2012-10-17","Statement":[]}"#).is_ok()
        );
    }

    #[test]
    fn test_should_bound_max_items_and_session_duration() {
        assert_eq!(max_items(None).unwrap(), 100);
        assert_eq!(max_items(Some(1000)).unwrap(), 1000);
        assert!(max_items(Some(0)).is_err());
        assert!(max_items(Some(1001)).is_err());
        assert!(validate_max_session_duration(3599).is_err());
        assert!(validate_max_session_duration(43_200).is_ok());
    }
}
