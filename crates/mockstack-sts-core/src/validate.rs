//! STS parameter validation.

use mockstack_core::Arn;
use mockstack_sts_model::{StsError, StsErrorCode};
use serde_json::Value;

pub(crate) const DEFAULT_DURATION: i32 = 3600;
pub(crate) const ROLE_DURATION: (i32, i32) = (900, 43_200);
pub(crate) const SESSION_TOKEN_DURATION: (i32, i32) = (900, 129_600);
pub(crate) const DEFAULT_SESSION_TOKEN_DURATION: i32 = 43_200;

const MAX_PACKED_POLICY: usize = 2048;
const MAX_SESSION_TAGS: usize = 50;

/// The role a `RoleArn` names: `(account, role name)`.
pub(crate) fn parse_role_arn(role_arn: &str) -> Result<(String, String), StsError> {
    let invalid = || {
        StsError::constraint(
            "roleArn",
            role_arn,
            "Member must satisfy regular expression pattern: arn:aws:iam::\\d{12}:role/.+",
        )
    };
    let arn: Arn = role_arn.parse().map_err(|_| invalid())?;
    let account_ok =
        arn.account_id.len() == 12 && arn.account_id.bytes().all(|b| b.is_ascii_digit());
    if arn.service != "iam" || arn.resource_type() != "role" || !account_ok {
        return Err(invalid());
    }
    let name = arn
        .resource_segments()
        .last()
        .filter(|n| !n.is_empty() && *n != "role")
        .ok_or_else(invalid)?
        .to_owned();
    Ok((arn.account_id, name))
}

/// `[\w+=,.@-]{2,64}`.
pub(crate) fn validate_session_name(name: &str) -> Result<(), StsError> {
    let len = name.chars().count();
    if !(2..=64).contains(&len) {
        return Err(StsError::constraint(
            "roleSessionName",
            name,
            "Member must have length between 2 and 64",
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_+=,.@-".contains(c))
    {
        return Err(StsError::constraint(
            "roleSessionName",
            name,
            "Member must satisfy regular expression pattern: [\\w+=,.@-]*",
        ));
    }
    Ok(())
}

/// Resolve `DurationSeconds` against its default and inclusive bounds.
pub(crate) fn duration(
    requested: Option<i32>,
    default: i32,
    (min, max): (i32, i32),
) -> Result<i32, StsError> {
    let seconds = requested.unwrap_or(default);
    if seconds < min {
        return Err(StsError::constraint(
            "durationSeconds",
            seconds,
            &format!("Member must have value greater than or equal to {min}"),
        ));
    }
    if seconds > max {
        return Err(StsError::constraint(
            "durationSeconds",
            seconds,
            &format!("Member must have value less than or equal to {max}"),
        ));
    }
    Ok(seconds)
}

/// Validate an inline session policy and return its packed size as a
/// percentage of the limit.
pub(crate) fn packed_policy_size(policy: Option<&str>) -> Result<Option<i32>, StsError> {
    let Some(policy) = policy else {
        return Ok(None);
    };
    if !matches!(serde_json::from_str::<Value>(policy), Ok(Value::Object(_))) {
        return Err(StsError::with_message(
            StsErrorCode::MalformedPolicyDocument,
            "Syntax errors in policy.",
        ));
    }
    if policy.len() > MAX_PACKED_POLICY {
        return Err(StsError::with_message(
            StsErrorCode::PackedPolicyTooLarge,
            "Packed policy consumes more than 100% of the allotted space.",
        ));
    }
    let percent = policy.len() * 100 / MAX_PACKED_POLICY;
    Ok(Some(i32::try_from(percent).unwrap_or(100)))
}

pub(crate) fn validate_session_tags(count: usize) -> Result<(), StsError> {
    if count > MAX_SESSION_TAGS {
        return Err(StsError::constraint(
            "tags",
            count,
            &format!("Member must have length less than or equal to {MAX_SESSION_TAGS}"),
        ));
    }
    Ok(())
}

/// `[\w]{16,128}`.
pub(crate) fn validate_access_key_id(access_key_id: &str) -> Result<(), StsError> {
    let ok = (16..=128).contains(&access_key_id.len())
        && access_key_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(StsError::constraint(
            "accessKeyId",
            access_key_id,
            "Member must satisfy regular expression pattern: [\\w]*",
        ))
    }
}
