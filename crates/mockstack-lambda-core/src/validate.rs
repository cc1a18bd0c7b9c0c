//! Input validation for function operations.

use std::sync::LazyLock;

use mockstack_lambda_model::LambdaError;
use mockstack_lambda_model::types::Environment;
use regex::Regex;

static FUNCTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("valid regex"));

/// `arn:aws:lambda:<region>:<account>:function:<name>[:<qualifier>]`,
/// `<account>:function:<name>[:<qualifier>]` or `<name>[:<qualifier>]`.
static FUNCTION_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:arn:aws[a-zA-Z-]*:lambda:[a-z]{2}(?:-gov)?-[a-z]+-\d{1}:)?(?:\d{12}:)?function:)?([a-zA-Z0-9_-]{1,64})(?::(\$LATEST|[a-zA-Z0-9_-]+))?$",
    )
    .expect("valid regex")
});

static ROLE_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-zA-Z-]*:iam::\d{12}:role/?[a-zA-Z_0-9+=,.@\-_/]+$")
        .expect("valid regex")
});

static STATEMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]{1,100}$").expect("valid regex"));

static PERMISSION_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:lambda:[*]|lambda:[a-zA-Z]+|[*])$").expect("valid regex"));

static ENV_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]([a-zA-Z0-9_])*$").expect("valid regex"));

pub(crate) const RUNTIMES: &[&str] = &[
    "nodejs18.x",
    "nodejs20.x",
    "nodejs22.x",
    "python3.9",
    "python3.10",
    "python3.11",
    "python3.12",
    "python3.13",
    "java11",
    "java17",
    "java21",
    "dotnet8",
    "ruby3.2",
    "ruby3.3",
    "provided.al2",
    "provided.al2023",
];

pub(crate) const MIN_TIMEOUT: i32 = 1;
pub(crate) const MAX_TIMEOUT: i32 = 900;
pub(crate) const MIN_MEMORY: i32 = 128;
pub(crate) const MAX_MEMORY: i32 = 10240;
pub(crate) const MIN_EPHEMERAL: i32 = 512;
pub(crate) const MAX_EPHEMERAL: i32 = 10240;
const MAX_ENV_BYTES: usize = 4096;

pub(crate) fn validate_function_name(name: &str) -> Result<(), LambdaError> {
    if FUNCTION_NAME.is_match(name) {
        Ok(())
    } else {
        Err(LambdaError::validation(format!(
            "1 validation error detected: Value '{name}' at 'functionName' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: [a-zA-Z0-9-_]+"
        )))
    }
}

/// Split a function identifier into its name and optional qualifier.
pub(crate) fn parse_function_identifier(
    identifier: &str,
) -> Result<(String, Option<String>), LambdaError> {
    let caps = FUNCTION_IDENTIFIER.captures(identifier).ok_or_else(|| {
        LambdaError::validation(format!(
            "1 validation error detected: Value '{identifier}' at 'functionName' failed to \
             satisfy constraint: Member must satisfy regular expression pattern: \
             (arn:(aws[a-zA-Z-]*)?:lambda:)?([a-z]{{2}}(-gov)?-[a-z]+-\\d{{1}}:)?(\\d{{12}}:)?\
             (function:)?([a-zA-Z0-9-_]+)(:(\\$LATEST|[a-zA-Z0-9-_]+))?"
        ))
    })?;
    let name = caps[1].to_owned();
    let qualifier = caps.get(2).map(|m| m.as_str().to_owned());
    Ok((name, qualifier))
}

pub(crate) fn validate_role(role: &str) -> Result<(), LambdaError> {
    if ROLE_ARN.is_match(role) {
        Ok(())
    } else {
        Err(LambdaError::validation(format!(
            "1 validation error detected: Value '{role}' at 'role' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: \
             arn:(aws[a-zA-Z-]*)?:iam::\\d{{12}}:role/?[a-zA-Z_0-9+=,.@\\-_/]+"
        )))
    }
}

pub(crate) fn validate_runtime(runtime: &str) -> Result<(), LambdaError> {
    if RUNTIMES.contains(&runtime) {
        Ok(())
    } else {
        Err(LambdaError::invalid_parameter(format!(
            "Value {runtime} at 'runtime' failed to satisfy constraint: Member must satisfy \
             enum value set: [{}] or be a valid ARN",
            RUNTIMES.join(", ")
        )))
    }
}

fn validate_range(value: i32, field: &str, min: i32, max: i32) -> Result<(), LambdaError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        let bound = if value < min {
            format!("greater than or equal to {min}")
        } else {
            format!("less than or equal to {max}")
        };
        Err(LambdaError::validation(format!(
            "1 validation error detected: Value '{value}' at '{field}' failed to satisfy \
             constraint: Member must have value {bound}"
        )))
    }
}

pub(crate) fn validate_timeout(timeout: i32) -> Result<(), LambdaError> {
    validate_range(timeout, "timeout", MIN_TIMEOUT, MAX_TIMEOUT)
}

pub(crate) fn validate_memory_size(memory: i32) -> Result<(), LambdaError> {
    validate_range(memory, "memorySize", MIN_MEMORY, MAX_MEMORY)
}

pub(crate) fn validate_ephemeral_storage(size: i32) -> Result<(), LambdaError> {
    validate_range(size, "ephemeralStorage.size", MIN_EPHEMERAL, MAX_EPHEMERAL)
}

/// Keys must be identifiers and the serialized map must fit in 4 KB.
pub(crate) fn validate_environment(env: &Environment) -> Result<(), LambdaError> {
    if let Some(key) = env.variables.keys().find(|k| !ENV_KEY.is_match(k)) {
        return Err(LambdaError::validation(format!(
            "1 validation error detected: Value '{key}' at 'environment.variables' failed to \
             satisfy constraint: Map keys must satisfy constraint: [Member must satisfy \
             regular expression pattern: [a-zA-Z]([a-zA-Z0-9_])+]"
        )));
    }
    let size: usize = env
        .variables
        .iter()
        .map(|(k, v)| k.len() + v.len())
        .sum();
    if size > MAX_ENV_BYTES {
        return Err(LambdaError::invalid_parameter(format!(
            "Lambda was unable to configure your environment variables because the \
             environment variables you have provided exceeded the 4KB limit. String \
             measured: {size}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_statement_id(sid: &str) -> Result<(), LambdaError> {
    if STATEMENT_ID.is_match(sid) {
        Ok(())
    } else {
        Err(LambdaError::validation(format!(
            "1 validation error detected: Value '{sid}' at 'statementId' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: ([a-zA-Z0-9-_.]+)"
        )))
    }
}

pub(crate) fn validate_permission_action(action: &str) -> Result<(), LambdaError> {
    if PERMISSION_ACTION.is_match(action) {
        Ok(())
    } else {
        Err(LambdaError::validation(format!(
            "1 validation error detected: Value '{action}' at 'action' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: \
             (lambda:[*]|lambda:[a-zA-Z]+|[*])"
        )))
    }
}
