//! Input validation shared by table-creating operations.

use std::collections::HashSet;

use mockstack_core::Arn;
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ProvisionedThroughput,
};

/// Table names are 1 to 255 characters from `[a-zA-Z0-9_.-]`.
pub(crate) fn validate_table_name(name: &str) -> Result<(), DynamoDBError> {
    if name.is_empty() || name.len() > 255 {
        return Err(DynamoDBError::validation(format!(
            "TableName must be at least 1 characters long and at most 255 characters long, \
             but was {} characters",
            name.len()
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
    {
        return Err(DynamoDBError::validation(format!(
            "1 validation error detected: Value '{name}' at 'tableName' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: [a-zA-Z0-9_.-]+"
        )));
    }
    Ok(())
}

/// Exactly one HASH element and at most one RANGE element.
pub(crate) fn validate_key_schema_structure(
    elements: &[KeySchemaElement],
) -> Result<(), DynamoDBError> {
    let hash_count = elements
        .iter()
        .filter(|e| e.key_type == KeyType::Hash)
        .count();
    let range_count = elements
        .iter()
        .filter(|e| e.key_type == KeyType::Range)
        .count();

    if hash_count != 1 {
        return Err(DynamoDBError::validation(
            "Invalid KeySchema: Some index key schema element is not valid",
        ));
    }
    if range_count > 1 || elements.len() > 2 {
        return Err(DynamoDBError::validation(
            "Too many KeySchema elements; expected at most 2",
        ));
    }
    if elements.first().map(|e| e.key_type) != Some(KeyType::Hash) {
        return Err(DynamoDBError::validation(
            "Invalid KeySchema: The first KeySchemaElement is not a HASH key type",
        ));
    }
    Ok(())
}

/// No duplicate names and only `S`, `N` or `B` types.
pub(crate) fn validate_attribute_definitions(
    definitions: &[AttributeDefinition],
) -> Result<(), DynamoDBError> {
    let mut seen = HashSet::new();
    for (i, def) in definitions.iter().enumerate() {
        if !def.attribute_type.is_valid_key_type() {
            return Err(DynamoDBError::validation(format!(
                "1 validation error detected: Value '{}' at \
                 'attributeDefinitions.{}.member.attributeType' failed to satisfy constraint: \
                 Member must satisfy enum value set: [B, N, S]",
                def.attribute_type,
                i + 1
            )));
        }
        if !seen.insert(def.attribute_name.as_str()) {
            return Err(DynamoDBError::validation(format!(
                "Cannot have two attributes with the same name: {}",
                def.attribute_name
            )));
        }
    }
    Ok(())
}

/// Every key attribute must have a matching definition.
pub(crate) fn validate_key_attributes_defined(
    elements: &[KeySchemaElement],
    definitions: &[AttributeDefinition],
) -> Result<(), DynamoDBError> {
    for element in elements {
        let defined = definitions
            .iter()
            .any(|d| d.attribute_name == element.attribute_name);
        if !defined {
            return Err(DynamoDBError::validation(format!(
                "One or more parameter values were invalid: Some index key schema elements are \
                 not valid. The following index key schema element does not have a matching \
                 AttributeDefinition: {}",
                element.attribute_name
            )));
        }
    }
    Ok(())
}

/// Resolve the effective billing mode.
///
/// Without an explicit mode the table is provisioned when throughput is
/// given and on-demand otherwise.
pub(crate) fn validate_billing_mode(
    billing_mode: Option<&BillingMode>,
    provisioned_throughput: Option<&ProvisionedThroughput>,
) -> Result<BillingMode, DynamoDBError> {
    let mode = billing_mode.cloned().unwrap_or(if provisioned_throughput.is_some() {
        BillingMode::Provisioned
    } else {
        BillingMode::PayPerRequest
    });
    match &mode {
        BillingMode::Unknown(val) => {
            return Err(DynamoDBError::validation(format!(
                "1 validation error detected: Value '{val}' at 'billingMode' failed to satisfy \
                 constraint: Member must satisfy enum value set: [PROVISIONED, PAY_PER_REQUEST]"
            )));
        }
        BillingMode::PayPerRequest => {
            if provisioned_throughput.is_some_and(|pt| {
                pt.read_capacity_units != 0 || pt.write_capacity_units != 0
            }) {
                return Err(DynamoDBError::validation(
                    "One or more parameter values were invalid: Neither ReadCapacityUnits nor \
                     WriteCapacityUnits can be specified when BillingMode is PAY_PER_REQUEST",
                ));
            }
        }
        BillingMode::Provisioned => match provisioned_throughput {
            None => {
                return Err(DynamoDBError::validation(
                    "No provisioned throughput specified for the table",
                ));
            }
            Some(pt) => validate_throughput(pt)?,
        },
    }
    Ok(mode)
}

/// Capacity units must be positive.
pub(crate) fn validate_throughput(pt: &ProvisionedThroughput) -> Result<(), DynamoDBError> {
    if pt.read_capacity_units < 1 || pt.write_capacity_units < 1 {
        return Err(DynamoDBError::validation(
            "One or more parameter values were invalid: ReadCapacityUnits and \
             WriteCapacityUnits must both be greater than 0",
        ));
    }
    Ok(())
}

/// Parse a DynamoDB resource ARN and return the table name it addresses.
///
/// Accepts `table/<name>` and anything below it (`table/<name>/stream/...`,
/// `table/<name>/index/...`).
pub(crate) fn table_name_from_arn(resource_arn: &str) -> Result<String, DynamoDBError> {
    let invalid = || DynamoDBError::validation(format!("Invalid TableArn: {resource_arn}"));
    let arn: Arn = resource_arn.parse().map_err(|_| invalid())?;
    if arn.service != "dynamodb" || arn.resource_type() != "table" {
        return Err(invalid());
    }
    arn.resource_segments()
        .nth(1)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or_else(invalid)
}

/// A policy document must be a JSON object.
pub(crate) fn validate_policy_document(policy: &str) -> Result<(), DynamoDBError> {
    match serde_json::from_str::<serde_json::Value>(policy) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        _ => Err(DynamoDBError::validation(
            "Resource-based policy must be valid JSON",
        )),
    }
}
