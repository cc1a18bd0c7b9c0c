//! Lambda operation outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Concurrency, FunctionCodeLocation, FunctionConfiguration};

/// Responses that carry no members.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmptyOutput {}

/// `CreateFunction`, `GetFunctionConfiguration` and both update operations
/// return the bare configuration.
pub type FunctionConfigurationOutput = FunctionConfiguration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetFunctionOutput {
    pub configuration: FunctionConfiguration,
    pub code: FunctionCodeLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListFunctionsOutput {
    pub functions: Vec<FunctionConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_marker: Option<String>,
}

/// `Statement` is the added statement as a JSON string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddPermissionOutput {
    pub statement: String,
}

/// `Policy` is the whole policy document as a JSON string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetPolicyOutput {
    pub policy: String,
    pub revision_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsOutput {
    pub tags: BTreeMap<String, String>,
}

pub type PutFunctionConcurrencyOutput = Concurrency;
pub type GetFunctionConcurrencyOutput = Concurrency;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_omit_unset_concurrency() {
        let json = serde_json::to_string(&GetFunctionConcurrencyOutput::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_should_omit_next_marker_on_last_page() {
        let json = serde_json::to_value(ListFunctionsOutput::default()).unwrap();
        assert_eq!(json, serde_json::json!({"Functions": []}));
    }
}
