//! Lambda service state.

use mockstack_core::{Revisioned, StateStore, TagSet};
use mockstack_lambda_model::types::{FunctionCodeLocation, FunctionConfiguration};
use serde::Serialize;
use serde_json::{Map, Value};

/// Store key layout.
pub mod keys {
    pub const FUNCTION_PREFIX: &str = "lambda:function:";
    pub const POLICY_PREFIX: &str = "lambda:policy:";
    pub const CONCURRENCY_PREFIX: &str = "lambda:concurrency:";

    #[must_use]
    pub fn function(name: &str) -> String {
        format!("{FUNCTION_PREFIX}{name}")
    }

    #[must_use]
    pub fn policy(function_name: &str) -> String {
        format!("{POLICY_PREFIX}{function_name}")
    }

    #[must_use]
    pub fn concurrency(function_name: &str) -> String {
        format!("{CONCURRENCY_PREFIX}{function_name}")
    }
}

/// All Lambda state.
#[derive(Debug, Default)]
pub struct LambdaState {
    pub functions: StateStore<FunctionRecord>,
    pub policies: StateStore<PolicyRecord>,
    /// Reserved concurrent executions per function.
    pub concurrency: StateStore<i32>,
}

impl LambdaState {
    /// Create empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A function at `$LATEST`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRecord {
    pub configuration: FunctionConfiguration,
    pub code: FunctionCodeLocation,
    pub tags: TagSet,
}

impl FunctionRecord {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.configuration.function_name
    }

    #[must_use]
    pub fn arn(&self) -> &str {
        &self.configuration.function_arn
    }
}

impl Revisioned for FunctionRecord {
    fn revision_id(&self) -> &str {
        &self.configuration.revision_id
    }
}

/// One statement of a function's resource policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: &'static str,
    pub principal: Value,
    pub action: String,
    pub resource: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub condition: Map<String, Value>,
}

/// A function's resource policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRecord {
    pub statements: Vec<PolicyStatement>,
    pub revision_id: String,
}

impl PolicyRecord {
    #[must_use]
    pub fn has_statement(&self, sid: &str) -> bool {
        self.statements.iter().any(|s| s.sid == sid)
    }

    /// The policy document as returned by `GetPolicy`.
    pub fn document(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Document<'a> {
            version: &'static str,
            id: &'static str,
            statement: &'a [PolicyStatement],
        }
        serde_json::to_string(&Document {
            version: "2012-10-17",
            id: "default",
            statement: &self.statements,
        })
    }
}

impl Revisioned for PolicyRecord {
    fn revision_id(&self) -> &str {
        &self.revision_id
    }
}
