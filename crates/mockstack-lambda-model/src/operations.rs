//! Lambda operation enum.

use std::fmt;

use mockstack_core::AwsOperation;

/// Supported Lambda control-plane operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LambdaOperation {
    CreateFunction,
    GetFunction,
    GetFunctionConfiguration,
    DeleteFunction,
    ListFunctions,
    UpdateFunctionConfiguration,
    UpdateFunctionCode,
    AddPermission,
    RemovePermission,
    GetPolicy,
    TagResource,
    UntagResource,
    ListTags,
    PutFunctionConcurrency,
    GetFunctionConcurrency,
    DeleteFunctionConcurrency,
}

impl LambdaOperation {
    pub const ALL: &'static [Self] = &[
        Self::CreateFunction,
        Self::GetFunction,
        Self::GetFunctionConfiguration,
        Self::DeleteFunction,
        Self::ListFunctions,
        Self::UpdateFunctionConfiguration,
        Self::UpdateFunctionCode,
        Self::AddPermission,
        Self::RemovePermission,
        Self::GetPolicy,
        Self::TagResource,
        Self::UntagResource,
        Self::ListTags,
        Self::PutFunctionConcurrency,
        Self::GetFunctionConcurrency,
        Self::DeleteFunctionConcurrency,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateFunction => "CreateFunction",
            Self::GetFunction => "GetFunction",
            Self::GetFunctionConfiguration => "GetFunctionConfiguration",
            Self::DeleteFunction => "DeleteFunction",
            Self::ListFunctions => "ListFunctions",
            Self::UpdateFunctionConfiguration => "UpdateFunctionConfiguration",
            Self::UpdateFunctionCode => "UpdateFunctionCode",
            Self::AddPermission => "AddPermission",
            Self::RemovePermission => "RemovePermission",
            Self::GetPolicy => "GetPolicy",
            Self::TagResource => "TagResource",
            Self::UntagResource => "UntagResource",
            Self::ListTags => "ListTags",
            Self::PutFunctionConcurrency => "PutFunctionConcurrency",
            Self::GetFunctionConcurrency => "GetFunctionConcurrency",
            Self::DeleteFunctionConcurrency => "DeleteFunctionConcurrency",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }

    /// Top-level members that must be present and non-empty.
    #[must_use]
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::CreateFunction => &["FunctionName", "Role", "Code"],
            Self::AddPermission => &["FunctionName", "StatementId", "Action", "Principal"],
            Self::RemovePermission => &["FunctionName", "StatementId"],
            Self::PutFunctionConcurrency => &["FunctionName", "ReservedConcurrentExecutions"],
            Self::TagResource => &["Resource", "Tags"],
            Self::UntagResource => &["Resource", "TagKeys"],
            Self::ListTags => &["Resource"],
            Self::GetFunction
            | Self::GetFunctionConfiguration
            | Self::DeleteFunction
            | Self::UpdateFunctionConfiguration
            | Self::UpdateFunctionCode
            | Self::GetPolicy
            | Self::GetFunctionConcurrency
            | Self::DeleteFunctionConcurrency => &["FunctionName"],
            Self::ListFunctions => &[],
        }
    }
}

impl AwsOperation for LambdaOperation {
    fn from_name(name: &str) -> Option<Self> {
        Self::from_name(name)
    }

    fn as_str(&self) -> &'static str {
        Self::as_str(self)
    }

    fn required_fields(&self) -> &'static [&'static str] {
        Self::required_fields(self)
    }
}

impl fmt::Display for LambdaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_resolve_every_operation_name() {
        for op in LambdaOperation::ALL {
            assert_eq!(LambdaOperation::from_name(op.as_str()), Some(*op));
        }
        assert!(LambdaOperation::from_name("Invoke").is_none());
    }

    #[test]
    fn test_should_require_function_code_on_create() {
        assert_eq!(
            LambdaOperation::CreateFunction.required_fields(),
            &["FunctionName", "Role", "Code"]
        );
    }
}
