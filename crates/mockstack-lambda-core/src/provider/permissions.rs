//! AddPermission, RemovePermission, GetPolicy.

use mockstack_core::ids;
use mockstack_lambda_model::input::{AddPermissionInput, GetPolicyInput, RemovePermissionInput};
use mockstack_lambda_model::output::{AddPermissionOutput, EmptyOutput, GetPolicyOutput};
use mockstack_lambda_model::{LambdaError, LambdaErrorCode};
use serde_json::{Map, Value, json};
use tracing::info;

use super::MockStackLambda;
use crate::state::{PolicyRecord, PolicyStatement, keys};
use crate::validate::{validate_permission_action, validate_statement_id};

fn internal(err: &serde_json::Error) -> LambdaError {
    LambdaError::with_message(LambdaErrorCode::ServiceException, err.to_string())
}

/// `*`, a service principal, an account ID or an ARN.
fn principal_value(principal: &str) -> Value {
    if principal == "*" {
        Value::String(principal.to_owned())
    } else if principal.ends_with(".amazonaws.com") {
        json!({ "Service": principal })
    } else if principal.len() == 12 && principal.bytes().all(|b| b.is_ascii_digit()) {
        json!({ "AWS": format!("arn:aws:iam::{principal}:root") })
    } else {
        json!({ "AWS": principal })
    }
}

fn conditions(input: &AddPermissionInput) -> Map<String, Value> {
    let mut string_equals = Map::new();
    if let Some(account) = &input.source_account {
        string_equals.insert("AWS:SourceAccount".to_owned(), json!(account));
    }
    if let Some(org) = &input.principal_org_id {
        string_equals.insert("aws:PrincipalOrgID".to_owned(), json!(org));
    }
    if let Some(token) = &input.event_source_token {
        string_equals.insert("lambda:EventSourceToken".to_owned(), json!(token));
    }

    let mut condition = Map::new();
    if !string_equals.is_empty() {
        condition.insert("StringEquals".to_owned(), Value::Object(string_equals));
    }
    if let Some(arn) = &input.source_arn {
        condition.insert("ArnLike".to_owned(), json!({ "AWS:SourceArn": arn }));
    }
    condition
}

fn check_revision(expected: Option<&str>, current: Option<&PolicyRecord>) -> Result<(), LambdaError> {
    match expected {
        Some(rev) if current.is_none_or(|p| p.revision_id != rev) => {
            Err(LambdaError::precondition_failed())
        }
        _ => Ok(()),
    }
}

impl MockStackLambda {
    /// Handle `AddPermission`.
    pub fn handle_add_permission(
        &self,
        input: AddPermissionInput,
    ) -> Result<AddPermissionOutput, LambdaError> {
        let name = self.resolve(&input.function_name, input.qualifier.as_deref())?;
        validate_statement_id(&input.statement_id)?;
        validate_permission_action(&input.action)?;
        let function = self.require_function(&name)?;

        let key = keys::policy(&name);
        let current = self.state.policies.find(&key);
        check_revision(input.revision_id.as_deref(), current.as_ref())?;
        if current
            .as_ref()
            .is_some_and(|p| p.has_statement(&input.statement_id))
        {
            return Err(LambdaError::conflict(format!(
                "The statement id ({}) provided already exists. Please provide a new statement \
                 id, or remove the existing statement.",
                input.statement_id
            )));
        }

        let statement = PolicyStatement {
            sid: input.statement_id.clone(),
            effect: "Allow",
            principal: principal_value(&input.principal),
            action: input.action.clone(),
            resource: function.arn().to_owned(),
            condition: conditions(&input),
        };
        let rendered = serde_json::to_string(&statement).map_err(|e| internal(&e))?;

        let expected = current.as_ref().map(|p| p.revision_id.clone());
        let mut statements = current.map(|p| p.statements).unwrap_or_default();
        statements.push(statement);
        let record = PolicyRecord {
            statements,
            revision_id: ids::request_id(),
        };
        match expected {
            Some(expected) => {
                self.state
                    .policies
                    .put_if_revision(key, Some(&expected), record)?;
            }
            None => self
                .state
                .policies
                .insert_new(key, record)
                .map_err(|_| LambdaError::precondition_failed())?,
        }
        info!(function_name = %name, statement_id = %input.statement_id, "added permission");
        Ok(AddPermissionOutput {
            statement: rendered,
        })
    }

    /// Handle `RemovePermission`. The policy is dropped with its last statement.
    pub fn handle_remove_permission(
        &self,
        input: RemovePermissionInput,
    ) -> Result<EmptyOutput, LambdaError> {
        let name = self.resolve(&input.function_name, input.qualifier.as_deref())?;
        self.require_function(&name)?;

        let key = keys::policy(&name);
        let current = self.state.policies.find(&key).ok_or_else(|| {
            LambdaError::resource_not_found("No policy is associated with the given resource.")
        })?;
        check_revision(input.revision_id.as_deref(), Some(&current))?;
        if !current.has_statement(&input.statement_id) {
            return Err(LambdaError::resource_not_found(format!(
                "Statement {} is not found in resource policy.",
                input.statement_id
            )));
        }

        let statements: Vec<PolicyStatement> = current
            .statements
            .iter()
            .filter(|s| s.sid != input.statement_id)
            .cloned()
            .collect();
        if statements.is_empty() {
            self.state
                .policies
                .delete_if_revision(&key, Some(&current.revision_id))?;
        } else {
            let record = PolicyRecord {
                statements,
                revision_id: ids::request_id(),
            };
            self.state
                .policies
                .put_if_revision(key, Some(&current.revision_id), record)?;
        }
        info!(function_name = %name, statement_id = %input.statement_id, "removed permission");
        Ok(EmptyOutput {})
    }

    /// Handle `GetPolicy`.
    pub fn handle_get_policy(&self, input: GetPolicyInput) -> Result<GetPolicyOutput, LambdaError> {
        let name = self.resolve(&input.function_name, input.qualifier.as_deref())?;
        self.require_function(&name)?;
        let policy = self
            .state
            .policies
            .find(&keys::policy(&name))
            .ok_or_else(|| {
                LambdaError::resource_not_found("The resource you requested does not exist.")
            })?;
        Ok(GetPolicyOutput {
            policy: policy.document().map_err(|e| internal(&e))?,
            revision_id: policy.revision_id,
        })
    }
}
