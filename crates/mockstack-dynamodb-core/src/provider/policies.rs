//! Resource-based policies on tables, indexes and streams.
//!
//! Writes are compare-and-swap on the policy's revision ID. A mismatched
//! `ExpectedRevisionId` (including one given when no policy exists) is a
//! `PolicyNotFoundException`, the same error a missing policy produces.

use mockstack_core::StoreError;
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::dynamodb_error;
use mockstack_dynamodb_model::input::{
    DeleteResourcePolicyInput, GetResourcePolicyInput, PutResourcePolicyInput,
};
use mockstack_dynamodb_model::output::{
    DeleteResourcePolicyOutput, GetResourcePolicyOutput, PutResourcePolicyOutput,
};
use tracing::info;

use super::MockStackDynamoDB;
use crate::state::{ResourcePolicyRecord, keys};
use crate::validate::{table_name_from_arn, validate_policy_document};

/// `ExpectedRevisionId` value meaning "create only if no policy exists".
const NO_POLICY: &str = "NO_POLICY";

impl MockStackDynamoDB {
    /// Handle `PutResourcePolicy`.
    pub fn handle_put_resource_policy(
        &self,
        input: PutResourcePolicyInput,
    ) -> Result<PutResourcePolicyOutput, DynamoDBError> {
        let table_name = table_name_from_arn(&input.resource_arn)?;
        self.require_table(&table_name)?;
        validate_policy_document(&input.policy)?;

        let key = keys::resource_policy(&input.resource_arn);
        let record = ResourcePolicyRecord {
            resource_arn: input.resource_arn.clone(),
            policy: input.policy,
            revision_id: self.state.revisions.next(),
        };
        let revision_id = record.revision_id.clone();

        match input.expected_revision_id.as_deref() {
            Some(NO_POLICY) => {
                self.state
                    .resource_policies
                    .insert_new(key, record)
                    .map_err(|_| {
                        dynamodb_error!(
                            PolicyNotFoundException,
                            format!(
                                "A policy already exists for the provided ResourceArn: {}",
                                input.resource_arn
                            )
                        )
                    })?;
            }
            expected => {
                self.state
                    .resource_policies
                    .put_if_revision(key, expected, record)
                    .map_err(|e| revision_error(&input.resource_arn, &e))?;
            }
        }

        info!(resource_arn = %input.resource_arn, %revision_id, "put resource policy");
        Ok(PutResourcePolicyOutput { revision_id })
    }

    /// Handle `GetResourcePolicy`.
    pub fn handle_get_resource_policy(
        &self,
        input: GetResourcePolicyInput,
    ) -> Result<GetResourcePolicyOutput, DynamoDBError> {
        table_name_from_arn(&input.resource_arn)?;
        let record = self
            .state
            .resource_policies
            .find(&keys::resource_policy(&input.resource_arn))
            .ok_or_else(|| policy_not_found(&input.resource_arn))?;
        Ok(GetResourcePolicyOutput {
            policy: record.policy,
            revision_id: record.revision_id,
        })
    }

    /// Handle `DeleteResourcePolicy`. Deleting an absent policy succeeds unless a
    /// revision is expected.
    pub fn handle_delete_resource_policy(
        &self,
        input: DeleteResourcePolicyInput,
    ) -> Result<DeleteResourcePolicyOutput, DynamoDBError> {
        table_name_from_arn(&input.resource_arn)?;
        let removed = self
            .state
            .resource_policies
            .delete_if_revision(
                &keys::resource_policy(&input.resource_arn),
                input.expected_revision_id.as_deref(),
            )
            .map_err(|e| revision_error(&input.resource_arn, &e))?;

        if removed.is_some() {
            info!(resource_arn = %input.resource_arn, "deleted resource policy");
        }
        Ok(DeleteResourcePolicyOutput {
            revision_id: removed.map(|r| r.revision_id),
        })
    }
}

fn policy_not_found(resource_arn: &str) -> DynamoDBError {
    dynamodb_error!(
        PolicyNotFoundException,
        format!("Resource-based policy not found for the provided ResourceArn: {resource_arn}")
    )
}

fn revision_error(resource_arn: &str, err: &StoreError) -> DynamoDBError {
    match err {
        StoreError::RevisionMismatch {
            expected,
            found: Some(found),
            ..
        } => dynamodb_error!(
            PolicyNotFoundException,
            format!(
                "Resource-based policy not found for the provided ResourceArn: the expected \
                 revision id {expected} does not match the current revision id {found}"
            )
        ),
        StoreError::RevisionMismatch { found: None, .. } | StoreError::NotFound(_) => {
            policy_not_found(resource_arn)
        }
        StoreError::AlreadyExists(_) => DynamoDBError::internal_error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use mockstack_dynamodb_model::DynamoDBErrorCode;

    use super::*;
    use crate::provider::test_util::provider_with_table;

    const ARN: &str = "arn:aws:dynamodb:us-east-1:000000000000:table/T";
    const POLICY: &str = r#"{"Version":"2012-10-17","Statement":[]}"#;

    fn put(
        p: &MockStackDynamoDB,
        expected: Option<&str>,
    ) -> Result<PutResourcePolicyOutput, DynamoDBError> {
        p.handle_put_resource_policy(PutResourcePolicyInput {
            resource_arn: ARN.to_owned(),
            policy: POLICY.to_owned(),
            expected_revision_id: expected.map(str::to_owned),
            confirm_remove_self_resource_access: None,
        })
    }

    #[test]
    fn test_should_put_and_get_policy() {
        let p = provider_with_table("T");
        let rev = put(&p, None).unwrap().revision_id;
        let got = p
            .handle_get_resource_policy(GetResourcePolicyInput {
                resource_arn: ARN.to_owned(),
            })
            .unwrap();
        assert_eq!(got.policy, POLICY);
        assert_eq!(got.revision_id, rev);
    }

    #[test]
    fn test_should_issue_fresh_revision_on_every_put() {
        let p = provider_with_table("T");
        let r1 = put(&p, None).unwrap().revision_id;
        let r2 = put(&p, Some(&r1)).unwrap().revision_id;
        assert_ne!(r1, r2);
    }

    #[test]
    fn test_should_reject_stale_revision_without_writing() {
        let p = provider_with_table("T");
        let r1 = put(&p, None).unwrap().revision_id;
        let r2 = put(&p, Some(&r1)).unwrap().revision_id;

        let err = put(&p, Some(&r1)).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::PolicyNotFoundException);
        let current = p
            .handle_get_resource_policy(GetResourcePolicyInput {
                resource_arn: ARN.to_owned(),
            })
            .unwrap();
        assert_eq!(current.revision_id, r2);
    }

    #[test]
    fn test_should_reject_expected_revision_when_no_policy() {
        let p = provider_with_table("T");
        let err = put(&p, Some("12345")).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::PolicyNotFoundException);
        put(&p, Some(NO_POLICY)).unwrap();
        assert!(put(&p, Some(NO_POLICY)).is_err());
    }

    #[test]
    fn test_should_require_existing_table() {
        let p = provider_with_table("Other");
        let err = put(&p, None).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_reject_invalid_policy_and_arn() {
        let p = provider_with_table("T");
        let err = p
            .handle_put_resource_policy(PutResourcePolicyInput {
                resource_arn: ARN.to_owned(),
                policy: "not json".to_owned(),
                ..PutResourcePolicyInput::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);

        let err = p
            .handle_get_resource_policy(GetResourcePolicyInput {
                resource_arn: "garbage".to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
    }

    #[test]
    fn test_should_reject_expected_revision_on_delete_without_policy() {
        let p = provider_with_table("T");
        let err = p
            .handle_delete_resource_policy(DeleteResourcePolicyInput {
                resource_arn: ARN.to_owned(),
                expected_revision_id: Some("fabricated".to_owned()),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::PolicyNotFoundException);
    }

    #[test]
    fn test_should_delete_policy_idempotently() {
        let p = provider_with_table("T");
        let rev = put(&p, None).unwrap().revision_id;
        let delete = |expected: Option<String>| {
            p.handle_delete_resource_policy(DeleteResourcePolicyInput {
                resource_arn: ARN.to_owned(),
                expected_revision_id: expected,
            })
        };
        assert!(delete(Some("stale".to_owned())).is_err());
        let out = delete(Some(rev.clone())).unwrap();
        assert_eq!(out.revision_id, Some(rev));
        let again = delete(None).unwrap();
        assert!(again.revision_id.is_none());

        let err = p
            .handle_get_resource_policy(GetResourcePolicyInput {
                resource_arn: ARN.to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::PolicyNotFoundException);
    }
}
