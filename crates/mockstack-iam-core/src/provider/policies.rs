//! Customer managed policies and their versions.

use chrono::Utc;
use mockstack_core::{TagSet, ids};
use mockstack_iam_model::IamError;
use mockstack_iam_model::input::{
    CreatePolicyInput, CreatePolicyVersionInput, ListPoliciesInput, ListPolicyVersionsInput,
    PolicyArnInput, PolicyScope, PolicyVersionInput,
};
use mockstack_iam_model::output::{
    ListPoliciesOutput, ListPolicyVersionsOutput, PolicyOutput, PolicyVersionOutput,
};
use mockstack_iam_model::types::{Policy, PolicyVersion};
use tracing::info;

use super::{MockStackIam, page};
use crate::state::{ManagedPolicyRecord, StoredVersion, keys};
use crate::validate::{
    MAX_POLICY_VERSIONS, MAX_TAGS, path_matches, resolve_path, validate_description,
    validate_policy_document, validate_policy_name,
};

fn version_not_found(policy_arn: &str, version_id: &str) -> IamError {
    IamError::no_such_entity(format!(
        "Policy {policy_arn} version {version_id} does not exist or is not attachable."
    ))
}

impl MockStackIam {
    /// Run `f` against a stored policy, committing only on success.
    fn modify_policy<R>(
        &self,
        policy_arn: &str,
        f: impl FnOnce(&mut ManagedPolicyRecord) -> Result<R, IamError>,
    ) -> Result<R, IamError> {
        self.require_policy(policy_arn)?;
        self.state.policies.try_update(&keys::policy(policy_arn), f)
    }

    /// Handle `CreatePolicy`.
    pub fn handle_create_policy(&self, input: CreatePolicyInput) -> Result<PolicyOutput, IamError> {
        validate_policy_name(&input.policy_name)?;
        let path = resolve_path(input.path)?;
        validate_policy_document(&input.policy_document)?;
        validate_description(input.description.as_deref())?;
        if input.tags.len() > MAX_TAGS {
            return Err(IamError::limit_exceeded(format!(
                "The number of tags has reached the maximum limit of {MAX_TAGS}."
            )));
        }

        let now = Utc::now();
        let arn = self.entity_arn("policy", &path, &input.policy_name);
        let record = ManagedPolicyRecord {
            policy: Policy {
                policy_name: input.policy_name.clone(),
                policy_id: ids::aws_unique_id("ANPA"),
                arn: arn.clone(),
                path,
                default_version_id: "v1".to_owned(),
                attachment_count: 0,
                description: input.description,
                create_date: now,
                update_date: now,
                tags: Vec::new(),
            },
            tags: input.tags.into_iter().map(|t| (t.key, t.value)).collect::<TagSet>(),
            versions: vec![StoredVersion {
                version_id: "v1".to_owned(),
                document: input.policy_document,
                create_date: now,
            }],
            next_version: 2,
        };

        self.state
            .policies
            .insert_new(keys::policy(&arn), record.clone())
            .map_err(|_| {
                IamError::already_exists(format!(
                    "A policy called {} already exists. Duplicate names are not allowed.",
                    input.policy_name
                ))
            })?;

        info!(policy_arn = %arn, "created managed policy");
        Ok(PolicyOutput {
            policy: record.describe(),
        })
    }

    /// Handle `GetPolicy`.
    pub fn handle_get_policy(&self, input: PolicyArnInput) -> Result<PolicyOutput, IamError> {
        let record = self.require_policy(&input.policy_arn)?;
        Ok(PolicyOutput {
            policy: record.describe(),
        })
    }

    /// Attached policies and policies with non-default versions cannot be deleted.
    pub fn handle_delete_policy(&self, input: PolicyArnInput) -> Result<(), IamError> {
        let record = self.require_policy(&input.policy_arn)?;
        if record.policy.attachment_count > 0 {
            return Err(IamError::delete_conflict(
                "Cannot delete a policy attached to entities.",
            ));
        }
        if record.versions.len() > 1 {
            return Err(IamError::delete_conflict(
                "This policy has more than one version. Before you delete a policy, you must \
                 delete the policy's versions. The default version is deleted with the policy.",
            ));
        }
        self.state.policies.delete(&keys::policy(&input.policy_arn));
        info!(policy_arn = %input.policy_arn, "deleted managed policy");
        Ok(())
    }

    /// Only customer managed policies are stored, so `Scope=AWS` is always empty.
    pub fn handle_list_policies(
        &self,
        input: ListPoliciesInput,
    ) -> Result<ListPoliciesOutput, IamError> {
        let policies: Vec<Policy> = match input.scope {
            PolicyScope::Aws => Vec::new(),
            PolicyScope::All | PolicyScope::Local => self
                .state
                .policies
                .list_values(keys::POLICY_PREFIX)
                .iter()
                .filter(|r| !input.only_attached || r.policy.attachment_count > 0)
                .filter(|r| path_matches(&r.policy.path, input.path_prefix.as_deref()))
                .map(ManagedPolicyRecord::describe)
                .collect(),
        };
        let page = page(policies, &input.paging)?;
        Ok(ListPoliciesOutput {
            policies: page.items,
            marker: page.next_token,
        })
    }

    /// Handle `CreatePolicyVersion`.
    pub fn handle_create_policy_version(
        &self,
        input: CreatePolicyVersionInput,
    ) -> Result<PolicyVersionOutput, IamError> {
        validate_policy_document(&input.policy_document)?;
        let policy_arn = input.policy_arn.clone();
        self.modify_policy(&policy_arn, |record| {
            if record.versions.len() >= MAX_POLICY_VERSIONS {
                return Err(IamError::limit_exceeded(format!(
                    "A managed policy can have up to {MAX_POLICY_VERSIONS} versions. Before you \
                     create a new version, you must delete an existing version."
                )));
            }
            let now = Utc::now();
            let version = StoredVersion {
                version_id: format!("v{}", record.next_version),
                document: input.policy_document,
                create_date: now,
            };
            record.next_version += 1;
            if input.set_as_default {
                record.policy.default_version_id.clone_from(&version.version_id);
            }
            record.policy.update_date = now;
            let view = record.version_view(&version, true);
            record.versions.push(version);
            Ok(PolicyVersionOutput {
                policy_version: view,
            })
        })
    }

    /// Handle `GetPolicyVersion`.
    pub fn handle_get_policy_version(
        &self,
        input: PolicyVersionInput,
    ) -> Result<PolicyVersionOutput, IamError> {
        let record = self.require_policy(&input.policy_arn)?;
        let version = record
            .find_version(&input.version_id)
            .ok_or_else(|| version_not_found(&input.policy_arn, &input.version_id))?;
        Ok(PolicyVersionOutput {
            policy_version: record.version_view(version, true),
        })
    }

    /// Handle `ListPolicyVersions`.
    pub fn handle_list_policy_versions(
        &self,
        input: ListPolicyVersionsInput,
    ) -> Result<ListPolicyVersionsOutput, IamError> {
        let record = self.require_policy(&input.policy_arn)?;
        let versions: Vec<PolicyVersion> = record
            .versions
            .iter()
            .map(|v| record.version_view(v, false))
            .collect();
        let page = page(versions, &input.paging)?;
        Ok(ListPolicyVersionsOutput {
            versions: page.items,
            marker: page.next_token,
        })
    }

    /// Handle `DeletePolicyVersion`.
    pub fn handle_delete_policy_version(&self, input: PolicyVersionInput) -> Result<(), IamError> {
        self.modify_policy(&input.policy_arn, |record| {
            if record.find_version(&input.version_id).is_none() {
                return Err(version_not_found(&input.policy_arn, &input.version_id));
            }
            if record.policy.default_version_id == input.version_id {
                return Err(IamError::delete_conflict(
                    "Cannot delete the default version of a policy.",
                ));
            }
            record.versions.retain(|v| v.version_id != input.version_id);
            Ok(())
        })
    }

    /// Handle `SetDefaultPolicyVersion`.
    pub fn handle_set_default_policy_version(
        &self,
        input: PolicyVersionInput,
    ) -> Result<(), IamError> {
        self.modify_policy(&input.policy_arn, |record| {
            if record.find_version(&input.version_id).is_none() {
                return Err(version_not_found(&input.policy_arn, &input.version_id));
            }
            record.policy.default_version_id = input.version_id;
            record.policy.update_date = Utc::now();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use mockstack_iam_model::IamErrorCode;
    use mockstack_iam_model::input::{Paging, RoleAttachmentInput};

    use super::*;
    use crate::provider::test_util::*;

    const ARN: &str = "arn:aws:iam::000000000000:policy/reader";

    fn with_policy() -> MockStackIam {
        let p = provider();
        p.handle_create_policy(CreatePolicyInput {
            policy_name: "reader".to_owned(),
            policy_document: POLICY_DOCUMENT.to_owned(),
            ..CreatePolicyInput::default()
        })
        .unwrap();
        p
    }

    fn new_version(p: &MockStackIam, set_as_default: bool) -> Result<PolicyVersionOutput, IamError> {
        p.handle_create_policy_version(CreatePolicyVersionInput {
            policy_arn: ARN.to_owned(),
            policy_document: POLICY_DOCUMENT.to_owned(),
            set_as_default,
        })
    }

    fn version(id: &str) -> PolicyVersionInput {
        PolicyVersionInput {
            policy_arn: ARN.to_owned(),
            version_id: id.to_owned(),
        }
    }

    fn arn_input() -> PolicyArnInput {
        PolicyArnInput {
            policy_arn: ARN.to_owned(),
        }
    }

    #[test]
    fn test_should_create_policy_at_v1() {
        let p = with_policy();
        let policy = p.handle_get_policy(arn_input()).unwrap().policy;
        assert_eq!(policy.arn, ARN);
        assert_eq!(policy.default_version_id, "v1");
        assert!(policy.policy_id.starts_with("ANPA"));
        assert_eq!(policy.attachment_count, 0);
    }

    #[test]
    fn test_should_reject_duplicate_policy_name() {
        let p = with_policy();
        let err = p
            .handle_create_policy(CreatePolicyInput {
                policy_name: "reader".to_owned(),
                policy_document: POLICY_DOCUMENT.to_owned(),
                ..CreatePolicyInput::default()
            })
            .unwrap_err();
        assert_eq!(err.code, IamErrorCode::EntityAlreadyExists);
    }

    #[test]
    fn test_should_report_unknown_policy_arn() {
        let p = provider();
        let err = p.handle_get_policy(arn_input()).unwrap_err();
        assert_eq!(err.code, IamErrorCode::NoSuchEntity);
        assert!(err.message.contains(ARN));
    }

    #[test]
    fn test_should_number_versions_and_switch_default() {
        let p = with_policy();
        let v2 = new_version(&p, false).unwrap().policy_version;
        assert_eq!(v2.version_id, "v2");
        assert!(!v2.is_default_version);

        let v3 = new_version(&p, true).unwrap().policy_version;
        assert!(v3.is_default_version);
        assert_eq!(
            p.handle_get_policy(arn_input()).unwrap().policy.default_version_id,
            "v3"
        );

        p.handle_set_default_policy_version(version("v1")).unwrap();
        let listed = p
            .handle_list_policy_versions(ListPolicyVersionsInput {
                policy_arn: ARN.to_owned(),
                paging: Paging::default(),
            })
            .unwrap();
        assert_eq!(listed.versions.len(), 3);
        assert!(listed.versions[0].is_default_version);
        assert!(listed.versions.iter().all(|v| v.document.is_none()));
    }

    #[test]
    fn test_should_cap_versions_at_five() {
        let p = with_policy();
        for _ in 0..4 {
            new_version(&p, false).unwrap();
        }
        let err = new_version(&p, false).unwrap_err();
        assert_eq!(err.code, IamErrorCode::LimitExceeded);

        p.handle_delete_policy_version(version("v2")).unwrap();
        let next = new_version(&p, false).unwrap().policy_version;
        assert_eq!(next.version_id, "v6");
    }

    #[test]
    fn test_should_protect_default_version() {
        let p = with_policy();
        let err = p.handle_delete_policy_version(version("v1")).unwrap_err();
        assert_eq!(err.code, IamErrorCode::DeleteConflict);

        let err = p.handle_get_policy_version(version("v9")).unwrap_err();
        assert_eq!(err.code, IamErrorCode::NoSuchEntity);
    }

    #[test]
    fn test_should_return_document_for_single_version() {
        let p = with_policy();
        let out = p.handle_get_policy_version(version("v1")).unwrap();
        assert_eq!(out.policy_version.document.as_deref(), Some(POLICY_DOCUMENT));
    }

    #[test]
    fn test_should_block_deleting_attached_or_versioned_policy() {
        let p = with_policy();
        p.handle_create_role(create_role_input("app")).unwrap();
        let attachment = RoleAttachmentInput {
            role_name: "app".to_owned(),
            policy_arn: ARN.to_owned(),
        };
        p.handle_attach_role_policy(attachment.clone()).unwrap();
        let err = p.handle_delete_policy(arn_input()).unwrap_err();
        assert_eq!(err.code, IamErrorCode::DeleteConflict);

        p.handle_detach_role_policy(attachment).unwrap();
        new_version(&p, false).unwrap();
        let err = p.handle_delete_policy(arn_input()).unwrap_err();
        assert!(err.message.contains("more than one version"));

        p.handle_delete_policy_version(version("v2")).unwrap();
        p.handle_delete_policy(arn_input()).unwrap();
        assert!(p.handle_get_policy(arn_input()).is_err());
    }

    #[test]
    fn test_should_filter_policy_listing() {
        let p = with_policy();
        let local = p
            .handle_list_policies(ListPoliciesInput {
                scope: PolicyScope::Local,
                ..ListPoliciesInput::default()
            })
            .unwrap();
        assert_eq!(local.policies.len(), 1);

        let aws = p
            .handle_list_policies(ListPoliciesInput {
                scope: PolicyScope::Aws,
                ..ListPoliciesInput::default()
            })
            .unwrap();
        assert!(aws.policies.is_empty());

        let attached = p
            .handle_list_policies(ListPoliciesInput {
                only_attached: true,
                ..ListPoliciesInput::default()
            })
            .unwrap();
        assert!(attached.policies.is_empty());
    }
}
