//! Inline policies embedded in roles.

use mockstack_iam_model::IamError;
use mockstack_iam_model::input::{ListForRoleInput, PutRolePolicyInput, RolePolicyInput};
use mockstack_iam_model::output::{GetRolePolicyOutput, ListRolePoliciesOutput};
use tracing::debug;

use super::{MockStackIam, page};
use crate::state::{InlinePolicyRecord, keys};
use crate::validate::{validate_policy_document, validate_policy_name};

impl MockStackIam {
    /// Create or replace an inline policy.
    pub fn handle_put_role_policy(&self, input: PutRolePolicyInput) -> Result<(), IamError> {
        validate_policy_name(&input.policy_name)?;
        validate_policy_document(&input.policy_document)?;
        self.require_role(&input.role_name)?;

        let key = keys::role_policy(&input.role_name, &input.policy_name);
        debug!(role_name = %input.role_name, policy_name = %input.policy_name, "put role policy");
        self.state.role_policies.set(
            key,
            InlinePolicyRecord {
                role_name: input.role_name,
                policy_name: input.policy_name,
                document: input.policy_document,
            },
        );
        Ok(())
    }

    /// Handle `GetRolePolicy`.
    pub fn handle_get_role_policy(
        &self,
        input: RolePolicyInput,
    ) -> Result<GetRolePolicyOutput, IamError> {
        self.require_role(&input.role_name)?;
        let record = self
            .state
            .role_policies
            .find(&keys::role_policy(&input.role_name, &input.policy_name))
            .ok_or_else(|| {
                IamError::no_such_entity(format!(
                    "The role policy with name {} cannot be found.",
                    input.policy_name
                ))
            })?;
        Ok(GetRolePolicyOutput {
            role_name: record.role_name,
            policy_name: record.policy_name,
            policy_document: record.document,
        })
    }

    /// Deleting an inline policy the role does not have succeeds.
    pub fn handle_delete_role_policy(&self, input: RolePolicyInput) -> Result<(), IamError> {
        self.require_role(&input.role_name)?;
        self.state
            .role_policies
            .delete(&keys::role_policy(&input.role_name, &input.policy_name));
        Ok(())
    }

    /// Handle `ListRolePolicies`.
    pub fn handle_list_role_policies(
        &self,
        input: ListForRoleInput,
    ) -> Result<ListRolePoliciesOutput, IamError> {
        self.require_role(&input.role_name)?;
        let names: Vec<String> = self
            .state
            .role_policies
            .list_values(&keys::role_policies(&input.role_name))
            .into_iter()
            .map(|r| r.policy_name)
            .collect();
        let page = page(names, &input.paging)?;
        Ok(ListRolePoliciesOutput {
            policy_names: page.items,
            marker: page.next_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use mockstack_iam_model::IamErrorCode;
    use mockstack_iam_model::input::Paging;

    use super::*;
    use crate::provider::test_util::*;

    fn put(p: &MockStackIam, role: &str, name: &str) {
        p.handle_put_role_policy(PutRolePolicyInput {
            role_name: role.to_owned(),
            policy_name: name.to_owned(),
            policy_document: POLICY_DOCUMENT.to_owned(),
        })
        .unwrap();
    }

    fn target(role: &str, name: &str) -> RolePolicyInput {
        RolePolicyInput {
            role_name: role.to_owned(),
            policy_name: name.to_owned(),
        }
    }

    #[test]
    fn test_should_put_and_get_inline_policy() {
        let p = provider_with_role("app");
        put(&p, "app", "read");
        let out = p.handle_get_role_policy(target("app", "read")).unwrap();
        assert_eq!(out.policy_document, POLICY_DOCUMENT);
        assert_eq!(out.role_name, "app");
    }

    #[test]
    fn test_should_require_existing_role_for_put() {
        let p = provider();
        let err = p
            .handle_put_role_policy(PutRolePolicyInput {
                role_name: "ghost".to_owned(),
                policy_name: "read".to_owned(),
                policy_document: POLICY_DOCUMENT.to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, IamErrorCode::NoSuchEntity);
    }

    #[test]
    fn test_should_report_missing_inline_policy() {
        let p = provider_with_role("app");
        let err = p.handle_get_role_policy(target("app", "nope")).unwrap_err();
        assert_eq!(err.message, "The role policy with name nope cannot be found.");
    }

    #[test]
    fn test_should_delete_idempotently() {
        let p = provider_with_role("app");
        put(&p, "app", "read");
        p.handle_delete_role_policy(target("app", "read")).unwrap();
        p.handle_delete_role_policy(target("app", "read")).unwrap();
        assert!(p.handle_get_role_policy(target("app", "read")).is_err());
    }

    #[test]
    fn test_should_list_inline_policy_names_in_order() {
        let p = provider_with_role("app");
        put(&p, "app", "write");
        put(&p, "app", "read");
        let out = p
            .handle_list_role_policies(ListForRoleInput {
                role_name: "app".to_owned(),
                paging: Paging {
                    marker: None,
                    max_items: Some(1),
                },
            })
            .unwrap();
        assert_eq!(out.policy_names, vec!["read".to_owned()]);
        assert_eq!(out.marker.as_deref(), Some("1"));
    }
}
