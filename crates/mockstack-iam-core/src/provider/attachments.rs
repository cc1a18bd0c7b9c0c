//! Managed policy attachments to roles.
//!
//! AWS managed policies (`arn:aws:iam::aws:policy/...`) are not stored, but
//! may be attached: their name and path come from the ARN.

use mockstack_core::Arn;
use mockstack_iam_model::IamError;
use mockstack_iam_model::input::{ListAttachedRolePoliciesInput, RoleAttachmentInput};
use mockstack_iam_model::output::ListAttachedRolePoliciesOutput;
use mockstack_iam_model::types::AttachedPolicy;
use tracing::debug;

use super::{MockStackIam, page};
use crate::state::keys;
use crate::validate::path_matches;

/// `(path, name)` of a policy ARN's `policy/<path...>/<name>` resource.
fn split_policy_arn(policy_arn: &str) -> Option<(String, String)> {
    let arn: Arn = policy_arn.parse().ok()?;
    if arn.service != "iam" || arn.resource_type() != "policy" {
        return None;
    }
    let segments: Vec<&str> = arn.resource_segments().collect();
    let (name, dirs) = segments.get(1..)?.split_last()?;
    if name.is_empty() {
        return None;
    }
    let path = if dirs.is_empty() {
        "/".to_owned()
    } else {
        format!("/{}/", dirs.join("/"))
    };
    Some((path, (*name).to_owned()))
}

fn is_aws_managed(policy_arn: &str) -> bool {
    policy_arn.starts_with("arn:aws:iam::aws:policy/")
}

impl MockStackIam {
    /// Resolve an attachable policy to `(path, name)`.
    fn attachable(&self, policy_arn: &str) -> Result<(String, String), IamError> {
        if let Some(record) = self.state.policies.find(&keys::policy(policy_arn)) {
            return Ok((record.policy.path, record.policy.policy_name));
        }
        if is_aws_managed(policy_arn) {
            if let Some(parts) = split_policy_arn(policy_arn) {
                return Ok(parts);
            }
        }
        Err(IamError::policy_not_found(policy_arn))
    }

    fn adjust_attachment_count(&self, policy_arn: &str, delta: i32) {
        let _ = self.state.policies.update(&keys::policy(policy_arn), |record| {
            record.policy.attachment_count = (record.policy.attachment_count + delta).max(0);
        });
    }

    /// Attaching an already attached policy is a no-op.
    pub fn handle_attach_role_policy(&self, input: RoleAttachmentInput) -> Result<(), IamError> {
        self.require_role(&input.role_name)?;
        self.attachable(&input.policy_arn)?;

        let newly_attached = self
            .state
            .roles
            .update(&keys::role(&input.role_name), |record| {
                record.attached_policies.insert(input.policy_arn.clone())
            })
            .map_err(|_| IamError::role_not_found(&input.role_name))?;
        if newly_attached {
            self.adjust_attachment_count(&input.policy_arn, 1);
            debug!(role_name = %input.role_name, policy_arn = %input.policy_arn, "attached policy");
        }
        Ok(())
    }

    /// Handle `DetachRolePolicy`.
    pub fn handle_detach_role_policy(&self, input: RoleAttachmentInput) -> Result<(), IamError> {
        self.require_role(&input.role_name)?;
        let was_attached = self
            .state
            .roles
            .update(&keys::role(&input.role_name), |record| {
                record.attached_policies.remove(&input.policy_arn)
            })
            .map_err(|_| IamError::role_not_found(&input.role_name))?;
        if !was_attached {
            return Err(IamError::no_such_entity(format!(
                "Policy {} was not found.",
                input.policy_arn
            )));
        }
        self.adjust_attachment_count(&input.policy_arn, -1);
        debug!(role_name = %input.role_name, policy_arn = %input.policy_arn, "detached policy");
        Ok(())
    }

    /// Handle `ListAttachedRolePolicies`.
    pub fn handle_list_attached_role_policies(
        &self,
        input: ListAttachedRolePoliciesInput,
    ) -> Result<ListAttachedRolePoliciesOutput, IamError> {
        let role = self.require_role(&input.role_name)?;
        let attached: Vec<AttachedPolicy> = role
            .attached_policies
            .iter()
            .filter_map(|arn| {
                let (path, name) = self.attachable(arn).ok()?;
                path_matches(&path, input.path_prefix.as_deref()).then(|| AttachedPolicy {
                    policy_name: name,
                    policy_arn: arn.clone(),
                })
            })
            .collect();
        let page = page(attached, &input.paging)?;
        Ok(ListAttachedRolePoliciesOutput {
            attached_policies: page.items,
            marker: page.next_token,
        })
    }
}
