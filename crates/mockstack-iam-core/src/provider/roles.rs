//! Role lifecycle.

use std::collections::BTreeSet;

use chrono::Utc;
use mockstack_core::{StoreError, TagSet, ids};
use mockstack_iam_model::IamError;
use mockstack_iam_model::input::{
    CreateRoleInput, ListRolesInput, RoleNameInput, UpdateAssumeRolePolicyInput, UpdateRoleInput,
};
use mockstack_iam_model::output::{ListRolesOutput, RoleOutput, UpdateRoleOutput};
use mockstack_iam_model::types::Role;
use tracing::info;

use super::{MockStackIam, page};
use crate::state::{RoleRecord, keys};
use crate::validate::{
    MAX_TAGS, path_matches, resolve_path, validate_description, validate_max_session_duration,
    validate_policy_document, validate_role_name,
};

const DEFAULT_MAX_SESSION_DURATION: i32 = 3600;

impl MockStackIam {
    /// Handle `CreateRole`.
    pub fn handle_create_role(&self, input: CreateRoleInput) -> Result<RoleOutput, IamError> {
        validate_role_name(&input.role_name)?;
        let path = resolve_path(input.path)?;
        validate_policy_document(&input.assume_role_policy_document)?;
        validate_description(input.description.as_deref())?;
        let max_session_duration = input
            .max_session_duration
            .unwrap_or(DEFAULT_MAX_SESSION_DURATION);
        validate_max_session_duration(max_session_duration)?;
        if input.tags.len() > MAX_TAGS {
            return Err(IamError::limit_exceeded(format!(
                "The number of tags has reached the maximum limit of {MAX_TAGS}."
            )));
        }

        let record = RoleRecord {
            role: Role {
                arn: self.entity_arn("role", &path, &input.role_name),
                path,
                role_name: input.role_name.clone(),
                role_id: ids::aws_unique_id("AROA"),
                create_date: Utc::now(),
                assume_role_policy_document: input.assume_role_policy_document,
                description: input.description,
                max_session_duration,
                tags: Vec::new(),
            },
            tags: input.tags.into_iter().map(|t| (t.key, t.value)).collect::<TagSet>(),
            attached_policies: BTreeSet::new(),
        };

        self.state
            .roles
            .insert_new(keys::role(&input.role_name), record.clone())
            .map_err(|_| {
                IamError::already_exists(format!(
                    "Role with name {} already exists.",
                    input.role_name
                ))
            })?;

        info!(role_name = %input.role_name, arn = %record.role.arn, "created role");
        Ok(RoleOutput {
            role: record.describe(),
        })
    }

    /// Handle `GetRole`.
    pub fn handle_get_role(&self, input: RoleNameInput) -> Result<RoleOutput, IamError> {
        let record = self.require_role(&input.role_name)?;
        Ok(RoleOutput {
            role: record.describe(),
        })
    }

    /// A role can only be deleted once its inline policies are removed and
    /// its managed policies detached.
    pub fn handle_delete_role(&self, input: RoleNameInput) -> Result<(), IamError> {
        let record = self.require_role(&input.role_name)?;
        if !self
            .state
            .role_policies
            .list(&keys::role_policies(&input.role_name))
            .is_empty()
        {
            return Err(IamError::delete_conflict(
                "Cannot delete entity, must delete policies first.",
            ));
        }
        if !record.attached_policies.is_empty() {
            return Err(IamError::delete_conflict(
                "Cannot delete entity, must detach all policies first.",
            ));
        }
        self.state.roles.delete(&keys::role(&input.role_name));
        info!(role_name = %input.role_name, "deleted role");
        Ok(())
    }

    /// Handle `ListRoles`.
    pub fn handle_list_roles(&self, input: ListRolesInput) -> Result<ListRolesOutput, IamError> {
        let roles: Vec<Role> = self
            .state
            .roles
            .list_values(keys::ROLE_PREFIX)
            .iter()
            .filter(|r| path_matches(&r.role.path, input.path_prefix.as_deref()))
            .map(RoleRecord::describe)
            .collect();
        let page = page(roles, &input.paging)?;
        Ok(ListRolesOutput {
            roles: page.items,
            marker: page.next_token,
        })
    }

    /// Handle `UpdateRole`.
    pub fn handle_update_role(&self, input: UpdateRoleInput) -> Result<UpdateRoleOutput, IamError> {
        validate_description(input.description.as_deref())?;
        if let Some(seconds) = input.max_session_duration {
            validate_max_session_duration(seconds)?;
        }
        self.state
            .roles
            .update(&keys::role(&input.role_name), |record| {
                if let Some(description) = input.description {
                    record.role.description = Some(description);
                }
                if let Some(seconds) = input.max_session_duration {
                    record.role.max_session_duration = seconds;
                }
            })
            .map_err(|_| IamError::role_not_found(&input.role_name))?;
        Ok(UpdateRoleOutput)
    }

    /// Handle `UpdateAssumeRolePolicy`.
    pub fn handle_update_assume_role_policy(
        &self,
        input: UpdateAssumeRolePolicyInput,
    ) -> Result<(), IamError> {
        validate_policy_document(&input.policy_document)?;
        self.state
            .roles
            .update(&keys::role(&input.role_name), |record| {
                record.role.assume_role_policy_document = input.policy_document;
            })
            .map_err(|e| match e {
                StoreError::NotFound(_) => IamError::role_not_found(&input.role_name),
                other => IamError::from(other),
            })
    }
}
