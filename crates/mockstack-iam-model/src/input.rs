//! IAM operation inputs decoded from awsQuery parameters.

use mockstack_core::{FromQueryParams, ParamError, QueryParams};

use crate::types::Tag;

fn tags(params: &QueryParams) -> Vec<Tag> {
    params
        .tags("Tags")
        .into_iter()
        .map(|(key, value)| Tag { key, value })
        .collect()
}

fn required(params: &QueryParams, name: &str) -> Result<String, ParamError> {
    params.required(name).map(str::to_owned)
}

/// `Marker` / `MaxItems` shared by every list action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub marker: Option<String>,
    pub max_items: Option<i32>,
}

impl FromQueryParams for Paging {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            marker: params.optional("Marker"),
            max_items: params.optional_i32("MaxItems")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRoleInput {
    pub role_name: String,
    pub assume_role_policy_document: String,
    pub path: Option<String>,
    pub description: Option<String>,
    pub max_session_duration: Option<i32>,
    pub tags: Vec<Tag>,
}

impl FromQueryParams for CreateRoleInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            assume_role_policy_document: required(params, "AssumeRolePolicyDocument")?,
            path: params.optional("Path"),
            description: params.optional("Description"),
            max_session_duration: params.optional_i32("MaxSessionDuration")?,
            tags: tags(params),
        })
    }
}

/// Actions addressing a single role by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleNameInput {
    pub role_name: String,
}

impl FromQueryParams for RoleNameInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRolesInput {
    pub path_prefix: Option<String>,
    pub paging: Paging,
}

impl FromQueryParams for ListRolesInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            path_prefix: params.optional("PathPrefix"),
            paging: Paging::from_query_params(params)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    pub role_name: String,
    pub description: Option<String>,
    pub max_session_duration: Option<i32>,
}

impl FromQueryParams for UpdateRoleInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            description: params.optional("Description"),
            max_session_duration: params.optional_i32("MaxSessionDuration")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAssumeRolePolicyInput {
    pub role_name: String,
    pub policy_document: String,
}

impl FromQueryParams for UpdateAssumeRolePolicyInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            policy_document: required(params, "PolicyDocument")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Inline role policies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRolePolicyInput {
    pub role_name: String,
    pub policy_name: String,
    pub policy_document: String,
}

impl FromQueryParams for PutRolePolicyInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            policy_name: required(params, "PolicyName")?,
            policy_document: required(params, "PolicyDocument")?,
        })
    }
}

/// `GetRolePolicy` / `DeleteRolePolicy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePolicyInput {
    pub role_name: String,
    pub policy_name: String,
}

impl FromQueryParams for RolePolicyInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            policy_name: required(params, "PolicyName")?,
        })
    }
}

/// `ListRolePolicies` / `ListRoleTags`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListForRoleInput {
    pub role_name: String,
    pub paging: Paging,
}

impl FromQueryParams for ListForRoleInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            paging: Paging::from_query_params(params)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Managed policies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePolicyInput {
    pub policy_name: String,
    pub policy_document: String,
    pub path: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<Tag>,
}

impl FromQueryParams for CreatePolicyInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            policy_name: required(params, "PolicyName")?,
            policy_document: required(params, "PolicyDocument")?,
            path: params.optional("Path"),
            description: params.optional("Description"),
            tags: tags(params),
        })
    }
}

/// `GetPolicy` / `DeletePolicy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyArnInput {
    pub policy_arn: String,
}

impl FromQueryParams for PolicyArnInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            policy_arn: required(params, "PolicyArn")?,
        })
    }
}

/// `Scope` filter of `ListPolicies`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyScope {
    #[default]
    All,
    Aws,
    Local,
}

impl std::str::FromStr for PolicyScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Self::All),
            "AWS" => Ok(Self::Aws),
            "Local" => Ok(Self::Local),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPoliciesInput {
    pub scope: PolicyScope,
    pub only_attached: bool,
    pub path_prefix: Option<String>,
    pub paging: Paging,
}

impl FromQueryParams for ListPoliciesInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        let scope = match params.get("Scope") {
            None => PolicyScope::All,
            Some(raw) => raw.parse().map_err(|()| ParamError::Invalid {
                name: "Scope".to_owned(),
                value: raw.to_owned(),
            })?,
        };
        Ok(Self {
            scope,
            only_attached: params.optional_bool("OnlyAttached")?.unwrap_or(false),
            path_prefix: params.optional("PathPrefix"),
            paging: Paging::from_query_params(params)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePolicyVersionInput {
    pub policy_arn: String,
    pub policy_document: String,
    pub set_as_default: bool,
}

impl FromQueryParams for CreatePolicyVersionInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            policy_arn: required(params, "PolicyArn")?,
            policy_document: required(params, "PolicyDocument")?,
            set_as_default: params.optional_bool("SetAsDefault")?.unwrap_or(false),
        })
    }
}

/// `GetPolicyVersion` / `DeletePolicyVersion` / `SetDefaultPolicyVersion`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyVersionInput {
    pub policy_arn: String,
    pub version_id: String,
}

impl FromQueryParams for PolicyVersionInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            policy_arn: required(params, "PolicyArn")?,
            version_id: required(params, "VersionId")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPolicyVersionsInput {
    pub policy_arn: String,
    pub paging: Paging,
}

impl FromQueryParams for ListPolicyVersionsInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            policy_arn: required(params, "PolicyArn")?,
            paging: Paging::from_query_params(params)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// `AttachRolePolicy` / `DetachRolePolicy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAttachmentInput {
    pub role_name: String,
    pub policy_arn: String,
}

impl FromQueryParams for RoleAttachmentInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            policy_arn: required(params, "PolicyArn")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAttachedRolePoliciesInput {
    pub role_name: String,
    pub path_prefix: Option<String>,
    pub paging: Paging,
}

impl FromQueryParams for ListAttachedRolePoliciesInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_name: required(params, "RoleName")?,
            path_prefix: params.optional("PathPrefix"),
            paging: Paging::from_query_params(params)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Role tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRoleInput {
    pub role_name: String,
    pub tags: Vec<Tag>,
}

impl FromQueryParams for TagRoleInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        let tags = tags(params);
        if tags.is_empty() {
            return Err(ParamError::Missing("Tags".to_owned()));
        }
        Ok(Self {
            role_name: required(params, "RoleName")?,
            tags,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UntagRoleInput {
    pub role_name: String,
    pub tag_keys: Vec<String>,
}

impl FromQueryParams for UntagRoleInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        let tag_keys = params.member_list("TagKeys");
        if tag_keys.is_empty() {
            return Err(ParamError::Missing("TagKeys".to_owned()));
        }
        Ok(Self {
            role_name: required(params, "RoleName")?,
            tag_keys,
        })
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserInput {
    pub user_name: String,
    pub path: Option<String>,
    pub tags: Vec<Tag>,
}

impl FromQueryParams for CreateUserInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            user_name: required(params, "UserName")?,
            path: params.optional("Path"),
            tags: tags(params),
        })
    }
}

/// `GetUser`, whose `UserName` defaults to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUserInput {
    pub user_name: Option<String>,
}

impl FromQueryParams for GetUserInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            user_name: params.optional("UserName").filter(|n| !n.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserNameInput {
    pub user_name: String,
}

impl FromQueryParams for UserNameInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            user_name: required(params, "UserName")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersInput {
    pub path_prefix: Option<String>,
    pub paging: Paging,
}

impl FromQueryParams for ListUsersInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            path_prefix: params.optional("PathPrefix"),
            paging: Paging::from_query_params(params)?,
        })
    }
}
