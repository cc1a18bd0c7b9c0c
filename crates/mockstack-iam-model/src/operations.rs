//! IAM operation enum.

use std::fmt;

use mockstack_core::AwsOperation;

macro_rules! iam_operations {
    ($($variant:ident => [$($field:literal),* $(,)?]),+ $(,)?) => {
        /// Supported IAM actions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum IamOperation {
            $($variant,)+
        }

        impl IamOperation {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            /// Scalar parameters that must be present and non-empty.
            #[must_use]
            pub fn required_fields(&self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($field),*],)+
                }
            }
        }
    };
}

iam_operations! {
    CreateRole => ["RoleName", "AssumeRolePolicyDocument"],
    GetRole => ["RoleName"],
    DeleteRole => ["RoleName"],
    ListRoles => [],
    UpdateRole => ["RoleName"],
    UpdateAssumeRolePolicy => ["RoleName", "PolicyDocument"],

    PutRolePolicy => ["RoleName", "PolicyName", "PolicyDocument"],
    GetRolePolicy => ["RoleName", "PolicyName"],
    DeleteRolePolicy => ["RoleName", "PolicyName"],
    ListRolePolicies => ["RoleName"],

    CreatePolicy => ["PolicyName", "PolicyDocument"],
    GetPolicy => ["PolicyArn"],
    DeletePolicy => ["PolicyArn"],
    ListPolicies => [],
    CreatePolicyVersion => ["PolicyArn", "PolicyDocument"],
    GetPolicyVersion => ["PolicyArn", "VersionId"],
    ListPolicyVersions => ["PolicyArn"],
    DeletePolicyVersion => ["PolicyArn", "VersionId"],
    SetDefaultPolicyVersion => ["PolicyArn", "VersionId"],

    AttachRolePolicy => ["RoleName", "PolicyArn"],
    DetachRolePolicy => ["RoleName", "PolicyArn"],
    ListAttachedRolePolicies => ["RoleName"],

    TagRole => ["RoleName"],
    UntagRole => ["RoleName"],
    ListRoleTags => ["RoleName"],

    CreateUser => ["UserName"],
    GetUser => [],
    DeleteUser => ["UserName"],
    ListUsers => [],
}

impl IamOperation {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }

    /// Whether the response carries a `<{Action}Result>` element.
    #[must_use]
    pub fn has_result(&self) -> bool {
        !matches!(
            self,
            Self::DeleteRole
                | Self::UpdateAssumeRolePolicy
                | Self::PutRolePolicy
                | Self::DeleteRolePolicy
                | Self::DeletePolicy
                | Self::DeletePolicyVersion
                | Self::SetDefaultPolicyVersion
                | Self::AttachRolePolicy
                | Self::DetachRolePolicy
                | Self::TagRole
                | Self::UntagRole
                | Self::DeleteUser
        )
    }
}

impl AwsOperation for IamOperation {
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

impl fmt::Display for IamOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
