//! IAM service state.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use mockstack_core::{StateStore, TagSet};
use mockstack_iam_model::types::{Policy, PolicyVersion, Role, Tag, User};

/// Store key layout.
pub mod keys {
    pub const ROLE_PREFIX: &str = "iam:role:";
    pub const ROLE_POLICY_PREFIX: &str = "iam:role-policy:";
    pub const POLICY_PREFIX: &str = "iam:policy:";
    pub const USER_PREFIX: &str = "iam:user:";

    #[must_use]
    pub fn role(name: &str) -> String {
        format!("{ROLE_PREFIX}{name}")
    }

    /// Prefix of every inline policy of one role. Role names cannot contain
    /// `:`, so the prefix never matches another role's policies.
    #[must_use]
    pub fn role_policies(role_name: &str) -> String {
        format!("{ROLE_POLICY_PREFIX}{role_name}:")
    }

    #[must_use]
    pub fn role_policy(role_name: &str, policy_name: &str) -> String {
        format!("{ROLE_POLICY_PREFIX}{role_name}:{policy_name}")
    }

    #[must_use]
    pub fn policy(arn: &str) -> String {
        format!("{POLICY_PREFIX}{arn}")
    }

    #[must_use]
    pub fn user(name: &str) -> String {
        format!("{USER_PREFIX}{name}")
    }
}

/// All IAM state.
#[derive(Debug, Default)]
pub struct IamState {
    pub roles: StateStore<RoleRecord>,
    pub role_policies: StateStore<InlinePolicyRecord>,
    pub policies: StateStore<ManagedPolicyRecord>,
    pub users: StateStore<UserRecord>,
}

impl IamState {
    /// Create empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn to_tags(tags: &TagSet) -> Vec<Tag> {
    tags.iter()
        .map(|(k, v)| Tag {
            key: k.to_owned(),
            value: v.to_owned(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleRecord {
    /// The role as described; `tags` is filled from [`RoleRecord::tags`] on output.
    pub role: Role,
    pub tags: TagSet,
    /// ARNs of attached managed policies.
    pub attached_policies: BTreeSet<String>,
}

impl RoleRecord {
    #[must_use]
    pub fn describe(&self) -> Role {
        Role {
            tags: to_tags(&self.tags),
            ..self.role.clone()
        }
    }
}

/// A policy embedded in a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePolicyRecord {
    pub role_name: String,
    pub policy_name: String,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVersion {
    pub version_id: String,
    pub document: String,
    pub create_date: DateTime<Utc>,
}

/// A customer managed policy and its versions.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedPolicyRecord {
    pub policy: Policy,
    pub tags: TagSet,
    /// Oldest first.
    pub versions: Vec<StoredVersion>,
    /// Number used for the next `v<N>` id; ids are never reused.
    pub next_version: u32,
}

impl ManagedPolicyRecord {
    #[must_use]
    pub fn describe(&self) -> Policy {
        Policy {
            tags: to_tags(&self.tags),
            ..self.policy.clone()
        }
    }

    #[must_use]
    pub fn find_version(&self, version_id: &str) -> Option<&StoredVersion> {
        self.versions.iter().find(|v| v.version_id == version_id)
    }

    /// The version as returned by the API, with or without its document.
    #[must_use]
    pub fn version_view(&self, version: &StoredVersion, with_document: bool) -> PolicyVersion {
        PolicyVersion {
            document: with_document.then(|| version.document.clone()),
            version_id: version.version_id.clone(),
            is_default_version: version.version_id == self.policy.default_version_id,
            create_date: version.create_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user: User,
    pub tags: TagSet,
}

impl UserRecord {
    #[must_use]
    pub fn describe(&self) -> User {
        User {
            tags: to_tags(&self.tags),
            ..self.user.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_scope_inline_policy_prefix_to_one_role() {
        let store: StateStore<u8> = StateStore::new();
        store.set(keys::role_policy("app", "read"), 1);
        store.set(keys::role_policy("app-admin", "all"), 2);
        assert_eq!(store.list(&keys::role_policies("app")).len(), 1);
    }

    #[test]
    fn test_should_flag_default_version_in_view() {
        let now = Utc::now();
        let record = ManagedPolicyRecord {
            policy: Policy {
                policy_name: "p".to_owned(),
                policy_id: "ANPA".to_owned(),
                arn: "arn:aws:iam::000000000000:policy/p".to_owned(),
                path: "/".to_owned(),
                default_version_id: "v2".to_owned(),
                attachment_count: 0,
                description: None,
                create_date: now,
                update_date: now,
                tags: vec![],
            },
            tags: TagSet::new(),
            versions: vec![
                StoredVersion {
                    version_id: "v1".to_owned(),
                    document: "{}".to_owned(),
                    create_date: now,
                },
                StoredVersion {
                    version_id: "v2".to_owned(),
                    document: "{}".to_owned(),
                    create_date: now,
                },
            ],
            next_version: 3,
        };
        let v1 = record.find_version("v1").unwrap();
        assert!(!record.version_view(v1, false).is_default_version);
        let v2 = record.find_version("v2").unwrap();
        let view = record.version_view(v2, true);
        assert!(view.is_default_version);
        assert_eq!(view.document.as_deref(), Some("{}"));
    }
}
