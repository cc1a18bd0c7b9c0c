//! STS service state.

use mockstack_core::{StateStore, TagSet};
use mockstack_sts_model::types::Credentials;

/// Store key layout.
pub mod keys {
    pub const SESSION_PREFIX: &str = "sts:session:";
    pub const ROLE_ID_PREFIX: &str = "sts:role-id:";

    #[must_use]
    pub fn session(access_key_id: &str) -> String {
        format!("{SESSION_PREFIX}{access_key_id}")
    }

    #[must_use]
    pub fn role_id(role_arn: &str) -> String {
        format!("{ROLE_ID_PREFIX}{role_arn}")
    }
}

#[derive(Debug, Default)]
pub struct StsState {
    /// Issued sessions by access key id.
    pub sessions: StateStore<SessionRecord>,
    /// `AROA...` id handed out per role ARN, stable across sessions.
    pub role_ids: StateStore<String>,
}

impl StsState {
    /// Create empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Who a session acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPrincipal {
    AssumedRole {
        role_arn: String,
        role_name: String,
        role_id: String,
        session_name: String,
    },
    /// `GetSessionToken`: the account itself.
    Account,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub credentials: Credentials,
    pub account_id: String,
    pub principal: SessionPrincipal,
    pub source_identity: Option<String>,
    pub tags: TagSet,
}

impl SessionRecord {
    /// `arn:aws:sts::<account>:assumed-role/<role>/<session>` for role
    /// sessions, the account root otherwise.
    #[must_use]
    pub fn principal_arn(&self) -> String {
        match &self.principal {
            SessionPrincipal::AssumedRole {
                role_name,
                session_name,
                ..
            } => format!(
                "arn:aws:sts::{}:assumed-role/{role_name}/{session_name}",
                self.account_id
            ),
            SessionPrincipal::Account => format!("arn:aws:iam::{}:root", self.account_id),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> String {
        match &self.principal {
            SessionPrincipal::AssumedRole {
                role_id,
                session_name,
                ..
            } => format!("{role_id}:{session_name}"),
            SessionPrincipal::Account => self.account_id.clone(),
        }
    }
}
