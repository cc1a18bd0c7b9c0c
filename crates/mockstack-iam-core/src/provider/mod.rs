//! IAM provider.
//!
//! IAM is global: ARNs carry an empty region and every entity lives in the
//! configured account.

mod attachments;
mod policies;
mod role_policies;
mod roles;
mod tags;
mod users;

use std::sync::Arc;

use mockstack_core::Page;
use mockstack_core::pagination::paginate_by_index;
use mockstack_iam_model::IamError;
use mockstack_iam_model::input::Paging;

use crate::config::IamConfig;
use crate::state::{IamState, ManagedPolicyRecord, RoleRecord, keys};
use crate::validate::max_items;

/// Main IAM provider.
#[derive(Debug)]
pub struct MockStackIam {
    pub(crate) state: Arc<IamState>,
    pub(crate) config: Arc<IamConfig>,
}

impl MockStackIam {
    /// Create a provider with fresh state.
    #[must_use]
    pub fn new(config: IamConfig) -> Self {
        Self::with_state(config, Arc::new(IamState::new()))
    }

    /// Create a provider over existing state.
    #[must_use]
    pub fn with_state(config: IamConfig, state: Arc<IamState>) -> Self {
        Self {
            state,
            config: Arc::new(config),
        }
    }

    /// Shared state backing this provider.
    #[must_use]
    pub fn state(&self) -> &Arc<IamState> {
        &self.state
    }

    /// `arn:aws:iam::<account>:<kind><path><name>`.
    pub(crate) fn entity_arn(&self, kind: &str, path: &str, name: &str) -> String {
        format!("arn:aws:iam::{}:{kind}{path}{name}", self.config.account_id)
    }

    pub(crate) fn require_role(&self, role_name: &str) -> Result<RoleRecord, IamError> {
        self.state
            .roles
            .find(&keys::role(role_name))
            .ok_or_else(|| IamError::role_not_found(role_name))
    }

    pub(crate) fn require_policy(&self, policy_arn: &str) -> Result<ManagedPolicyRecord, IamError> {
        self.state
            .policies
            .find(&keys::policy(policy_arn))
            .ok_or_else(|| IamError::policy_not_found(policy_arn))
    }
}

/// Apply `Marker` / `MaxItems` to a full listing.
pub(crate) fn page<T>(items: Vec<T>, paging: &Paging) -> Result<Page<T>, IamError> {
    let limit = max_items(paging.max_items)?;
    paginate_by_index(items, paging.marker.as_deref(), limit)
        .map_err(|e| IamError::validation(e.to_string()))
}
