//! STS provider.

mod assume;
mod identity;
mod session;

use std::sync::Arc;

use chrono::{Duration, Utc};
use mockstack_core::ids;
use mockstack_sts_model::types::Credentials;

use crate::config::StsConfig;
use crate::state::{StsState, keys};

/// Main STS provider.
#[derive(Debug)]
pub struct MockStackSts {
    pub(crate) state: Arc<StsState>,
    pub(crate) config: Arc<StsConfig>,
}

impl MockStackSts {
    /// Create a provider with fresh state.
    #[must_use]
    pub fn new(config: StsConfig) -> Self {
        Self::with_state(config, Arc::new(StsState::new()))
    }

    /// Create a provider over existing state.
    #[must_use]
    pub fn with_state(config: StsConfig, state: Arc<StsState>) -> Self {
        Self {
            state,
            config: Arc::new(config),
        }
    }

    /// Shared state backing this provider.
    #[must_use]
    pub fn state(&self) -> &Arc<StsState> {
        &self.state
    }

    /// Fresh temporary credentials valid for `duration_seconds`.
    pub(crate) fn issue_credentials(duration_seconds: i32) -> Credentials {
        Credentials {
            access_key_id: ids::aws_unique_id("ASIA"),
            secret_access_key: ids::secret_key(),
            session_token: ids::session_token(),
            expiration: Utc::now() + Duration::seconds(i64::from(duration_seconds)),
        }
    }

    /// The stable unique id of a role, allocated on first use.
    pub(crate) fn role_id(&self, role_arn: &str) -> String {
        let key = keys::role_id(role_arn);
        if let Some(id) = self.state.role_ids.find(&key) {
            return id;
        }
        let id = ids::aws_unique_id("AROA");
        match self.state.role_ids.insert_new(key.clone(), id.clone()) {
            Ok(()) => id,
            Err(_) => self.state.role_ids.find(&key).unwrap_or(id),
        }
    }
}
