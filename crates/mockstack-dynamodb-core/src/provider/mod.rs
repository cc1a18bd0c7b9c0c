//! DynamoDB provider implementing the control-plane operations.
//!
//! Each `handle_*` method is synchronous: it validates its input, reads and
//! writes [`DynamoDBState`], and returns the typed output. Operations are
//! grouped by resource in the submodules.

mod account;
mod backups;
mod global_tables;
mod insights;
mod policies;
mod settings;
mod tables;
mod tags;
mod transfer;

use std::sync::Arc;

use mockstack_dynamodb_model::DynamoDBError;

use crate::config::DynamoDBConfig;
use crate::state::{DynamoDBState, TableRecord, keys};

/// Main DynamoDB provider.
#[derive(Debug)]
pub struct MockStackDynamoDB {
    pub(crate) state: Arc<DynamoDBState>,
    pub(crate) config: Arc<DynamoDBConfig>,
}

impl MockStackDynamoDB {
    /// Create a new provider with empty state.
    #[must_use]
    pub fn new(config: DynamoDBConfig) -> Self {
        Self::with_state(config, Arc::new(DynamoDBState::new()))
    }

    /// Create a provider over existing state.
    #[must_use]
    pub fn with_state(config: DynamoDBConfig, state: Arc<DynamoDBState>) -> Self {
        Self {
            state,
            config: Arc::new(config),
        }
    }

    /// Shared state, for tests and inspection.
    #[must_use]
    pub fn state(&self) -> &Arc<DynamoDBState> {
        &self.state
    }

    /// `arn:aws:dynamodb:<region>:<account>:table/<name>`.
    pub(crate) fn table_arn(&self, table_name: &str) -> String {
        format!(
            "arn:aws:dynamodb:{}:{}:table/{table_name}",
            self.config.default_region, self.config.account_id
        )
    }

    /// Load a table or fail with `ResourceNotFoundException`.
    pub(crate) fn require_table(&self, table_name: &str) -> Result<TableRecord, DynamoDBError> {
        self.state
            .tables
            .find(&keys::table(table_name))
            .ok_or_else(|| DynamoDBError::table_not_found(table_name))
    }

    /// Mutate a stored table under its entry lock.
    pub(crate) fn update_table_record<R>(
        &self,
        table_name: &str,
        f: impl FnOnce(&mut TableRecord) -> Result<R, DynamoDBError>,
    ) -> Result<R, DynamoDBError> {
        let key = keys::table(table_name);
        if !self.state.tables.exists(&key) {
            return Err(DynamoDBError::table_not_found(table_name));
        }
        self.state.tables.try_update(&key, f)
    }
}

/// Suffix shared by backup, export and import ARNs: `<epoch ms>-<8 hex>`.
pub(crate) fn timestamped_suffix() -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        mockstack_core::ids::short_hex_id(8)
    )
}
