//! DynamoDB service state.
//!
//! Every entity lives in its own [`StateStore`] under the key returned by the
//! matching function in [`keys`]. Nothing cascades: deleting a table leaves
//! its backups, exports, imports and resource policy in place.

use mockstack_core::{RevisionClock, Revisioned, StateStore, TagSet};
use mockstack_dynamodb_model::backup::BackupDescription;
use mockstack_dynamodb_model::global_table::GlobalTableDescription;
use mockstack_dynamodb_model::insights::ContributorInsightsStatus;
use mockstack_dynamodb_model::transfer::{ExportDescription, ImportTableDescription};
use mockstack_dynamodb_model::types::{
    AttributeDefinition, BillingMode, BillingModeSummary, ContinuousBackupsDescription,
    ContinuousBackupsStatus, GlobalSecondaryIndex, GlobalSecondaryIndexDescription, IndexStatus,
    KeySchemaElement, KeyType, LocalSecondaryIndex, LocalSecondaryIndexDescription,
    PointInTimeRecoveryDescription, ProvisionedThroughput, ProvisionedThroughputDescription,
    RestoreSummary, SSEDescription, StreamSpecification, TableClass, TableClassSummary,
    TableDescription, TableStatus, TimeToLiveSpecification,
};

/// Store key layout.
pub mod keys {
    pub const TABLE_PREFIX: &str = "dynamodb:table:";
    pub const BACKUP_PREFIX: &str = "dynamodb:backup:";
    pub const GLOBAL_TABLE_PREFIX: &str = "dynamodb:global-table:";
    pub const RESOURCE_POLICY_PREFIX: &str = "dynamodb:resource-policy:";
    pub const INSIGHTS_PREFIX: &str = "dynamodb:contributor-insights:";
    pub const EXPORT_PREFIX: &str = "dynamodb:export:";
    pub const IMPORT_PREFIX: &str = "dynamodb:import:";

    #[must_use]
    pub fn table(name: &str) -> String {
        format!("{TABLE_PREFIX}{name}")
    }

    #[must_use]
    pub fn backup(table: &str, backup_name: &str) -> String {
        format!("{BACKUP_PREFIX}{table}:{backup_name}")
    }

    /// Prefix of every backup taken from `table`.
    #[must_use]
    pub fn backups_of(table: &str) -> String {
        format!("{BACKUP_PREFIX}{table}:")
    }

    #[must_use]
    pub fn global_table(name: &str) -> String {
        format!("{GLOBAL_TABLE_PREFIX}{name}")
    }

    #[must_use]
    pub fn resource_policy(resource_arn: &str) -> String {
        format!("{RESOURCE_POLICY_PREFIX}{resource_arn}")
    }

    #[must_use]
    pub fn insights(table: &str, index: Option<&str>) -> String {
        match index {
            Some(index) => format!("{INSIGHTS_PREFIX}{table}:{index}"),
            None => format!("{INSIGHTS_PREFIX}{table}"),
        }
    }

    #[must_use]
    pub fn export(export_arn: &str) -> String {
        format!("{EXPORT_PREFIX}{export_arn}")
    }

    #[must_use]
    pub fn import(import_arn: &str) -> String {
        format!("{IMPORT_PREFIX}{import_arn}")
    }
}

/// All DynamoDB control-plane state.
#[derive(Debug, Default)]
pub struct DynamoDBState {
    pub tables: StateStore<TableRecord>,
    pub backups: StateStore<BackupRecord>,
    pub global_tables: StateStore<GlobalTableDescription>,
    pub resource_policies: StateStore<ResourcePolicyRecord>,
    pub insights: StateStore<InsightsRecord>,
    pub exports: StateStore<ExportDescription>,
    pub imports: StateStore<ImportTableDescription>,
    /// Source of resource policy revision IDs.
    pub revisions: RevisionClock,
}

impl DynamoDBState {
    /// Create empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A stored table and every setting attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRecord {
    pub name: String,
    pub arn: String,
    pub table_id: String,
    pub status: TableStatus,
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub billing_mode: BillingMode,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
    pub stream_specification: Option<StreamSpecification>,
    pub latest_stream_label: Option<String>,
    pub sse_description: Option<SSEDescription>,
    pub table_class: TableClass,
    pub deletion_protection_enabled: bool,
    pub tags: TagSet,
    pub time_to_live: Option<TimeToLiveSpecification>,
    pub point_in_time_recovery_enabled: bool,
    pub recovery_period_in_days: Option<i32>,
    pub restore_summary: Option<RestoreSummary>,
    pub created_at: f64,
    pub billing_mode_updated_at: Option<f64>,
    pub table_class_updated_at: Option<f64>,
}

impl TableRecord {
    /// A fresh `CREATING` table with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, arn: impl Into<String>, created_at: f64) -> Self {
        Self {
            name: name.into(),
            arn: arn.into(),
            table_id: uuid_like_id(),
            status: TableStatus::Creating,
            key_schema: Vec::new(),
            attribute_definitions: Vec::new(),
            billing_mode: BillingMode::PayPerRequest,
            provisioned_throughput: None,
            global_secondary_indexes: Vec::new(),
            local_secondary_indexes: Vec::new(),
            stream_specification: None,
            latest_stream_label: None,
            sse_description: None,
            table_class: TableClass::Standard,
            deletion_protection_enabled: false,
            tags: TagSet::new(),
            time_to_live: None,
            point_in_time_recovery_enabled: false,
            recovery_period_in_days: None,
            restore_summary: None,
            created_at,
            billing_mode_updated_at: None,
            table_class_updated_at: None,
        }
    }

    /// Name of the partition key attribute, if a key schema was given.
    #[must_use]
    pub fn hash_key(&self) -> Option<&str> {
        key_attribute(&self.key_schema, KeyType::Hash)
    }

    /// Name of the sort key attribute, if the table has one.
    #[must_use]
    pub fn range_key(&self) -> Option<&str> {
        key_attribute(&self.key_schema, KeyType::Range)
    }

    /// Whether an index with this name is defined on the table.
    #[must_use]
    pub fn has_index(&self, index_name: &str) -> bool {
        self.global_secondary_indexes
            .iter()
            .any(|i| i.index_name == index_name)
            || self
                .local_secondary_indexes
                .iter()
                .any(|i| i.index_name == index_name)
    }

    /// Provisioned capacity as reported; zeroes for on-demand tables.
    #[must_use]
    pub fn throughput(&self) -> ProvisionedThroughput {
        self.provisioned_throughput.unwrap_or_default()
    }

    /// Build the wire description of this table.
    #[must_use]
    pub fn to_description(&self) -> TableDescription {
        let billing_mode_summary = BillingModeSummary {
            billing_mode: Some(self.billing_mode.clone()),
            last_update_to_pay_per_request_date_time: (self.billing_mode
                == BillingMode::PayPerRequest)
                .then(|| self.billing_mode_updated_at.unwrap_or(self.created_at)),
        };

        let global_secondary_indexes = self
            .global_secondary_indexes
            .iter()
            .map(|gsi| GlobalSecondaryIndexDescription {
                index_name: Some(gsi.index_name.clone()),
                key_schema: gsi.key_schema.clone(),
                projection: Some(gsi.projection.clone()),
                index_status: Some(IndexStatus::Active),
                provisioned_throughput: Some(
                    gsi.provisioned_throughput.unwrap_or_default().into(),
                ),
                index_size_bytes: Some(0),
                item_count: Some(0),
                index_arn: Some(format!("{}/index/{}", self.arn, gsi.index_name)),
            })
            .collect();

        let local_secondary_indexes = self
            .local_secondary_indexes
            .iter()
            .map(|lsi| LocalSecondaryIndexDescription {
                index_name: Some(lsi.index_name.clone()),
                key_schema: lsi.key_schema.clone(),
                projection: Some(lsi.projection.clone()),
                index_size_bytes: Some(0),
                item_count: Some(0),
                index_arn: Some(format!("{}/index/{}", self.arn, lsi.index_name)),
            })
            .collect();

        let stream_enabled = self
            .stream_specification
            .is_some_and(|s| s.stream_enabled);
        let latest_stream_label = self.latest_stream_label.clone().filter(|_| stream_enabled);
        let latest_stream_arn = latest_stream_label
            .as_ref()
            .map(|label| format!("{}/stream/{label}", self.arn));

        TableDescription {
            table_name: Some(self.name.clone()),
            table_status: Some(self.status),
            key_schema: self.key_schema.clone(),
            attribute_definitions: self.attribute_definitions.clone(),
            creation_date_time: Some(self.created_at),
            item_count: Some(0),
            table_size_bytes: Some(0),
            table_arn: Some(self.arn.clone()),
            table_id: Some(self.table_id.clone()),
            billing_mode_summary: Some(billing_mode_summary),
            provisioned_throughput: Some(ProvisionedThroughputDescription::from(
                self.throughput(),
            )),
            global_secondary_indexes,
            local_secondary_indexes,
            stream_specification: self.stream_specification,
            latest_stream_arn,
            latest_stream_label,
            sse_description: self.sse_description.clone(),
            table_class_summary: Some(TableClassSummary {
                table_class: self.table_class,
                last_update_date_time: self.table_class_updated_at,
            }),
            archival_summary: None,
            restore_summary: self.restore_summary.clone(),
            deletion_protection_enabled: Some(self.deletion_protection_enabled),
        }
    }

    /// Continuous backups are always on; point-in-time recovery follows the table setting.
    #[must_use]
    pub fn continuous_backups(&self, now: f64) -> ContinuousBackupsDescription {
        let point_in_time_recovery_description = if self.point_in_time_recovery_enabled {
            PointInTimeRecoveryDescription {
                point_in_time_recovery_status: ContinuousBackupsStatus::Enabled,
                recovery_period_in_days: Some(self.recovery_period_in_days.unwrap_or(35)),
                earliest_restorable_date_time: Some(self.created_at),
                latest_restorable_date_time: Some(now),
            }
        } else {
            PointInTimeRecoveryDescription {
                point_in_time_recovery_status: ContinuousBackupsStatus::Disabled,
                recovery_period_in_days: None,
                earliest_restorable_date_time: None,
                latest_restorable_date_time: None,
            }
        };
        ContinuousBackupsDescription {
            continuous_backups_status: ContinuousBackupsStatus::Enabled,
            point_in_time_recovery_description,
        }
    }
}

fn key_attribute(schema: &[KeySchemaElement], key_type: KeyType) -> Option<&str> {
    schema
        .iter()
        .find(|e| e.key_type == key_type)
        .map(|e| e.attribute_name.as_str())
}

/// Table IDs are dashed UUIDs.
fn uuid_like_id() -> String {
    mockstack_core::ids::request_id()
}

/// A backup and a snapshot of the table it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRecord {
    pub description: BackupDescription,
    /// Schema and settings restored by `RestoreTableFromBackup`.
    pub source: TableRecord,
}

impl BackupRecord {
    #[must_use]
    pub fn arn(&self) -> &str {
        &self.description.backup_details.backup_arn
    }
}

/// A resource policy attached to a table (or one of its streams or indexes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePolicyRecord {
    pub resource_arn: String,
    pub policy: String,
    pub revision_id: String,
}

impl Revisioned for ResourcePolicyRecord {
    fn revision_id(&self) -> &str {
        &self.revision_id
    }
}

/// Contributor insights setting of a table or one of its indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsRecord {
    pub table_name: String,
    pub index_name: Option<String>,
    pub status: ContributorInsightsStatus,
    pub rule_list: Vec<String>,
    pub last_update: f64,
}
