//! On-demand backup types.

use serde::{Deserialize, Serialize};

use crate::types::{BillingMode, KeySchemaElement, ProvisionedThroughput};

wire_enum! {
    /// Lifecycle state of a backup.
    BackupStatus {
        Creating => "CREATING",
        Deleted => "DELETED",
        Available => "AVAILABLE",
    }
}

wire_enum! {
    /// Who created a backup.
    BackupType {
        User => "USER",
        System => "SYSTEM",
        AwsBackup => "AWS_BACKUP",
    }
}

wire_enum! {
    /// `BackupType` filter of `ListBackups`.
    BackupTypeFilter {
        User => "USER",
        System => "SYSTEM",
        AwsBackup => "AWS_BACKUP",
        All => "ALL",
    }
}

impl BackupTypeFilter {
    /// Whether a backup of type `ty` passes this filter.
    #[must_use]
    pub fn matches(self, ty: BackupType) -> bool {
        match self {
            Self::All => true,
            Self::User => ty == BackupType::User,
            Self::System => ty == BackupType::System,
            Self::AwsBackup => ty == BackupType::AwsBackup,
        }
    }
}

/// Identity and status of a backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupDetails {
    pub backup_arn: String,
    pub backup_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_size_bytes: Option<i64>,
    pub backup_status: BackupStatus,
    pub backup_type: BackupType,
    pub backup_creation_date_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_expiry_date_time: Option<f64>,
}

/// Schema of the table a backup was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceTableDetails {
    pub table_name: String,
    pub table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_size_bytes: Option<i64>,
    pub key_schema: Vec<KeySchemaElement>,
    pub table_creation_date_time: f64,
    pub provisioned_throughput: ProvisionedThroughput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
}

/// Full description of a backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupDescription {
    pub backup_details: BackupDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_table_details: Option<SourceTableDetails>,
}

/// One entry of `ListBackups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupSummary {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_arn: Option<String>,
    pub backup_arn: String,
    pub backup_name: String,
    pub backup_creation_date_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_expiry_date_time: Option<f64>,
    pub backup_status: BackupStatus,
    pub backup_type: BackupType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_size_bytes: Option<i64>,
}

impl BackupSummary {
    /// Summarize a backup description.
    #[must_use]
    pub fn from_description(desc: &BackupDescription) -> Self {
        let details = &desc.backup_details;
        let source = desc.source_table_details.as_ref();
        Self {
            table_name: source.map(|s| s.table_name.clone()).unwrap_or_default(),
            table_id: source.map(|s| s.table_id.clone()),
            table_arn: source.and_then(|s| s.table_arn.clone()),
            backup_arn: details.backup_arn.clone(),
            backup_name: details.backup_name.clone(),
            backup_creation_date_time: details.backup_creation_date_time,
            backup_expiry_date_time: details.backup_expiry_date_time,
            backup_status: details.backup_status,
            backup_type: details.backup_type,
            backup_size_bytes: details.backup_size_bytes,
        }
    }
}
