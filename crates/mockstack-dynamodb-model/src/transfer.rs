//! Export to S3 and import from S3.
//!
//! No data moves; exports and imports are records whose status completes the
//! first time they are described.

use serde::{Deserialize, Serialize};

use crate::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    ProvisionedThroughput, SSESpecification,
};

wire_enum! {
    /// Status of an export.
    ExportStatus {
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

wire_enum! {
    /// File format of exported data.
    ExportFormat {
        DynamodbJson => "DYNAMODB_JSON",
        Ion => "ION",
    }
}

wire_enum! {
    /// Full or incremental export.
    ExportType {
        FullExport => "FULL_EXPORT",
        IncrementalExport => "INCREMENTAL_EXPORT",
    }
}

wire_enum! {
    /// Server-side encryption of the export bucket objects.
    S3SseAlgorithm {
        Aes256 => "AES256",
        Kms => "KMS",
    }
}

wire_enum! {
    /// Status of an import.
    ImportStatus {
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelling => "CANCELLING",
        Cancelled => "CANCELLED",
        Failed => "FAILED",
    }
}

wire_enum! {
    /// File format of imported data.
    InputFormat {
        DynamodbJson => "DYNAMODB_JSON",
        Ion => "ION",
        Csv => "CSV",
    }
}

wire_enum! {
    /// Compression of imported files.
    InputCompressionType {
        Gzip => "GZIP",
        Zstd => "ZSTD",
        None => "NONE",
    }
}

/// Description of an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportDescription {
    pub export_arn: String,
    pub export_status: ExportStatus,
    pub start_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_manifest: Option<String>,
    pub table_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub export_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    pub s3_bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_sse_algorithm: Option<S3SseAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_sse_kms_key_id: Option<String>,
    pub export_format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_size_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    pub export_type: ExportType,
}

/// One entry of `ListExports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportSummary {
    pub export_arn: String,
    pub export_status: ExportStatus,
    pub export_type: ExportType,
}

/// Location of the files to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3BucketSource {
    pub s3_bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_key_prefix: Option<String>,
}

/// Schema of the table an import creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableCreationParameters {
    pub table_name: String,
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinition>,
    #[serde(default)]
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    #[serde(rename = "SSESpecification", skip_serializing_if = "Option::is_none")]
    pub sse_specification: Option<SSESpecification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
}

/// Description of an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportTableDescription {
    pub import_arn: String,
    pub import_status: ImportStatus,
    pub table_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    pub s3_bucket_source: S3BucketSource,
    pub error_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_watch_log_group_arn: Option<String>,
    pub input_format: InputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_compression_type: Option<InputCompressionType>,
    pub table_creation_parameters: TableCreationParameters,
    pub start_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    pub processed_size_bytes: i64,
    pub processed_item_count: i64,
    pub imported_item_count: i64,
}

/// One entry of `ListImports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportSummary {
    pub import_arn: String,
    pub import_status: ImportStatus,
    pub table_arn: String,
    pub s3_bucket_source: S3BucketSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_watch_log_group_arn: Option<String>,
    pub input_format: InputFormat,
    pub start_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

impl ImportSummary {
    /// Summarize an import description.
    #[must_use]
    pub fn from_description(desc: &ImportTableDescription) -> Self {
        Self {
            import_arn: desc.import_arn.clone(),
            import_status: desc.import_status,
            table_arn: desc.table_arn.clone(),
            s3_bucket_source: desc.s3_bucket_source.clone(),
            cloud_watch_log_group_arn: desc.cloud_watch_log_group_arn.clone(),
            input_format: desc.input_format,
            start_time: desc.start_time,
            end_time: desc.end_time,
        }
    }
}
