//! DynamoDB operation enum.

use std::fmt;

use mockstack_core::AwsOperation;

/// All supported DynamoDB control-plane operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamoDBOperation {
    // Tables
    CreateTable,
    DescribeTable,
    DeleteTable,
    ListTables,
    UpdateTable,

    // Table settings
    DescribeTimeToLive,
    UpdateTimeToLive,
    DescribeContinuousBackups,
    UpdateContinuousBackups,

    // Backups
    CreateBackup,
    DescribeBackup,
    DeleteBackup,
    ListBackups,
    RestoreTableFromBackup,

    // Global tables (version 2017.11.29)
    CreateGlobalTable,
    DescribeGlobalTable,
    UpdateGlobalTable,
    ListGlobalTables,

    // Resource policies
    PutResourcePolicy,
    GetResourcePolicy,
    DeleteResourcePolicy,

    // Tags
    TagResource,
    UntagResource,
    ListTagsOfResource,

    // Contributor insights
    UpdateContributorInsights,
    DescribeContributorInsights,
    ListContributorInsights,

    // Exports and imports
    ExportTableToPointInTime,
    DescribeExport,
    ListExports,
    ImportTable,
    DescribeImport,
    ListImports,

    // Account
    DescribeLimits,
    DescribeEndpoints,
}

impl DynamoDBOperation {
    /// Every operation, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::CreateTable,
        Self::DescribeTable,
        Self::DeleteTable,
        Self::ListTables,
        Self::UpdateTable,
        Self::DescribeTimeToLive,
        Self::UpdateTimeToLive,
        Self::DescribeContinuousBackups,
        Self::UpdateContinuousBackups,
        Self::CreateBackup,
        Self::DescribeBackup,
        Self::DeleteBackup,
        Self::ListBackups,
        Self::RestoreTableFromBackup,
        Self::CreateGlobalTable,
        Self::DescribeGlobalTable,
        Self::UpdateGlobalTable,
        Self::ListGlobalTables,
        Self::PutResourcePolicy,
        Self::GetResourcePolicy,
        Self::DeleteResourcePolicy,
        Self::TagResource,
        Self::UntagResource,
        Self::ListTagsOfResource,
        Self::UpdateContributorInsights,
        Self::DescribeContributorInsights,
        Self::ListContributorInsights,
        Self::ExportTableToPointInTime,
        Self::DescribeExport,
        Self::ListExports,
        Self::ImportTable,
        Self::DescribeImport,
        Self::ListImports,
        Self::DescribeLimits,
        Self::DescribeEndpoints,
    ];

    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTable => "CreateTable",
            Self::DescribeTable => "DescribeTable",
            Self::DeleteTable => "DeleteTable",
            Self::ListTables => "ListTables",
            Self::UpdateTable => "UpdateTable",
            Self::DescribeTimeToLive => "DescribeTimeToLive",
            Self::UpdateTimeToLive => "UpdateTimeToLive",
            Self::DescribeContinuousBackups => "DescribeContinuousBackups",
            Self::UpdateContinuousBackups => "UpdateContinuousBackups",
            Self::CreateBackup => "CreateBackup",
            Self::DescribeBackup => "DescribeBackup",
            Self::DeleteBackup => "DeleteBackup",
            Self::ListBackups => "ListBackups",
            Self::RestoreTableFromBackup => "RestoreTableFromBackup",
            Self::CreateGlobalTable => "CreateGlobalTable",
            Self::DescribeGlobalTable => "DescribeGlobalTable",
            Self::UpdateGlobalTable => "UpdateGlobalTable",
            Self::ListGlobalTables => "ListGlobalTables",
            Self::PutResourcePolicy => "PutResourcePolicy",
            Self::GetResourcePolicy => "GetResourcePolicy",
            Self::DeleteResourcePolicy => "DeleteResourcePolicy",
            Self::TagResource => "TagResource",
            Self::UntagResource => "UntagResource",
            Self::ListTagsOfResource => "ListTagsOfResource",
            Self::UpdateContributorInsights => "UpdateContributorInsights",
            Self::DescribeContributorInsights => "DescribeContributorInsights",
            Self::ListContributorInsights => "ListContributorInsights",
            Self::ExportTableToPointInTime => "ExportTableToPointInTime",
            Self::DescribeExport => "DescribeExport",
            Self::ListExports => "ListExports",
            Self::ImportTable => "ImportTable",
            Self::DescribeImport => "DescribeImport",
            Self::ListImports => "ListImports",
            Self::DescribeLimits => "DescribeLimits",
            Self::DescribeEndpoints => "DescribeEndpoints",
        }
    }

    /// Parse an operation name string into a `DynamoDBOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }

    /// Top-level members that must be present and non-empty.
    #[must_use]
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::CreateTable
            | Self::DescribeTable
            | Self::DeleteTable
            | Self::UpdateTable
            | Self::DescribeTimeToLive
            | Self::DescribeContinuousBackups
            | Self::DescribeContributorInsights => &["TableName"],
            Self::UpdateTimeToLive => &["TableName", "TimeToLiveSpecification"],
            Self::UpdateContinuousBackups => &["TableName", "PointInTimeRecoverySpecification"],
            Self::CreateBackup => &["TableName", "BackupName"],
            Self::DescribeBackup | Self::DeleteBackup => &["BackupArn"],
            Self::RestoreTableFromBackup => &["TargetTableName", "BackupArn"],
            Self::CreateGlobalTable => &["GlobalTableName", "ReplicationGroup"],
            Self::DescribeGlobalTable => &["GlobalTableName"],
            Self::UpdateGlobalTable => &["GlobalTableName", "ReplicaUpdates"],
            Self::PutResourcePolicy => &["ResourceArn", "Policy"],
            Self::GetResourcePolicy | Self::DeleteResourcePolicy | Self::ListTagsOfResource => {
                &["ResourceArn"]
            }
            Self::TagResource => &["ResourceArn", "Tags"],
            Self::UntagResource => &["ResourceArn", "TagKeys"],
            Self::UpdateContributorInsights => &["TableName", "ContributorInsightsAction"],
            Self::ExportTableToPointInTime => &["TableArn", "S3Bucket"],
            Self::DescribeExport => &["ExportArn"],
            Self::ImportTable => &["S3BucketSource", "InputFormat", "TableCreationParameters"],
            Self::DescribeImport => &["ImportArn"],
            Self::ListTables
            | Self::ListBackups
            | Self::ListGlobalTables
            | Self::ListContributorInsights
            | Self::ListExports
            | Self::ListImports
            | Self::DescribeLimits
            | Self::DescribeEndpoints => &[],
        }
    }
}

impl AwsOperation for DynamoDBOperation {
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

impl fmt::Display for DynamoDBOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_every_operation_name() {
        for op in DynamoDBOperation::ALL {
            assert_eq!(DynamoDBOperation::from_name(op.as_str()), Some(*op));
        }
        assert_eq!(DynamoDBOperation::ALL.len(), 35);
    }

    #[test]
    fn test_should_not_resolve_data_plane_operations() {
        assert!(DynamoDBOperation::from_name("PutItem").is_none());
        assert!(DynamoDBOperation::from_name("createtable").is_none());
    }

    #[test]
    fn test_should_require_table_name_for_table_operations() {
        assert_eq!(DynamoDBOperation::CreateTable.required_fields(), &["TableName"]);
        assert!(DynamoDBOperation::ListTables.required_fields().is_empty());
    }
}
