//! On-demand backups and restore.

use mockstack_core::ids::epoch_seconds;
use mockstack_core::pagination::{paginate_after_key, page_size};
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::backup::{
    BackupDescription, BackupDetails, BackupStatus, BackupSummary, BackupType, SourceTableDetails,
};
use mockstack_dynamodb_model::dynamodb_error;
use mockstack_dynamodb_model::input::{
    CreateBackupInput, DeleteBackupInput, DescribeBackupInput, ListBackupsInput,
    RestoreTableFromBackupInput,
};
use mockstack_dynamodb_model::output::{
    CreateBackupOutput, DeleteBackupOutput, DescribeBackupOutput, ListBackupsOutput,
    RestoreTableFromBackupOutput,
};
use mockstack_dynamodb_model::types::{BillingMode, RestoreSummary};
use tracing::info;

use super::tables::NewTable;
use super::{MockStackDynamoDB, timestamped_suffix};
use crate::state::{BackupRecord, TableRecord, keys};

const MAX_LIST_BACKUPS_LIMIT: usize = 100;

impl MockStackDynamoDB {
    /// Scan every backup for one with this ARN, returning its store key too.
    fn find_backup(&self, backup_arn: &str) -> Option<(String, BackupRecord)> {
        self.state
            .backups
            .list(keys::BACKUP_PREFIX)
            .into_iter()
            .find_map(|key| {
                self.state
                    .backups
                    .find(&key)
                    .filter(|b| b.arn() == backup_arn)
                    .map(|b| (key, b))
            })
    }

    /// Handle `CreateBackup`.
    pub fn handle_create_backup(
        &self,
        input: CreateBackupInput,
    ) -> Result<CreateBackupOutput, DynamoDBError> {
        validate_backup_name(&input.backup_name)?;
        let table = self
            .state
            .tables
            .find(&keys::table(&input.table_name))
            .ok_or_else(|| {
                dynamodb_error!(
                    TableNotFoundException,
                    format!("Table not found: {}", input.table_name)
                )
            })?;

        let now = epoch_seconds();
        let backup_details = BackupDetails {
            backup_arn: format!("{}/backup/{}", table.arn, timestamped_suffix()),
            backup_name: input.backup_name.clone(),
            backup_size_bytes: Some(0),
            backup_status: BackupStatus::Available,
            backup_type: BackupType::User,
            backup_creation_date_time: now,
            backup_expiry_date_time: None,
        };
        let record = BackupRecord {
            description: BackupDescription {
                backup_details: backup_details.clone(),
                source_table_details: Some(source_table_details(&table)),
            },
            source: table,
        };

        self.state
            .backups
            .insert_new(keys::backup(&input.table_name, &input.backup_name), record)
            .map_err(|_| {
                dynamodb_error!(
                    BackupInUseException,
                    format!(
                        "Backup {} already exists for table {}",
                        input.backup_name, input.table_name
                    )
                )
            })?;

        info!(
            table = %input.table_name,
            backup_arn = %backup_details.backup_arn,
            "created backup"
        );
        Ok(CreateBackupOutput { backup_details })
    }

    /// Handle `DescribeBackup`.
    pub fn handle_describe_backup(
        &self,
        input: DescribeBackupInput,
    ) -> Result<DescribeBackupOutput, DynamoDBError> {
        let (_, backup) = self
            .find_backup(&input.backup_arn)
            .ok_or_else(|| backup_not_found(&input.backup_arn))?;
        Ok(DescribeBackupOutput {
            backup_description: backup.description,
        })
    }

    /// Handle `DeleteBackup`. Deleting an unknown backup succeeds.
    pub fn handle_delete_backup(
        &self,
        input: DeleteBackupInput,
    ) -> Result<DeleteBackupOutput, DynamoDBError> {
        let removed = self
            .find_backup(&input.backup_arn)
            .and_then(|(key, _)| self.state.backups.delete(&key));

        let backup_description = match removed {
            Some(record) => {
                info!(backup_arn = %input.backup_arn, "deleted backup");
                let mut description = record.description;
                description.backup_details.backup_status = BackupStatus::Deleted;
                description
            }
            None => BackupDescription {
                backup_details: BackupDetails {
                    backup_arn: input.backup_arn.clone(),
                    backup_name: input
                        .backup_arn
                        .rsplit('/')
                        .next()
                        .unwrap_or_default()
                        .to_owned(),
                    backup_size_bytes: None,
                    backup_status: BackupStatus::Deleted,
                    backup_type: BackupType::User,
                    backup_creation_date_time: epoch_seconds(),
                    backup_expiry_date_time: None,
                },
                source_table_details: None,
            },
        };
        Ok(DeleteBackupOutput { backup_description })
    }

    /// Handle `ListBackups`.
    pub fn handle_list_backups(
        &self,
        input: ListBackupsInput,
    ) -> Result<ListBackupsOutput, DynamoDBError> {
        if let Some(limit) = input.limit {
            if !(1..=100).contains(&limit) {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{limit}' at 'limit' failed to satisfy \
                     constraint: Member must have value between 1 and 100"
                )));
            }
        }

        let prefix = input
            .table_name
            .as_deref()
            .map_or_else(|| keys::BACKUP_PREFIX.to_owned(), keys::backups_of);
        let summaries: Vec<BackupSummary> = self
            .state
            .backups
            .list_values(&prefix)
            .iter()
            .map(|b| &b.description)
            .filter(|d| {
                let created = d.backup_details.backup_creation_date_time;
                input.time_range_lower_bound.is_none_or(|lo| created >= lo)
                    && input.time_range_upper_bound.is_none_or(|hi| created < hi)
                    && input
                        .backup_type
                        .is_none_or(|f| f.matches(d.backup_details.backup_type))
            })
            .map(BackupSummary::from_description)
            .collect();

        let page = paginate_after_key(
            summaries,
            input.exclusive_start_backup_arn.as_deref(),
            page_size(input.limit, MAX_LIST_BACKUPS_LIMIT, MAX_LIST_BACKUPS_LIMIT),
            |s| s.backup_arn.as_str(),
        );
        Ok(ListBackupsOutput {
            backup_summaries: page.items,
            last_evaluated_backup_arn: page.next_token,
        })
    }

    /// Handle `RestoreTableFromBackup`.
    pub fn handle_restore_table_from_backup(
        &self,
        input: RestoreTableFromBackupInput,
    ) -> Result<RestoreTableFromBackupOutput, DynamoDBError> {
        let (_, backup) = self
            .find_backup(&input.backup_arn)
            .ok_or_else(|| backup_not_found(&input.backup_arn))?;
        let target = input.target_table_name;
        let already_exists = || {
            dynamodb_error!(
                TableAlreadyExistsException,
                format!("Table already exists: {target}")
            )
        };
        if self.state.tables.exists(&keys::table(&target)) {
            return Err(already_exists());
        }

        let source = backup.source;
        let billing_mode = input
            .billing_mode_override
            .unwrap_or_else(|| source.billing_mode.clone());
        let provisioned_throughput = input.provisioned_throughput_override.or(source
            .provisioned_throughput
            .filter(|_| billing_mode == BillingMode::Provisioned));
        let mut table = self.build_table(NewTable {
            name: target.clone(),
            key_schema: source.key_schema.clone(),
            attribute_definitions: source.attribute_definitions.clone(),
            provisioned_throughput,
            billing_mode: Some(billing_mode),
            global_secondary_indexes: source.global_secondary_indexes.clone(),
            local_secondary_indexes: source.local_secondary_indexes.clone(),
            stream_specification: source.stream_specification,
            sse_specification: None,
        })?;
        table.sse_description = match &input.sse_specification_override {
            Some(sse) => self.sse_description(sse),
            None => source.sse_description.clone(),
        };
        table.table_class = source.table_class;
        table.restore_summary = Some(RestoreSummary {
            source_backup_arn: Some(input.backup_arn.clone()),
            source_table_arn: Some(source.arn.clone()),
            restore_date_time: epoch_seconds(),
            restore_in_progress: false,
        });

        self.state
            .tables
            .insert_new(keys::table(&target), table.clone())
            .map_err(|_| already_exists())?;

        info!(table = %target, backup_arn = %input.backup_arn, "restored table from backup");
        Ok(RestoreTableFromBackupOutput {
            table_description: Some(table.to_description()),
        })
    }
}

fn backup_not_found(backup_arn: &str) -> DynamoDBError {
    dynamodb_error!(
        BackupNotFoundException,
        format!("Backup not found: {backup_arn}")
    )
}

/// Backup names are 1 to 255 characters from `[a-zA-Z0-9_.-]`.
fn validate_backup_name(name: &str) -> Result<(), DynamoDBError> {
    let valid_chars = name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-');
    if name.is_empty() || name.len() > 255 || !valid_chars {
        return Err(DynamoDBError::validation(format!(
            "1 validation error detected: Value '{name}' at 'backupName' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: [a-zA-Z0-9_.-]+ and \
             have length between 1 and 255"
        )));
    }
    Ok(())
}

fn source_table_details(table: &TableRecord) -> SourceTableDetails {
    SourceTableDetails {
        table_name: table.name.clone(),
        table_id: table.table_id.clone(),
        table_arn: Some(table.arn.clone()),
        table_size_bytes: Some(0),
        key_schema: table.key_schema.clone(),
        table_creation_date_time: table.created_at,
        provisioned_throughput: table.throughput(),
        item_count: Some(0),
        billing_mode: Some(table.billing_mode.clone()),
    }
}
