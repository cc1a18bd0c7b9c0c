//! ExportTableToPointInTime, DescribeExport, ListExports, ImportTable,
//! DescribeImport, ListImports.
//!
//! No data is copied. An export or import starts `IN_PROGRESS` and reports
//! `COMPLETED` from the first describe onward.

use mockstack_core::ids::epoch_seconds;
use mockstack_core::pagination::{page_size, paginate_by_index};
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::dynamodb_error;
use mockstack_dynamodb_model::input::{
    DescribeExportInput, DescribeImportInput, ExportTableToPointInTimeInput, ImportTableInput,
    ListExportsInput, ListImportsInput,
};
use mockstack_dynamodb_model::output::{
    DescribeExportOutput, DescribeImportOutput, ExportTableToPointInTimeOutput,
    ImportTableOutput, ListExportsOutput, ListImportsOutput,
};
use mockstack_dynamodb_model::transfer::{
    ExportDescription, ExportFormat, ExportStatus, ExportSummary, ExportType, ImportStatus,
    ImportSummary, ImportTableDescription,
};
use mockstack_dynamodb_model::types::TableStatus;
use tracing::info;

use super::tables::NewTable;
use super::{MockStackDynamoDB, timestamped_suffix};
use crate::state::keys;
use crate::validate::table_name_from_arn;

const MAX_LIST_TRANSFER_RESULTS: usize = 25;

impl MockStackDynamoDB {
    /// Handle `ExportTableToPointInTime`.
    ///
    /// Reusing a `ClientToken` with identical parameters returns the
    /// original export; with different parameters it is a conflict.
    pub fn handle_export_table_to_point_in_time(
        &self,
        input: ExportTableToPointInTimeInput,
    ) -> Result<ExportTableToPointInTimeOutput, DynamoDBError> {
        let table_name = table_name_from_arn(&input.table_arn)?;
        if input.s3_bucket.is_empty() {
            return Err(DynamoDBError::validation(
                "1 validation error detected: Value at 's3Bucket' failed to satisfy constraint: \
                 Member must not be null",
            ));
        }
        let table = self.require_table(&table_name)?;
        if !table.point_in_time_recovery_enabled {
            return Err(dynamodb_error!(
                PointInTimeRecoveryUnavailableException,
                format!("Point in time recovery is not enabled for table '{table_name}'")
            ));
        }

        let now = epoch_seconds();
        let export_time = input.export_time.unwrap_or(now);
        if export_time > now {
            return Err(DynamoDBError::validation(
                "ExportTime cannot be in the future",
            ));
        }
        let export_format = input.export_format.unwrap_or(ExportFormat::DynamodbJson);
        let export_type = input.export_type.unwrap_or(ExportType::FullExport);

        if let Some(token) = input.client_token.as_deref() {
            let previous = self
                .state
                .exports
                .list_values(keys::EXPORT_PREFIX)
                .into_iter()
                .find(|e| e.client_token.as_deref() == Some(token));
            if let Some(previous) = previous {
                let same_request = previous.table_arn == table.arn
                    && previous.s3_bucket == input.s3_bucket
                    && previous.s3_prefix == input.s3_prefix
                    && previous.export_format == export_format
                    && previous.export_type == export_type;
                if !same_request {
                    return Err(dynamodb_error!(
                        ExportConflictException,
                        format!(
                            "Export with client token {token} already exists with different \
                             parameters"
                        )
                    ));
                }
                return Ok(ExportTableToPointInTimeOutput {
                    export_description: previous,
                });
            }
        }

        let description = ExportDescription {
            export_arn: format!("{}/export/{}", table.arn, timestamped_suffix()),
            export_status: ExportStatus::InProgress,
            start_time: now,
            end_time: None,
            export_manifest: None,
            table_arn: table.arn.clone(),
            table_id: Some(table.table_id.clone()),
            export_time,
            client_token: input.client_token,
            s3_bucket: input.s3_bucket,
            s3_bucket_owner: input.s3_bucket_owner,
            s3_prefix: input.s3_prefix,
            s3_sse_algorithm: input.s3_sse_algorithm,
            s3_sse_kms_key_id: input.s3_sse_kms_key_id,
            export_format,
            billed_size_bytes: None,
            item_count: None,
            export_type,
        };
        self.state
            .exports
            .set(keys::export(&description.export_arn), description.clone());

        info!(table = %table_name, export_arn = %description.export_arn, "started export");
        Ok(ExportTableToPointInTimeOutput {
            export_description: description,
        })
    }

    /// Handle `DescribeExport`.
    pub fn handle_describe_export(
        &self,
        input: DescribeExportInput,
    ) -> Result<DescribeExportOutput, DynamoDBError> {
        let description = self
            .state
            .exports
            .update(&keys::export(&input.export_arn), |e| {
                if e.export_status == ExportStatus::InProgress {
                    complete_export(e);
                }
                e.clone()
            })
            .map_err(|_| {
                dynamodb_error!(
                    ExportNotFoundException,
                    format!("Export not found: {}", input.export_arn)
                )
            })?;
        Ok(DescribeExportOutput {
            export_description: description,
        })
    }

    /// Handle `ListExports`.
    pub fn handle_list_exports(
        &self,
        input: ListExportsInput,
    ) -> Result<ListExportsOutput, DynamoDBError> {
        validate_max_results("maxResults", input.max_results)?;
        let summaries: Vec<ExportSummary> = self
            .state
            .exports
            .list_values(keys::EXPORT_PREFIX)
            .into_iter()
            .filter(|e| {
                input
                    .table_arn
                    .as_deref()
                    .is_none_or(|arn| e.table_arn == arn)
            })
            .map(|e| ExportSummary {
                export_arn: e.export_arn,
                export_status: e.export_status,
                export_type: e.export_type,
            })
            .collect();
        let page = paginate_by_index(
            summaries,
            input.next_token.as_deref(),
            page_size(
                input.max_results,
                MAX_LIST_TRANSFER_RESULTS,
                MAX_LIST_TRANSFER_RESULTS,
            ),
        )
        .map_err(|e| DynamoDBError::validation(e.to_string()))?;
        Ok(ListExportsOutput {
            export_summaries: page.items,
            next_token: page.next_token,
        })
    }

    /// Handle `ImportTable`. The target table is created immediately in
    /// `CREATING` state.
    pub fn handle_import_table(
        &self,
        input: ImportTableInput,
    ) -> Result<ImportTableOutput, DynamoDBError> {
        let params = input.table_creation_parameters;
        if let Some(token) = input.client_token.as_deref() {
            let previous = self
                .state
                .imports
                .list_values(keys::IMPORT_PREFIX)
                .into_iter()
                .find(|i| {
                    i.client_token.as_deref() == Some(token)
                        && i.table_creation_parameters.table_name == params.table_name
                });
            if let Some(previous) = previous {
                return Ok(ImportTableOutput {
                    import_table_description: previous,
                });
            }
        }
        if input.s3_bucket_source.s3_bucket.is_empty() {
            return Err(DynamoDBError::validation(
                "1 validation error detected: Value at 's3BucketSource.s3Bucket' failed to \
                 satisfy constraint: Member must not be null",
            ));
        }

        let table = self.build_table(NewTable {
            name: params.table_name.clone(),
            key_schema: params.key_schema.clone(),
            attribute_definitions: params.attribute_definitions.clone(),
            billing_mode: params.billing_mode.clone(),
            provisioned_throughput: params.provisioned_throughput,
            global_secondary_indexes: params.global_secondary_indexes.clone(),
            sse_specification: params.sse_specification.clone(),
            ..NewTable::default()
        })?;
        if table.key_schema.is_empty() {
            return Err(DynamoDBError::validation(
                "One or more parameter values were invalid: KeySchema must be specified",
            ));
        }

        let description = ImportTableDescription {
            import_arn: format!("{}/import/{}", table.arn, timestamped_suffix()),
            import_status: ImportStatus::InProgress,
            table_arn: table.arn.clone(),
            table_id: Some(table.table_id.clone()),
            client_token: input.client_token,
            s3_bucket_source: input.s3_bucket_source,
            error_count: 0,
            cloud_watch_log_group_arn: Some(format!(
                "arn:aws:logs:{}:{}:log-group:/aws-dynamodb/imports:*",
                self.config.default_region, self.config.account_id
            )),
            input_format: input.input_format,
            input_compression_type: input.input_compression_type,
            table_creation_parameters: params,
            start_time: table.created_at,
            end_time: None,
            processed_size_bytes: 0,
            processed_item_count: 0,
            imported_item_count: 0,
        };

        let name = table.name.clone();
        self.state
            .tables
            .insert_new(keys::table(&name), table)
            .map_err(|_| DynamoDBError::resource_in_use(format!("Table already exists: {name}")))?;
        self.state
            .imports
            .set(keys::import(&description.import_arn), description.clone());

        info!(table = %name, import_arn = %description.import_arn, "started import");
        Ok(ImportTableOutput {
            import_table_description: description,
        })
    }

    /// Handle `DescribeImport`. Completing an import activates its table.
    pub fn handle_describe_import(
        &self,
        input: DescribeImportInput,
    ) -> Result<DescribeImportOutput, DynamoDBError> {
        let description = self
            .state
            .imports
            .update(&keys::import(&input.import_arn), |i| {
                if i.import_status == ImportStatus::InProgress {
                    i.import_status = ImportStatus::Completed;
                    i.end_time = Some(epoch_seconds());
                }
                i.clone()
            })
            .map_err(|_| {
                dynamodb_error!(
                    ImportNotFoundException,
                    format!("Import not found: {}", input.import_arn)
                )
            })?;

        let table_name = &description.table_creation_parameters.table_name;
        // The table may have been deleted since the import started.
        let _ = self.update_table_record(table_name, |t| {
            if t.status == TableStatus::Creating {
                t.status = TableStatus::Active;
            }
            Ok(())
        });
        Ok(DescribeImportOutput {
            import_table_description: description,
        })
    }

    /// Handle `ListImports`.
    pub fn handle_list_imports(
        &self,
        input: ListImportsInput,
    ) -> Result<ListImportsOutput, DynamoDBError> {
        validate_max_results("pageSize", input.page_size)?;
        let summaries: Vec<ImportSummary> = self
            .state
            .imports
            .list_values(keys::IMPORT_PREFIX)
            .iter()
            .filter(|i| {
                input
                    .table_arn
                    .as_deref()
                    .is_none_or(|arn| i.table_arn == arn)
            })
            .map(ImportSummary::from_description)
            .collect();
        let page = paginate_by_index(
            summaries,
            input.next_token.as_deref(),
            page_size(
                input.page_size,
                MAX_LIST_TRANSFER_RESULTS,
                MAX_LIST_TRANSFER_RESULTS,
            ),
        )
        .map_err(|e| DynamoDBError::validation(e.to_string()))?;
        Ok(ListImportsOutput {
            import_summary_list: page.items,
            next_token: page.next_token,
        })
    }
}

fn complete_export(export: &mut ExportDescription) {
    let export_id = export
        .export_arn
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_owned();
    let prefix = export
        .s3_prefix
        .as_deref()
        .map(|p| format!("{}/", p.trim_end_matches('/')))
        .unwrap_or_default();
    export.export_status = ExportStatus::Completed;
    export.end_time = Some(epoch_seconds());
    export.export_manifest = Some(format!(
        "{prefix}AWSDynamoDB/{export_id}/manifest-summary.json"
    ));
    export.billed_size_bytes = Some(0);
    export.item_count = Some(0);
}

fn validate_max_results(member: &str, value: Option<i32>) -> Result<(), DynamoDBError> {
    match value {
        Some(v) if !(1..=25).contains(&v) => Err(DynamoDBError::validation(format!(
            "1 validation error detected: Value '{v}' at '{member}' failed to satisfy \
             constraint: Member must have value between 1 and 25"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use mockstack_dynamodb_model::DynamoDBErrorCode;
    use mockstack_dynamodb_model::input::{DescribeTableInput, UpdateContinuousBackupsInput};
    use mockstack_dynamodb_model::transfer::{InputFormat, S3BucketSource, TableCreationParameters};
    use mockstack_dynamodb_model::types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType,
        PointInTimeRecoverySpecification, ProvisionedThroughput, ScalarAttributeType,
    };

    use super::*;
    use crate::provider::test_util::provider_with_table;

    const TABLE_ARN: &str = "arn:aws:dynamodb:us-east-1:000000000000:table/T";

    fn enable_pitr(p: &MockStackDynamoDB) {
        p.handle_update_continuous_backups(UpdateContinuousBackupsInput {
            table_name: "T".to_owned(),
            point_in_time_recovery_specification: PointInTimeRecoverySpecification {
                point_in_time_recovery_enabled: true,
                recovery_period_in_days: None,
            },
        })
        .unwrap();
    }

    fn export_input(token: Option<&str>, bucket: &str) -> ExportTableToPointInTimeInput {
        ExportTableToPointInTimeInput {
            table_arn: TABLE_ARN.to_owned(),
            s3_bucket: bucket.to_owned(),
            client_token: token.map(str::to_owned),
            ..ExportTableToPointInTimeInput::default()
        }
    }

    fn import_input(table: &str) -> ImportTableInput {
        ImportTableInput {
            client_token: None,
            s3_bucket_source: S3BucketSource {
                s3_bucket: "bucket".to_owned(),
                s3_bucket_owner: None,
                s3_key_prefix: Some("data/".to_owned()),
            },
            input_format: InputFormat::Csv,
            input_compression_type: None,
            table_creation_parameters: TableCreationParameters {
                table_name: table.to_owned(),
                attribute_definitions: vec![AttributeDefinition {
                    attribute_name: "id".to_owned(),
                    attribute_type: ScalarAttributeType::S,
                }],
                key_schema: vec![KeySchemaElement {
                    attribute_name: "id".to_owned(),
                    key_type: KeyType::Hash,
                }],
                billing_mode: None,
                provisioned_throughput: None,
                sse_specification: None,
                global_secondary_indexes: Vec::new(),
            },
        }
    }

    #[test]
    fn test_should_require_pitr_for_export() {
        let p = provider_with_table("T");
        let err = p
            .handle_export_table_to_point_in_time(export_input(None, "bucket"))
            .unwrap_err();
        assert_eq!(
            err.code,
            DynamoDBErrorCode::PointInTimeRecoveryUnavailableException
        );
    }

    #[test]
    fn test_should_complete_export_on_describe() {
        let p = provider_with_table("T");
        enable_pitr(&p);
        let started = p
            .handle_export_table_to_point_in_time(export_input(None, "bucket"))
            .unwrap()
            .export_description;
        assert_eq!(started.export_status, ExportStatus::InProgress);
        assert!(started.export_arn.starts_with(&format!("{TABLE_ARN}/export/")));
        assert_eq!(started.export_format, ExportFormat::DynamodbJson);

        let described = p
            .handle_describe_export(DescribeExportInput {
                export_arn: started.export_arn.clone(),
            })
            .unwrap()
            .export_description;
        assert_eq!(described.export_status, ExportStatus::Completed);
        assert!(described.end_time.is_some());
        assert!(described.export_manifest.is_some());
    }

    #[test]
    fn test_should_dedupe_and_conflict_on_client_token() {
        let p = provider_with_table("T");
        enable_pitr(&p);
        let first = p
            .handle_export_table_to_point_in_time(export_input(Some("tok"), "bucket"))
            .unwrap()
            .export_description;
        let again = p
            .handle_export_table_to_point_in_time(export_input(Some("tok"), "bucket"))
            .unwrap()
            .export_description;
        assert_eq!(first.export_arn, again.export_arn);

        let err = p
            .handle_export_table_to_point_in_time(export_input(Some("tok"), "other"))
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ExportConflictException);
    }

    #[test]
    fn test_should_list_exports_and_report_missing_export() {
        let p = provider_with_table("T");
        enable_pitr(&p);
        p.handle_export_table_to_point_in_time(export_input(None, "a"))
            .unwrap();
        p.handle_export_table_to_point_in_time(export_input(None, "b"))
            .unwrap();
        let out = p
            .handle_list_exports(ListExportsInput {
                table_arn: Some(TABLE_ARN.to_owned()),
                max_results: Some(1),
                next_token: None,
            })
            .unwrap();
        assert_eq!(out.export_summaries.len(), 1);
        assert!(out.next_token.is_some());

        let err = p
            .handle_describe_export(DescribeExportInput {
                export_arn: format!("{TABLE_ARN}/export/missing"),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ExportNotFoundException);
    }

    #[test]
    fn test_should_import_into_new_table() {
        let p = provider_with_table("T");
        let started = p
            .handle_import_table(import_input("Imported"))
            .unwrap()
            .import_table_description;
        assert_eq!(started.import_status, ImportStatus::InProgress);

        let described = p
            .handle_describe_import(DescribeImportInput {
                import_arn: started.import_arn.clone(),
            })
            .unwrap()
            .import_table_description;
        assert_eq!(described.import_status, ImportStatus::Completed);

        let table = p
            .handle_describe_table(DescribeTableInput {
                table_name: "Imported".to_owned(),
            })
            .unwrap()
            .table
            .unwrap();
        assert_eq!(table.table_status, Some(TableStatus::Active));

        let listed = p.handle_list_imports(ListImportsInput::default()).unwrap();
        assert_eq!(listed.import_summary_list.len(), 1);
    }

    #[test]
    fn test_should_keep_provisioned_billing_of_imported_table() {
        let p = provider_with_table("T");
        let mut input = import_input("Provisioned");
        input.table_creation_parameters.billing_mode = Some(BillingMode::Provisioned);
        input.table_creation_parameters.provisioned_throughput = Some(ProvisionedThroughput {
            read_capacity_units: 5,
            write_capacity_units: 7,
        });
        let started = p
            .handle_import_table(input)
            .unwrap()
            .import_table_description;
        assert_eq!(
            started.table_creation_parameters.billing_mode,
            Some(BillingMode::Provisioned)
        );

        let table = p
            .handle_describe_table(DescribeTableInput {
                table_name: "Provisioned".to_owned(),
            })
            .unwrap()
            .table
            .unwrap();
        assert_eq!(
            table.billing_mode_summary.unwrap().billing_mode,
            Some(BillingMode::Provisioned)
        );
        assert_eq!(table.provisioned_throughput.unwrap().write_capacity_units, 7);
    }

    #[test]
    fn test_should_refuse_import_over_existing_table() {
        let p = provider_with_table("T");
        let err = p.handle_import_table(import_input("T")).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceInUseException);
        let err = p
            .handle_describe_import(DescribeImportInput {
                import_arn: "arn:aws:dynamodb:us-east-1:000000000000:table/T/import/x".to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ImportNotFoundException);
    }
}
