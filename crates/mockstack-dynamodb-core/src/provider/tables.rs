//! CreateTable, DescribeTable, DeleteTable, ListTables, UpdateTable.

use std::collections::HashSet;

use mockstack_core::ids::epoch_seconds;
use mockstack_core::pagination::{paginate_after_key, page_size};
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::input::{
    CreateTableInput, DeleteTableInput, DescribeTableInput, ListTablesInput, UpdateTableInput,
};
use mockstack_dynamodb_model::output::{
    CreateTableOutput, DeleteTableOutput, DescribeTableOutput, ListTablesOutput,
    UpdateTableOutput,
};
use mockstack_dynamodb_model::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    LocalSecondaryIndex, ProvisionedThroughput, SSEDescription, SSESpecification, SseStatus,
    SseType, StreamSpecification, TableStatus,
};
use tracing::info;

use super::MockStackDynamoDB;
use crate::state::{ResourcePolicyRecord, TableRecord, keys};
use crate::validate::{
    validate_attribute_definitions, validate_billing_mode, validate_key_attributes_defined,
    validate_key_schema_structure, validate_policy_document, validate_table_name,
    validate_throughput,
};

const MAX_LIST_TABLES_LIMIT: usize = 100;

/// Everything needed to create a table, shared by `CreateTable`,
/// `RestoreTableFromBackup` and `ImportTable`.
#[derive(Debug, Default)]
pub(crate) struct NewTable {
    pub name: String,
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub billing_mode: Option<BillingMode>,
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
    pub stream_specification: Option<StreamSpecification>,
    pub sse_specification: Option<SSESpecification>,
}

impl MockStackDynamoDB {
    /// Validate a table definition and build its record. Nothing is stored.
    pub(crate) fn build_table(&self, definition: NewTable) -> Result<TableRecord, DynamoDBError> {
        validate_table_name(&definition.name)?;
        validate_attribute_definitions(&definition.attribute_definitions)?;
        if !definition.key_schema.is_empty() {
            validate_key_schema_structure(&definition.key_schema)?;
            validate_key_attributes_defined(&definition.key_schema, &definition.attribute_definitions)?;
        }

        let mut index_names = HashSet::new();
        for gsi in &definition.global_secondary_indexes {
            validate_index(&gsi.index_name, &gsi.key_schema, &definition, &mut index_names)?;
            if let Some(pt) = &gsi.provisioned_throughput {
                validate_throughput(pt)?;
            }
        }
        for lsi in &definition.local_secondary_indexes {
            validate_index(&lsi.index_name, &lsi.key_schema, &definition, &mut index_names)?;
            let table_hash = definition.key_schema.first().map(|e| &e.attribute_name);
            let index_hash = lsi.key_schema.first().map(|e| &e.attribute_name);
            if definition.key_schema.len() < 2 || table_hash != index_hash {
                return Err(DynamoDBError::validation(format!(
                    "One or more parameter values were invalid: Table KeySchema does not have a \
                     range key, or the local secondary index {} does not share the table's \
                     hash key",
                    lsi.index_name
                )));
            }
        }

        let billing_mode = validate_billing_mode(
            definition.billing_mode.as_ref(),
            definition.provisioned_throughput.as_ref(),
        )?;

        let now = epoch_seconds();
        let mut table = TableRecord::new(&definition.name, self.table_arn(&definition.name), now);
        table.key_schema = definition.key_schema;
        table.attribute_definitions = definition.attribute_definitions;
        table.provisioned_throughput = match billing_mode {
            BillingMode::Provisioned => definition.provisioned_throughput,
            _ => None,
        };
        table.billing_mode = billing_mode;
        table.global_secondary_indexes = definition.global_secondary_indexes;
        table.local_secondary_indexes = definition.local_secondary_indexes;
        if let Some(stream) = definition.stream_specification {
            if stream.stream_enabled {
                table.latest_stream_label = Some(stream_label());
            }
            table.stream_specification = Some(stream);
        }
        table.sse_description = definition
            .sse_specification
            .as_ref()
            .and_then(|sse| self.sse_description(sse));
        Ok(table)
    }

    /// Build the encryption description for a KMS or AES256 specification.
    pub(crate) fn sse_description(&self, sse: &SSESpecification) -> Option<SSEDescription> {
        if sse.enabled != Some(true) {
            return None;
        }
        let sse_type = sse.sse_type.unwrap_or(SseType::Kms);
        let kms_master_key_arn = (sse_type == SseType::Kms).then(|| match &sse.kms_master_key_id {
            Some(id) if id.starts_with("arn:") => id.clone(),
            Some(id) => format!(
                "arn:aws:kms:{}:{}:key/{id}",
                self.config.default_region, self.config.account_id
            ),
            None => format!(
                "arn:aws:kms:{}:{}:key/{}",
                self.config.default_region,
                self.config.account_id,
                mockstack_core::ids::request_id()
            ),
        });
        Some(SSEDescription {
            status: Some(SseStatus::Enabled),
            sse_type: Some(sse_type),
            kms_master_key_arn,
        })
    }

    /// Handle `CreateTable`.
    pub fn handle_create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, DynamoDBError> {
        let mut table = self.build_table(NewTable {
            name: input.table_name,
            key_schema: input.key_schema,
            attribute_definitions: input.attribute_definitions,
            billing_mode: input.billing_mode,
            provisioned_throughput: input.provisioned_throughput,
            global_secondary_indexes: input.global_secondary_indexes,
            local_secondary_indexes: input.local_secondary_indexes,
            stream_specification: input.stream_specification,
            sse_specification: input.sse_specification,
        })?;
        if let Some(class) = input.table_class {
            table.table_class = class;
        }
        table.deletion_protection_enabled = input.deletion_protection_enabled.unwrap_or(false);
        table.tags = input
            .tags
            .into_iter()
            .map(|t| (t.key, t.value))
            .collect();
        if let Some(policy) = &input.resource_policy {
            validate_policy_document(policy)?;
        }

        let name = table.name.clone();
        self.state
            .tables
            .insert_new(keys::table(&name), table.clone())
            .map_err(|_| DynamoDBError::resource_in_use(format!("Table already exists: {name}")))?;

        if let Some(policy) = input.resource_policy {
            self.state.resource_policies.set(
                keys::resource_policy(&table.arn),
                ResourcePolicyRecord {
                    resource_arn: table.arn.clone(),
                    policy,
                    revision_id: self.state.revisions.next(),
                },
            );
        }

        info!(table = %name, billing_mode = %table.billing_mode, "created table");
        Ok(CreateTableOutput {
            table_description: Some(table.to_description()),
        })
    }

    /// Handle `DescribeTable`. A `CREATING` table becomes `ACTIVE` here.
    pub fn handle_describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, DynamoDBError> {
        let table = self.update_table_record(&input.table_name, |t| {
            if t.status == TableStatus::Creating {
                t.status = TableStatus::Active;
            }
            Ok(t.clone())
        })?;
        Ok(DescribeTableOutput {
            table: Some(table.to_description()),
        })
    }

    /// Handle `DeleteTable`.
    pub fn handle_delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, DynamoDBError> {
        let table = self.require_table(&input.table_name)?;
        if table.deletion_protection_enabled {
            return Err(DynamoDBError::validation(format!(
                "Resource cannot be deleted as it is currently protected against deletion. \
                 Disable deletion protection first. Table: {}",
                table.name
            )));
        }
        let mut removed = self
            .state
            .tables
            .delete(&keys::table(&input.table_name))
            .ok_or_else(|| DynamoDBError::table_not_found(&input.table_name))?;
        removed.status = TableStatus::Deleting;

        info!(table = %input.table_name, "deleted table");
        Ok(DeleteTableOutput {
            table_description: Some(removed.to_description()),
        })
    }

    /// Handle `ListTables`.
    pub fn handle_list_tables(
        &self,
        input: ListTablesInput,
    ) -> Result<ListTablesOutput, DynamoDBError> {
        if let Some(limit) = input.limit {
            if limit < 1 {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{limit}' at 'limit' failed to satisfy \
                     constraint: Member must have value greater than or equal to 1"
                )));
            }
            if limit > 100 {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{limit}' at 'limit' failed to satisfy \
                     constraint: Member must have value less than or equal to 100"
                )));
            }
        }
        let names: Vec<String> = self
            .state
            .tables
            .list(keys::TABLE_PREFIX)
            .into_iter()
            .filter_map(|k| k.strip_prefix(keys::TABLE_PREFIX).map(str::to_owned))
            .collect();
        let page = paginate_after_key(
            names,
            input.exclusive_start_table_name.as_deref(),
            page_size(input.limit, MAX_LIST_TABLES_LIMIT, MAX_LIST_TABLES_LIMIT),
            String::as_str,
        );
        Ok(ListTablesOutput {
            table_names: page.items,
            last_evaluated_table_name: page.next_token,
        })
    }

    /// Handle `UpdateTable`.
    pub fn handle_update_table(
        &self,
        input: UpdateTableInput,
    ) -> Result<UpdateTableOutput, DynamoDBError> {
        let nothing_to_update = input.attribute_definitions.is_empty()
            && input.billing_mode.is_none()
            && input.provisioned_throughput.is_none()
            && input.stream_specification.is_none()
            && input.sse_specification.is_none()
            && input.table_class.is_none()
            && input.deletion_protection_enabled.is_none();
        if nothing_to_update {
            return Err(DynamoDBError::validation(
                "At least one of ProvisionedThroughput, BillingMode, UpdateStreamEnabled, \
                 GlobalSecondaryIndexUpdates, SSESpecification, TableClass or \
                 DeletionProtectionEnabled must be specified",
            ));
        }
        validate_attribute_definitions(&input.attribute_definitions)?;
        let sse_description = input
            .sse_specification
            .as_ref()
            .map(|sse| self.sse_description(sse));

        let table = self.update_table_record(&input.table_name, |t| {
            let now = epoch_seconds();

            for def in input.attribute_definitions {
                match t
                    .attribute_definitions
                    .iter_mut()
                    .find(|d| d.attribute_name == def.attribute_name)
                {
                    Some(existing) => *existing = def,
                    None => t.attribute_definitions.push(def),
                }
            }

            if input.billing_mode.is_some() || input.provisioned_throughput.is_some() {
                let requested = input
                    .billing_mode
                    .clone()
                    .unwrap_or_else(|| t.billing_mode.clone());
                let throughput = match requested {
                    BillingMode::Provisioned => {
                        input.provisioned_throughput.or(t.provisioned_throughput)
                    }
                    _ => input.provisioned_throughput,
                };
                let mode = validate_billing_mode(Some(&requested), throughput.as_ref())?;
                if mode != t.billing_mode {
                    t.billing_mode_updated_at = Some(now);
                }
                t.provisioned_throughput = throughput.filter(|_| mode == BillingMode::Provisioned);
                t.billing_mode = mode;
            }

            if let Some(stream) = input.stream_specification {
                let currently_enabled = t.stream_specification.is_some_and(|s| s.stream_enabled);
                if stream.stream_enabled && currently_enabled {
                    return Err(DynamoDBError::validation(format!(
                        "Table already has an enabled stream: {}",
                        t.arn
                    )));
                }
                if !stream.stream_enabled && !currently_enabled {
                    return Err(DynamoDBError::validation(
                        "Table already has no enabled stream",
                    ));
                }
                if stream.stream_enabled {
                    t.latest_stream_label = Some(stream_label());
                }
                t.stream_specification = Some(stream);
            }

            if let Some(sse) = sse_description {
                t.sse_description = sse;
            }

            if let Some(class) = input.table_class {
                if class != t.table_class {
                    t.table_class = class;
                    t.table_class_updated_at = Some(now);
                }
            }

            if let Some(enabled) = input.deletion_protection_enabled {
                t.deletion_protection_enabled = enabled;
            }

            Ok(t.clone())
        })?;

        info!(table = %table.name, "updated table");
        Ok(UpdateTableOutput {
            table_description: Some(table.to_description()),
        })
    }
}

/// Each secondary index: unique name, well-formed key schema, defined attributes.
fn validate_index<'a>(
    index_name: &'a str,
    key_schema: &[KeySchemaElement],
    table: &NewTable,
    seen: &mut HashSet<&'a str>,
) -> Result<(), DynamoDBError> {
    if index_name.len() < 3 || index_name.len() > 255 {
        return Err(DynamoDBError::validation(format!(
            "IndexName must be at least 3 characters long and at most 255 characters long, \
             but was {} characters",
            index_name.len()
        )));
    }
    if !seen.insert(index_name) {
        return Err(DynamoDBError::validation(format!(
            "One or more parameter values were invalid: Duplicate index name: {index_name}"
        )));
    }
    validate_key_schema_structure(key_schema)?;
    validate_key_attributes_defined(key_schema, &table.attribute_definitions)
}

/// Stream labels are the creation timestamp in ISO 8601 with milliseconds.
fn stream_label() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use mockstack_dynamodb_model::DynamoDBErrorCode;
    use mockstack_dynamodb_model::types::{KeyType, Projection, ScalarAttributeType, TableClass, Tag};

    use super::*;
    use crate::provider::test_util::{create_table_input, provider, provider_with_table};

    #[test]
    fn test_should_create_then_describe_active_table() {
        let p = provider();
        let created = p
            .handle_create_table(create_table_input("T"))
            .unwrap()
            .table_description
            .unwrap();
        assert_eq!(created.table_status, Some(TableStatus::Creating));

        let described = p
            .handle_describe_table(DescribeTableInput {
                table_name: "T".to_owned(),
            })
            .unwrap()
            .table
            .unwrap();
        assert_eq!(described.table_status, Some(TableStatus::Active));
        assert_eq!(described.table_name, created.table_name);
        assert_eq!(described.key_schema, created.key_schema);
        assert_eq!(described.table_arn, created.table_arn);
        assert_eq!(described.table_id, created.table_id);
        assert_eq!(
            described.table_arn.as_deref(),
            Some("arn:aws:dynamodb:us-east-1:000000000000:table/T")
        );
    }

    #[test]
    fn test_should_reject_duplicate_table() {
        let p = provider_with_table("T");
        let err = p.handle_create_table(create_table_input("T")).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceInUseException);
    }

    #[test]
    fn test_should_create_table_with_name_only() {
        let p = provider();
        let out = p
            .handle_create_table(CreateTableInput {
                table_name: "Bare".to_owned(),
                ..CreateTableInput::default()
            })
            .unwrap();
        assert!(out.table_description.unwrap().key_schema.is_empty());
    }

    #[test]
    fn test_should_reject_undefined_key_attribute() {
        let p = provider();
        let mut input = create_table_input("T");
        input.attribute_definitions.clear();
        let err = p.handle_create_table(input).unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
    }

    #[test]
    fn test_should_seed_tags_and_index_arns() {
        let p = provider();
        let mut input = create_table_input("T");
        input.tags = vec![Tag {
            key: "env".to_owned(),
            value: "dev".to_owned(),
        }];
        input.attribute_definitions.push(AttributeDefinition {
            attribute_name: "gsk".to_owned(),
            attribute_type: ScalarAttributeType::N,
        });
        input.global_secondary_indexes = vec![GlobalSecondaryIndex {
            index_name: "by-gsk".to_owned(),
            key_schema: vec![KeySchemaElement {
                attribute_name: "gsk".to_owned(),
                key_type: KeyType::Hash,
            }],
            projection: Projection::default(),
            provisioned_throughput: None,
        }];
        let desc = p.handle_create_table(input).unwrap().table_description.unwrap();
        assert_eq!(
            desc.global_secondary_indexes[0].index_arn.as_deref(),
            Some("arn:aws:dynamodb:us-east-1:000000000000:table/T/index/by-gsk")
        );
        let stored = p.require_table("T").unwrap();
        assert_eq!(stored.tags.get("env"), Some("dev"));
    }

    #[test]
    fn test_should_refuse_deleting_protected_table() {
        let p = provider();
        let mut input = create_table_input("T");
        input.deletion_protection_enabled = Some(true);
        p.handle_create_table(input).unwrap();
        let err = p
            .handle_delete_table(DeleteTableInput {
                table_name: "T".to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
        assert!(p.require_table("T").is_ok());
    }

    #[test]
    fn test_should_delete_table_and_report_deleting() {
        let p = provider_with_table("T");
        let desc = p
            .handle_delete_table(DeleteTableInput {
                table_name: "T".to_owned(),
            })
            .unwrap()
            .table_description
            .unwrap();
        assert_eq!(desc.table_status, Some(TableStatus::Deleting));
        let err = p
            .handle_describe_table(DescribeTableInput {
                table_name: "T".to_owned(),
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_page_through_tables_without_gaps() {
        let p = provider();
        for name in ["a1", "b2", "c3", "d4", "e5"] {
            p.handle_create_table(create_table_input(name)).unwrap();
        }
        let mut seen = Vec::new();
        let mut start = None;
        loop {
            let out = p
                .handle_list_tables(ListTablesInput {
                    exclusive_start_table_name: start,
                    limit: Some(2),
                })
                .unwrap();
            seen.extend(out.table_names);
            match out.last_evaluated_table_name {
                Some(next) => start = Some(next),
                None => break,
            }
        }
        assert_eq!(seen, vec!["a1", "b2", "c3", "d4", "e5"]);
    }

    #[test]
    fn test_should_reject_list_limit_over_100() {
        let p = provider();
        let err = p
            .handle_list_tables(ListTablesInput {
                exclusive_start_table_name: None,
                limit: Some(101),
            })
            .unwrap_err();
        assert!(err.message.contains("less than or equal to 100"));
    }

    #[test]
    fn test_should_switch_billing_mode_and_table_class() {
        let p = provider_with_table("T");
        let out = p
            .handle_update_table(UpdateTableInput {
                table_name: "T".to_owned(),
                billing_mode: Some(BillingMode::Provisioned),
                provisioned_throughput: Some(ProvisionedThroughput {
                    read_capacity_units: 5,
                    write_capacity_units: 10,
                }),
                table_class: Some(TableClass::StandardInfrequentAccess),
                ..UpdateTableInput::default()
            })
            .unwrap()
            .table_description
            .unwrap();
        let pt = out.provisioned_throughput.unwrap();
        assert_eq!(pt.write_capacity_units, 10);
        assert_eq!(
            out.table_class_summary.unwrap().table_class,
            TableClass::StandardInfrequentAccess
        );
    }

    #[test]
    fn test_should_reject_enabling_enabled_stream() {
        let p = provider_with_table("T");
        let enable = || UpdateTableInput {
            table_name: "T".to_owned(),
            stream_specification: Some(StreamSpecification {
                stream_enabled: true,
                stream_view_type: None,
            }),
            ..UpdateTableInput::default()
        };
        let desc = p.handle_update_table(enable()).unwrap();
        assert!(desc.table_description.unwrap().latest_stream_arn.is_some());
        assert!(p.handle_update_table(enable()).is_err());
    }

    #[test]
    fn test_should_reject_empty_update() {
        let p = provider_with_table("T");
        let err = p
            .handle_update_table(UpdateTableInput {
                table_name: "T".to_owned(),
                ..UpdateTableInput::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ValidationException);
    }

    #[test]
    fn test_should_update_missing_table_with_not_found() {
        let p = provider();
        let err = p
            .handle_update_table(UpdateTableInput {
                table_name: "Nope".to_owned(),
                deletion_protection_enabled: Some(true),
                ..UpdateTableInput::default()
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }
}
