//! Global tables (version 2017.11.29). Replicas are bookkeeping only.

use std::collections::HashSet;

use mockstack_core::ids::epoch_seconds;
use mockstack_core::pagination::{paginate_after_key, page_size};
use mockstack_core::Arn;
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::dynamodb_error;
use mockstack_dynamodb_model::global_table::{
    GlobalTable, GlobalTableDescription, GlobalTableStatus, ReplicaDescription, ReplicaStatus,
};
use mockstack_dynamodb_model::input::{
    CreateGlobalTableInput, DescribeGlobalTableInput, ListGlobalTablesInput,
    UpdateGlobalTableInput,
};
use mockstack_dynamodb_model::output::{
    CreateGlobalTableOutput, DescribeGlobalTableOutput, ListGlobalTablesOutput,
    UpdateGlobalTableOutput,
};
use tracing::info;

use super::MockStackDynamoDB;
use crate::state::keys;
use crate::validate::validate_table_name;

const MAX_LIST_GLOBAL_TABLES_LIMIT: usize = 100;

impl MockStackDynamoDB {
    /// Handle `CreateGlobalTable`.
    pub fn handle_create_global_table(
        &self,
        input: CreateGlobalTableInput,
    ) -> Result<CreateGlobalTableOutput, DynamoDBError> {
        validate_table_name(&input.global_table_name)?;
        let mut regions = HashSet::new();
        for replica in &input.replication_group {
            if !regions.insert(replica.region_name.as_str()) {
                return Err(DynamoDBError::validation(format!(
                    "Duplicate region in ReplicationGroup: {}",
                    replica.region_name
                )));
            }
        }

        let description = GlobalTableDescription {
            global_table_name: input.global_table_name.clone(),
            global_table_arn: Arn::new(
                "dynamodb",
                "",
                self.config.account_id.as_str(),
                format!("global-table/{}", input.global_table_name),
            )
            .to_string(),
            global_table_status: GlobalTableStatus::Active,
            creation_date_time: epoch_seconds(),
            replication_group: input
                .replication_group
                .into_iter()
                .map(|r| active_replica(r.region_name))
                .collect(),
        };

        self.state
            .global_tables
            .insert_new(
                keys::global_table(&input.global_table_name),
                description.clone(),
            )
            .map_err(|_| {
                dynamodb_error!(
                    GlobalTableAlreadyExistsException,
                    format!(
                        "Global table with this name already exists: {}",
                        input.global_table_name
                    )
                )
            })?;

        info!(
            global_table = %input.global_table_name,
            replicas = description.replication_group.len(),
            "created global table"
        );
        Ok(CreateGlobalTableOutput {
            global_table_description: description,
        })
    }

    /// Handle `DescribeGlobalTable`.
    pub fn handle_describe_global_table(
        &self,
        input: DescribeGlobalTableInput,
    ) -> Result<DescribeGlobalTableOutput, DynamoDBError> {
        let description = self
            .state
            .global_tables
            .find(&keys::global_table(&input.global_table_name))
            .ok_or_else(|| global_table_not_found(&input.global_table_name))?;
        Ok(DescribeGlobalTableOutput {
            global_table_description: description,
        })
    }

    /// Handle `UpdateGlobalTable`. Updates apply in order and all-or-nothing.
    pub fn handle_update_global_table(
        &self,
        input: UpdateGlobalTableInput,
    ) -> Result<UpdateGlobalTableOutput, DynamoDBError> {
        let name = input.global_table_name;
        let key = keys::global_table(&name);
        if !self.state.global_tables.exists(&key) {
            return Err(global_table_not_found(&name));
        }
        let description = self
            .state
            .global_tables
            .try_update(&key, |desc| {
                for update in input.replica_updates {
                    match (update.create, update.delete) {
                        (Some(create), None) => {
                            if has_replica(desc, &create.region_name) {
                                return Err(dynamodb_error!(
                                    ReplicaAlreadyExistsException,
                                    format!(
                                        "Replica already exists in region {} for global table {name}",
                                        create.region_name
                                    )
                                ));
                            }
                            desc.replication_group
                                .push(active_replica(create.region_name));
                        }
                        (None, Some(delete)) => {
                            if !has_replica(desc, &delete.region_name) {
                                return Err(dynamodb_error!(
                                    ReplicaNotFoundException,
                                    format!(
                                        "Replica not found in region {} for global table {name}",
                                        delete.region_name
                                    )
                                ));
                            }
                            desc.replication_group
                                .retain(|r| r.region_name != delete.region_name);
                        }
                        _ => {
                            return Err(DynamoDBError::validation(
                                "Each ReplicaUpdate must specify exactly one of Create or Delete",
                            ));
                        }
                    }
                }
                Ok(desc.clone())
            })?;

        info!(global_table = %name, "updated global table");
        Ok(UpdateGlobalTableOutput {
            global_table_description: description,
        })
    }

    /// Handle `ListGlobalTables`.
    pub fn handle_list_global_tables(
        &self,
        input: ListGlobalTablesInput,
    ) -> Result<ListGlobalTablesOutput, DynamoDBError> {
        if let Some(limit) = input.limit {
            if limit < 1 {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{limit}' at 'limit' failed to satisfy \
                     constraint: Member must have value greater than or equal to 1"
                )));
            }
        }
        let tables: Vec<GlobalTable> = self
            .state
            .global_tables
            .list_values(keys::GLOBAL_TABLE_PREFIX)
            .iter()
            .filter(|d| {
                input
                    .region_name
                    .as_deref()
                    .is_none_or(|region| has_replica(d, region))
            })
            .map(GlobalTable::from_description)
            .collect();

        let page = paginate_after_key(
            tables,
            input.exclusive_start_global_table_name.as_deref(),
            page_size(
                input.limit,
                MAX_LIST_GLOBAL_TABLES_LIMIT,
                MAX_LIST_GLOBAL_TABLES_LIMIT,
            ),
            |t| t.global_table_name.as_str(),
        );
        Ok(ListGlobalTablesOutput {
            global_tables: page.items,
            last_evaluated_global_table_name: page.next_token,
        })
    }
}

fn active_replica(region_name: String) -> ReplicaDescription {
    ReplicaDescription {
        region_name,
        replica_status: Some(ReplicaStatus::Active),
    }
}

fn has_replica(desc: &GlobalTableDescription, region: &str) -> bool {
    desc.replication_group.iter().any(|r| r.region_name == region)
}

fn global_table_not_found(name: &str) -> DynamoDBError {
    dynamodb_error!(
        GlobalTableNotFoundException,
        format!("Global table not found: {name}")
    )
}
