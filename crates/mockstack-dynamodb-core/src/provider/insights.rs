//! CloudWatch Contributor Insights settings.

use mockstack_core::ids::epoch_seconds;
use mockstack_core::pagination::{page_size, paginate_by_index};
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::input::{
    DescribeContributorInsightsInput, ListContributorInsightsInput,
    UpdateContributorInsightsInput,
};
use mockstack_dynamodb_model::insights::{
    ContributorInsightsAction, ContributorInsightsStatus, ContributorInsightsSummary,
};
use mockstack_dynamodb_model::output::{
    DescribeContributorInsightsOutput, ListContributorInsightsOutput,
    UpdateContributorInsightsOutput,
};
use mockstack_dynamodb_model::types::KeyType;
use tracing::info;

use super::MockStackDynamoDB;
use crate::state::{InsightsRecord, TableRecord, keys};

const MAX_LIST_INSIGHTS_RESULTS: usize = 100;

impl MockStackDynamoDB {
    /// Load the table and check the index exists on it when one is named.
    fn require_insights_target(
        &self,
        table_name: &str,
        index_name: Option<&str>,
    ) -> Result<TableRecord, DynamoDBError> {
        let table = self.require_table(table_name)?;
        if let Some(index) = index_name {
            if !table.has_index(index) {
                return Err(DynamoDBError::resource_not_found(format!(
                    "Requested resource not found: Index: {index} not found for table {table_name}"
                )));
            }
        }
        Ok(table)
    }

    /// Handle `UpdateContributorInsights`.
    pub fn handle_update_contributor_insights(
        &self,
        input: UpdateContributorInsightsInput,
    ) -> Result<UpdateContributorInsightsOutput, DynamoDBError> {
        let index_name = input.index_name.as_deref();
        let table = self.require_insights_target(&input.table_name, index_name)?;

        let (status, rule_list) = match input.contributor_insights_action {
            ContributorInsightsAction::Enable => (
                ContributorInsightsStatus::Enabled,
                rule_names(&table, index_name),
            ),
            ContributorInsightsAction::Disable => (ContributorInsightsStatus::Disabled, Vec::new()),
        };
        self.state.insights.set(
            keys::insights(&input.table_name, index_name),
            InsightsRecord {
                table_name: input.table_name.clone(),
                index_name: input.index_name.clone(),
                status,
                rule_list,
                last_update: epoch_seconds(),
            },
        );

        info!(
            table = %input.table_name,
            index = ?input.index_name,
            %status,
            "updated contributor insights"
        );
        Ok(UpdateContributorInsightsOutput {
            table_name: input.table_name,
            index_name: input.index_name,
            contributor_insights_status: status,
        })
    }

    /// Handle `DescribeContributorInsights`. Unset means `DISABLED`.
    pub fn handle_describe_contributor_insights(
        &self,
        input: DescribeContributorInsightsInput,
    ) -> Result<DescribeContributorInsightsOutput, DynamoDBError> {
        let index_name = input.index_name.as_deref();
        self.require_insights_target(&input.table_name, index_name)?;

        let output = match self
            .state
            .insights
            .find(&keys::insights(&input.table_name, index_name))
        {
            Some(record) => DescribeContributorInsightsOutput {
                table_name: record.table_name,
                index_name: record.index_name,
                contributor_insights_rule_list: record.rule_list,
                contributor_insights_status: record.status,
                last_update_date_time: Some(record.last_update),
            },
            None => DescribeContributorInsightsOutput {
                table_name: input.table_name,
                index_name: input.index_name,
                contributor_insights_rule_list: Vec::new(),
                contributor_insights_status: ContributorInsightsStatus::Disabled,
                last_update_date_time: None,
            },
        };
        Ok(output)
    }

    /// Handle `ListContributorInsights`.
    pub fn handle_list_contributor_insights(
        &self,
        input: ListContributorInsightsInput,
    ) -> Result<ListContributorInsightsOutput, DynamoDBError> {
        if let Some(max) = input.max_results {
            if !(1..=100).contains(&max) {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{max}' at 'maxResults' failed to \
                     satisfy constraint: Member must have value between 1 and 100"
                )));
            }
        }
        let summaries: Vec<ContributorInsightsSummary> = self
            .state
            .insights
            .list_values(keys::INSIGHTS_PREFIX)
            .into_iter()
            .filter(|r| {
                input
                    .table_name
                    .as_deref()
                    .is_none_or(|name| r.table_name == name)
            })
            .map(|r| ContributorInsightsSummary {
                table_name: r.table_name,
                index_name: r.index_name,
                contributor_insights_status: r.status,
            })
            .collect();

        let page = paginate_by_index(
            summaries,
            input.next_token.as_deref(),
            page_size(
                input.max_results,
                MAX_LIST_INSIGHTS_RESULTS,
                MAX_LIST_INSIGHTS_RESULTS,
            ),
        )
        .map_err(|e| DynamoDBError::validation(e.to_string()))?;
        Ok(ListContributorInsightsOutput {
            contributor_insights_summaries: page.items,
            next_token: page.next_token,
        })
    }
}

/// Rules CloudWatch would create: most accessed (`PKC`) and most throttled
/// (`PKT`) partition keys, plus the sort-key variants when a sort key exists.
fn rule_names(table: &TableRecord, index_name: Option<&str>) -> Vec<String> {
    let has_sort_key = match index_name {
        Some(index) => table
            .global_secondary_indexes
            .iter()
            .find(|i| i.index_name == index)
            .map(|i| &i.key_schema)
            .or_else(|| {
                table
                    .local_secondary_indexes
                    .iter()
                    .find(|i| i.index_name == index)
                    .map(|i| &i.key_schema)
            })
            .is_some_and(|schema| schema.iter().any(|e| e.key_type == KeyType::Range)),
        None => table.range_key().is_some(),
    };
    let target = match index_name {
        Some(index) => format!("{}-{index}", table.name),
        None => table.name.clone(),
    };
    let stamp = chrono::Utc::now().timestamp_millis();

    let mut kinds = vec!["PKC", "PKT"];
    if has_sort_key {
        kinds.extend(["SKC", "SKT"]);
    }
    kinds
        .into_iter()
        .map(|kind| format!("DynamoDBContributorInsights-{kind}-{target}-{stamp}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use mockstack_dynamodb_model::DynamoDBErrorCode;

    use super::*;
    use crate::provider::test_util::{create_table_input, provider_with_table};

    fn update(
        p: &MockStackDynamoDB,
        table: &str,
        action: ContributorInsightsAction,
    ) -> Result<UpdateContributorInsightsOutput, DynamoDBError> {
        p.handle_update_contributor_insights(UpdateContributorInsightsInput {
            table_name: table.to_owned(),
            index_name: None,
            contributor_insights_action: action,
        })
    }

    #[test]
    fn test_should_default_to_disabled() {
        let p = provider_with_table("T");
        let out = p
            .handle_describe_contributor_insights(DescribeContributorInsightsInput {
                table_name: "T".to_owned(),
                index_name: None,
            })
            .unwrap();
        assert_eq!(
            out.contributor_insights_status,
            ContributorInsightsStatus::Disabled
        );
        assert!(out.contributor_insights_rule_list.is_empty());
    }

    #[test]
    fn test_should_enable_with_partition_key_rules() {
        let p = provider_with_table("T");
        let out = update(&p, "T", ContributorInsightsAction::Enable).unwrap();
        assert_eq!(
            out.contributor_insights_status,
            ContributorInsightsStatus::Enabled
        );
        let described = p
            .handle_describe_contributor_insights(DescribeContributorInsightsInput {
                table_name: "T".to_owned(),
                index_name: None,
            })
            .unwrap();
        assert_eq!(described.contributor_insights_rule_list.len(), 2);
        assert!(
            described.contributor_insights_rule_list[0]
                .starts_with("DynamoDBContributorInsights-PKC-T-")
        );

        update(&p, "T", ContributorInsightsAction::Disable).unwrap();
        let described = p
            .handle_describe_contributor_insights(DescribeContributorInsightsInput {
                table_name: "T".to_owned(),
                index_name: None,
            })
            .unwrap();
        assert_eq!(
            described.contributor_insights_status,
            ContributorInsightsStatus::Disabled
        );
    }

    #[test]
    fn test_should_reject_unknown_index() {
        let p = provider_with_table("T");
        let err = p
            .handle_update_contributor_insights(UpdateContributorInsightsInput {
                table_name: "T".to_owned(),
                index_name: Some("nope".to_owned()),
                contributor_insights_action: ContributorInsightsAction::Enable,
            })
            .unwrap_err();
        assert_eq!(err.code, DynamoDBErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_list_insights_filtered_by_table() {
        let p = provider_with_table("T");
        p.handle_create_table(create_table_input("T2")).unwrap();
        update(&p, "T", ContributorInsightsAction::Enable).unwrap();
        update(&p, "T2", ContributorInsightsAction::Enable).unwrap();

        let only_t = p
            .handle_list_contributor_insights(ListContributorInsightsInput {
                table_name: Some("T".to_owned()),
                ..ListContributorInsightsInput::default()
            })
            .unwrap();
        assert_eq!(only_t.contributor_insights_summaries.len(), 1);

        let paged = p
            .handle_list_contributor_insights(ListContributorInsightsInput {
                max_results: Some(1),
                ..ListContributorInsightsInput::default()
            })
            .unwrap();
        assert_eq!(paged.contributor_insights_summaries.len(), 1);
        assert_eq!(paged.next_token.as_deref(), Some("1"));
    }
}
