//! DynamoDB handler bridging the `awsJson` protocol layer to the provider.

use std::sync::Arc;

use bytes::Bytes;
use mockstack_dynamodb_model::{DynamoDBError, DynamoDBOperation};
use mockstack_http::RequestContext;
use mockstack_http::json::{JsonHandler, JsonHandlerFuture, decode_input, encode_output};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::provider::MockStackDynamoDB;

/// Handler that bridges the HTTP layer to the DynamoDB provider.
#[derive(Debug, Clone)]
pub struct MockStackDynamoDBHandler {
    provider: Arc<MockStackDynamoDB>,
}

impl MockStackDynamoDBHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackDynamoDB>) -> Self {
        Self { provider }
    }
}

impl JsonHandler for MockStackDynamoDBHandler {
    type Operation = DynamoDBOperation;
    type Error = DynamoDBError;

    fn handle_operation(
        &self,
        op: DynamoDBOperation,
        body: Bytes,
        _ctx: RequestContext,
    ) -> JsonHandlerFuture<DynamoDBError> {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &body) })
    }
}

/// Decode the input, run one provider method, encode its output.
fn invoke<I, O>(
    body: &[u8],
    handle: impl FnOnce(I) -> Result<O, DynamoDBError>,
) -> Result<Vec<u8>, DynamoDBError>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input = decode_input::<I, DynamoDBError>(body)?;
    let output = handle(input)?;
    encode_output::<O, DynamoDBError>(&output)
}

/// Dispatch a DynamoDB operation to the appropriate provider method.
fn dispatch(
    provider: &MockStackDynamoDB,
    op: DynamoDBOperation,
    body: &[u8],
) -> Result<Vec<u8>, DynamoDBError> {
    use DynamoDBOperation as Op;

    match op {
        Op::CreateTable => invoke(body, |i| provider.handle_create_table(i)),
        Op::DescribeTable => invoke(body, |i| provider.handle_describe_table(i)),
        Op::DeleteTable => invoke(body, |i| provider.handle_delete_table(i)),
        Op::ListTables => invoke(body, |i| provider.handle_list_tables(i)),
        Op::UpdateTable => invoke(body, |i| provider.handle_update_table(i)),

        Op::DescribeTimeToLive => invoke(body, |i| provider.handle_describe_time_to_live(i)),
        Op::UpdateTimeToLive => invoke(body, |i| provider.handle_update_time_to_live(i)),
        Op::DescribeContinuousBackups => {
            invoke(body, |i| provider.handle_describe_continuous_backups(i))
        }
        Op::UpdateContinuousBackups => {
            invoke(body, |i| provider.handle_update_continuous_backups(i))
        }

        Op::CreateBackup => invoke(body, |i| provider.handle_create_backup(i)),
        Op::DescribeBackup => invoke(body, |i| provider.handle_describe_backup(i)),
        Op::DeleteBackup => invoke(body, |i| provider.handle_delete_backup(i)),
        Op::ListBackups => invoke(body, |i| provider.handle_list_backups(i)),
        Op::RestoreTableFromBackup => {
            invoke(body, |i| provider.handle_restore_table_from_backup(i))
        }

        Op::CreateGlobalTable => invoke(body, |i| provider.handle_create_global_table(i)),
        Op::DescribeGlobalTable => invoke(body, |i| provider.handle_describe_global_table(i)),
        Op::UpdateGlobalTable => invoke(body, |i| provider.handle_update_global_table(i)),
        Op::ListGlobalTables => invoke(body, |i| provider.handle_list_global_tables(i)),

        Op::PutResourcePolicy => invoke(body, |i| provider.handle_put_resource_policy(i)),
        Op::GetResourcePolicy => invoke(body, |i| provider.handle_get_resource_policy(i)),
        Op::DeleteResourcePolicy => invoke(body, |i| provider.handle_delete_resource_policy(i)),

        Op::TagResource => invoke(body, |i| provider.handle_tag_resource(i)),
        Op::UntagResource => invoke(body, |i| provider.handle_untag_resource(i)),
        Op::ListTagsOfResource => invoke(body, |i| provider.handle_list_tags_of_resource(i)),

        Op::UpdateContributorInsights => {
            invoke(body, |i| provider.handle_update_contributor_insights(i))
        }
        Op::DescribeContributorInsights => {
            invoke(body, |i| provider.handle_describe_contributor_insights(i))
        }
        Op::ListContributorInsights => {
            invoke(body, |i| provider.handle_list_contributor_insights(i))
        }

        Op::ExportTableToPointInTime => {
            invoke(body, |i| provider.handle_export_table_to_point_in_time(i))
        }
        Op::DescribeExport => invoke(body, |i| provider.handle_describe_export(i)),
        Op::ListExports => invoke(body, |i| provider.handle_list_exports(i)),
        Op::ImportTable => invoke(body, |i| provider.handle_import_table(i)),
        Op::DescribeImport => invoke(body, |i| provider.handle_describe_import(i)),
        Op::ListImports => invoke(body, |i| provider.handle_list_imports(i)),

        Op::DescribeLimits => invoke(body, |i| provider.handle_describe_limits(i)),
        Op::DescribeEndpoints => invoke(body, |i| provider.handle_describe_endpoints(i)),
    }
}
