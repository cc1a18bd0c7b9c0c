//! DescribeLimits and DescribeEndpoints.

use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::input::{DescribeEndpointsInput, DescribeLimitsInput};
use mockstack_dynamodb_model::output::{DescribeEndpointsOutput, DescribeLimitsOutput, Endpoint};

use super::MockStackDynamoDB;

const ACCOUNT_MAX_CAPACITY_UNITS: i64 = 80_000;
const TABLE_MAX_CAPACITY_UNITS: i64 = 40_000;
const ENDPOINT_CACHE_MINUTES: i64 = 1440;

impl MockStackDynamoDB {
    /// Handle `DescribeLimits`. Default regional quotas.
    pub fn handle_describe_limits(
        &self,
        _input: DescribeLimitsInput,
    ) -> Result<DescribeLimitsOutput, DynamoDBError> {
        Ok(DescribeLimitsOutput {
            account_max_read_capacity_units: ACCOUNT_MAX_CAPACITY_UNITS,
            account_max_write_capacity_units: ACCOUNT_MAX_CAPACITY_UNITS,
            table_max_read_capacity_units: TABLE_MAX_CAPACITY_UNITS,
            table_max_write_capacity_units: TABLE_MAX_CAPACITY_UNITS,
        })
    }

    /// Handle `DescribeEndpoints`.
    pub fn handle_describe_endpoints(
        &self,
        _input: DescribeEndpointsInput,
    ) -> Result<DescribeEndpointsOutput, DynamoDBError> {
        Ok(DescribeEndpointsOutput {
            endpoints: vec![Endpoint {
                address: format!("dynamodb.{}.amazonaws.com", self.config.default_region),
                cache_period_in_minutes: ENDPOINT_CACHE_MINUTES,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_util::provider;

    #[test]
    fn test_should_report_default_limits() {
        let out = provider()
            .handle_describe_limits(DescribeLimitsInput {})
            .unwrap();
        assert_eq!(out.account_max_read_capacity_units, 80_000);
        assert_eq!(out.table_max_write_capacity_units, 40_000);
    }

    #[test]
    fn test_should_describe_regional_endpoint() {
        let out = provider()
            .handle_describe_endpoints(DescribeEndpointsInput {})
            .unwrap();
        assert_eq!(out.endpoints.len(), 1);
        assert_eq!(out.endpoints[0].address, "dynamodb.us-east-1.amazonaws.com");
        assert_eq!(out.endpoints[0].cache_period_in_minutes, 1440);
    }
}
