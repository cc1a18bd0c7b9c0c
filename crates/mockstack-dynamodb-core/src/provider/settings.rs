//! Time to Live and continuous backups.

use mockstack_core::ids::epoch_seconds;
use mockstack_dynamodb_model::DynamoDBError;
use mockstack_dynamodb_model::input::{
    DescribeContinuousBackupsInput, DescribeTimeToLiveInput, UpdateContinuousBackupsInput,
    UpdateTimeToLiveInput,
};
use mockstack_dynamodb_model::output::{
    DescribeContinuousBackupsOutput, DescribeTimeToLiveOutput, UpdateContinuousBackupsOutput,
    UpdateTimeToLiveOutput,
};
use mockstack_dynamodb_model::types::{TimeToLiveDescription, TimeToLiveStatus};
use tracing::info;

use super::MockStackDynamoDB;

impl MockStackDynamoDB {
    /// Handle `DescribeTimeToLive`.
    pub fn handle_describe_time_to_live(
        &self,
        input: DescribeTimeToLiveInput,
    ) -> Result<DescribeTimeToLiveOutput, DynamoDBError> {
        let table = self.require_table(&input.table_name)?;
        let time_to_live_description = match table.time_to_live {
            Some(ttl) if ttl.enabled => TimeToLiveDescription {
                time_to_live_status: Some(TimeToLiveStatus::Enabled),
                attribute_name: Some(ttl.attribute_name),
            },
            _ => TimeToLiveDescription {
                time_to_live_status: Some(TimeToLiveStatus::Disabled),
                attribute_name: None,
            },
        };
        Ok(DescribeTimeToLiveOutput {
            time_to_live_description,
        })
    }

    /// Handle `UpdateTimeToLive`.
    pub fn handle_update_time_to_live(
        &self,
        input: UpdateTimeToLiveInput,
    ) -> Result<UpdateTimeToLiveOutput, DynamoDBError> {
        let requested = input.time_to_live_specification;
        if requested.attribute_name.is_empty() {
            return Err(DynamoDBError::validation(
                "1 validation error detected: Value '' at \
                 'timeToLiveSpecification.attributeName' failed to satisfy constraint: Member \
                 must have length greater than or equal to 1",
            ));
        }

        self.update_table_record(&input.table_name, |t| {
            let enabled = t.time_to_live.as_ref().is_some_and(|s| s.enabled);
            if requested.enabled && enabled {
                return Err(DynamoDBError::validation("TimeToLive is already enabled"));
            }
            if !requested.enabled && !enabled {
                return Err(DynamoDBError::validation("TimeToLive is already disabled"));
            }
            t.time_to_live = Some(requested.clone());
            Ok(())
        })?;

        info!(table = %input.table_name, enabled = requested.enabled, "updated time to live");
        Ok(UpdateTimeToLiveOutput {
            time_to_live_specification: requested,
        })
    }

    /// Handle `DescribeContinuousBackups`.
    pub fn handle_describe_continuous_backups(
        &self,
        input: DescribeContinuousBackupsInput,
    ) -> Result<DescribeContinuousBackupsOutput, DynamoDBError> {
        let table = self.require_table(&input.table_name)?;
        Ok(DescribeContinuousBackupsOutput {
            continuous_backups_description: table.continuous_backups(epoch_seconds()),
        })
    }

    /// Handle `UpdateContinuousBackups`.
    pub fn handle_update_continuous_backups(
        &self,
        input: UpdateContinuousBackupsInput,
    ) -> Result<UpdateContinuousBackupsOutput, DynamoDBError> {
        let recovery = input.point_in_time_recovery_specification;
        if let Some(days) = recovery.recovery_period_in_days {
            if !(1..=35).contains(&days) {
                return Err(DynamoDBError::validation(format!(
                    "1 validation error detected: Value '{days}' at \
                     'pointInTimeRecoverySpecification.recoveryPeriodInDays' failed to satisfy \
                     constraint: Member must have value between 1 and 35"
                )));
            }
        }

        let table = self.update_table_record(&input.table_name, |t| {
            t.point_in_time_recovery_enabled = recovery.point_in_time_recovery_enabled;
            t.recovery_period_in_days = recovery
                .recovery_period_in_days
                .filter(|_| recovery.point_in_time_recovery_enabled);
            Ok(t.clone())
        })?;

        info!(
            table = %input.table_name,
            enabled = recovery.point_in_time_recovery_enabled,
            "updated point-in-time recovery"
        );
        Ok(UpdateContinuousBackupsOutput {
            continuous_backups_description: table.continuous_backups(epoch_seconds()),
        })
    }
}
