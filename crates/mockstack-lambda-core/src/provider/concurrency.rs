//! PutFunctionConcurrency, GetFunctionConcurrency, DeleteFunctionConcurrency.

use mockstack_lambda_model::LambdaError;
use mockstack_lambda_model::input::{
    DeleteFunctionConcurrencyInput, GetFunctionConcurrencyInput, PutFunctionConcurrencyInput,
};
use mockstack_lambda_model::output::{
    EmptyOutput, GetFunctionConcurrencyOutput, PutFunctionConcurrencyOutput,
};
use mockstack_lambda_model::types::Concurrency;
use tracing::info;

use super::MockStackLambda;
use crate::state::keys;

const ACCOUNT_CONCURRENCY_LIMIT: i32 = 1000;
const MIN_UNRESERVED_CONCURRENCY: i32 = 100;

impl MockStackLambda {
    /// Handle `PutFunctionConcurrency`.
    pub fn handle_put_function_concurrency(
        &self,
        input: PutFunctionConcurrencyInput,
    ) -> Result<PutFunctionConcurrencyOutput, LambdaError> {
        let name = self.resolve(&input.function_name, None)?;
        let reserved = input.reserved_concurrent_executions;
        if reserved < 0 {
            return Err(LambdaError::validation(format!(
                "1 validation error detected: Value '{reserved}' at \
                 'reservedConcurrentExecutions' failed to satisfy constraint: Member must have \
                 value greater than or equal to 0"
            )));
        }
        self.require_function(&name)?;

        let key = keys::concurrency(&name);
        let reserved_elsewhere: i32 = self
            .state
            .concurrency
            .list(keys::CONCURRENCY_PREFIX)
            .into_iter()
            .filter(|k| *k != key)
            .filter_map(|k| self.state.concurrency.find(&k))
            .sum();
        if reserved_elsewhere + reserved > ACCOUNT_CONCURRENCY_LIMIT - MIN_UNRESERVED_CONCURRENCY {
            return Err(LambdaError::invalid_parameter(format!(
                "Specified ReservedConcurrentExecutions for function decreases account's \
                 UnreservedConcurrentExecution below its minimum value of \
                 [{MIN_UNRESERVED_CONCURRENCY}]."
            )));
        }

        self.state.concurrency.set(key, reserved);
        info!(function_name = %name, reserved, "put function concurrency");
        Ok(Concurrency {
            reserved_concurrent_executions: Some(reserved),
        })
    }

    /// Handle `GetFunctionConcurrency`. Empty when nothing is reserved.
    pub fn handle_get_function_concurrency(
        &self,
        input: GetFunctionConcurrencyInput,
    ) -> Result<GetFunctionConcurrencyOutput, LambdaError> {
        let name = self.resolve(&input.function_name, None)?;
        self.require_function(&name)?;
        Ok(Concurrency {
            reserved_concurrent_executions: self.state.concurrency.find(&keys::concurrency(&name)),
        })
    }

    /// Handle `DeleteFunctionConcurrency`. Succeeds when nothing is reserved.
    pub fn handle_delete_function_concurrency(
        &self,
        input: DeleteFunctionConcurrencyInput,
    ) -> Result<EmptyOutput, LambdaError> {
        let name = self.resolve(&input.function_name, None)?;
        self.require_function(&name)?;
        if self
            .state
            .concurrency
            .delete(&keys::concurrency(&name))
            .is_some()
        {
            info!(function_name = %name, "deleted function concurrency");
        }
        Ok(EmptyOutput {})
    }
}
