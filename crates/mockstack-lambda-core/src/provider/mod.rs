//! Lambda provider implementing the control-plane operations.
//!
//! Only the unpublished `$LATEST` version of a function exists. A qualifier
//! other than `$LATEST` names a version or alias the emulator never creates,
//! so it resolves to `ResourceNotFoundException`.

mod concurrency;
mod functions;
mod permissions;
mod tags;

use std::sync::Arc;

use mockstack_lambda_model::LambdaError;

use crate::config::LambdaConfig;
use crate::state::{FunctionRecord, LambdaState, keys};
use crate::validate::parse_function_identifier;

pub(crate) const LATEST: &str = "$LATEST";

/// Main Lambda provider.
#[derive(Debug)]
pub struct MockStackLambda {
    pub(crate) state: Arc<LambdaState>,
    pub(crate) config: Arc<LambdaConfig>,
}

impl MockStackLambda {
    /// Create a provider with fresh state.
    #[must_use]
    pub fn new(config: LambdaConfig) -> Self {
        Self::with_state(config, Arc::new(LambdaState::new()))
    }

    /// Create a provider over existing state.
    #[must_use]
    pub fn with_state(config: LambdaConfig, state: Arc<LambdaState>) -> Self {
        Self {
            state,
            config: Arc::new(config),
        }
    }

    /// Shared state backing this provider.
    #[must_use]
    pub fn state(&self) -> &Arc<LambdaState> {
        &self.state
    }

    /// `arn:aws:lambda:<region>:<account>:function:<name>`.
    pub(crate) fn function_arn(&self, function_name: &str) -> String {
        format!(
            "arn:aws:lambda:{}:{}:function:{function_name}",
            self.config.default_region, self.config.account_id
        )
    }

    /// Resolve a name, partial ARN or ARN plus an optional explicit
    /// qualifier to a stored function name.
    pub(crate) fn resolve(
        &self,
        identifier: &str,
        qualifier: Option<&str>,
    ) -> Result<String, LambdaError> {
        let (name, embedded) = parse_function_identifier(identifier)?;
        if let (Some(a), Some(b)) = (embedded.as_deref(), qualifier) {
            if a != b {
                return Err(LambdaError::invalid_parameter(
                    "The derived qualifier from the function name does not match the \
                     specified qualifier.",
                ));
            }
        }
        match embedded.as_deref().or(qualifier) {
            None | Some(LATEST) => Ok(name),
            Some(q) => Err(LambdaError::function_not_found(&format!(
                "{}:{q}",
                self.function_arn(&name)
            ))),
        }
    }

    /// Load a function or fail with `ResourceNotFoundException`.
    pub(crate) fn require_function(&self, name: &str) -> Result<FunctionRecord, LambdaError> {
        self.state
            .functions
            .find(&keys::function(name))
            .ok_or_else(|| LambdaError::function_not_found(&self.function_arn(name)))
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mockstack_lambda_model::input::CreateFunctionInput;
    use mockstack_lambda_model::types::FunctionCode;

    use super::*;

    pub(crate) const ROLE: &str = "arn:aws:iam::000000000000:role/lambda-role";

    pub(crate) fn provider() -> MockStackLambda {
        MockStackLambda::new(LambdaConfig::default())
    }

    pub(crate) fn zip_b64() -> String {
        STANDARD.encode(b"PK\x03\x04fake-archive")
    }

    pub(crate) fn create_function_input(name: &str) -> CreateFunctionInput {
        CreateFunctionInput {
            function_name: name.to_owned(),
            runtime: Some("python3.12".to_owned()),
            role: ROLE.to_owned(),
            handler: Some("index.handler".to_owned()),
            code: FunctionCode {
                zip_file: Some(zip_b64()),
                ..FunctionCode::default()
            },
            ..CreateFunctionInput::default()
        }
    }

    pub(crate) fn provider_with_function(name: &str) -> MockStackLambda {
        let p = provider();
        p.handle_create_function(create_function_input(name)).unwrap();
        p
    }
}
