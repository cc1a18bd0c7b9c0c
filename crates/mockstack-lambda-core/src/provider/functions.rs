//! Function lifecycle: create, get, list, update, delete.

use mockstack_core::ids;
use mockstack_core::pagination::paginate_by_index;
use mockstack_lambda_model::LambdaError;
use mockstack_lambda_model::input::{
    CreateFunctionInput, DeleteFunctionInput, GetFunctionConfigurationInput, GetFunctionInput,
    ListFunctionsInput, UpdateFunctionCodeInput, UpdateFunctionConfigurationInput,
};
use mockstack_lambda_model::output::{EmptyOutput, GetFunctionOutput, ListFunctionsOutput};
use mockstack_lambda_model::types::{
    Architecture, Concurrency, EnvironmentResponse, EphemeralStorage, FunctionConfiguration,
    LastUpdateStatus, PackageType, State, TracingConfig, TracingMode,
};
use tracing::{debug, info};

use super::{LATEST, MockStackLambda};
use crate::code::{last_modified_now, package};
use crate::state::{FunctionRecord, keys};
use crate::validate::{
    MIN_EPHEMERAL, MIN_MEMORY, parse_function_identifier, validate_environment,
    validate_ephemeral_storage, validate_function_name, validate_memory_size, validate_role,
    validate_runtime, validate_timeout,
};

const DEFAULT_TIMEOUT: i32 = 3;
const DEFAULT_MAX_ITEMS: usize = 50;

fn validate_architectures(architectures: &[Architecture]) -> Result<(), LambdaError> {
    if architectures.len() > 1 {
        return Err(LambdaError::validation(
            "1 validation error detected: Value at 'architectures' failed to satisfy \
             constraint: Member must have length less than or equal to 1",
        ));
    }
    Ok(())
}

impl MockStackLambda {
    /// Handle `CreateFunction`.
    pub fn handle_create_function(
        &self,
        input: CreateFunctionInput,
    ) -> Result<FunctionConfiguration, LambdaError> {
        let (name, qualifier) = parse_function_identifier(&input.function_name)?;
        if qualifier.is_some() {
            return Err(LambdaError::invalid_parameter(
                "Unsupported qualifier on CreateFunction.",
            ));
        }
        validate_function_name(&name)?;
        validate_role(&input.role)?;

        let package_type = input.package_type.unwrap_or(PackageType::Zip);
        if package_type == PackageType::Zip {
            let (Some(runtime), Some(_)) = (input.runtime.as_deref(), input.handler.as_deref())
            else {
                return Err(LambdaError::invalid_parameter(
                    "Runtime and Handler are mandatory parameters for functions created with \
                     deployment packages.",
                ));
            };
            validate_runtime(runtime)?;
        }

        let timeout = input.timeout.unwrap_or(DEFAULT_TIMEOUT);
        validate_timeout(timeout)?;
        let memory_size = input.memory_size.unwrap_or(MIN_MEMORY);
        validate_memory_size(memory_size)?;
        let ephemeral = input.ephemeral_storage.map_or(MIN_EPHEMERAL, |e| e.size);
        validate_ephemeral_storage(ephemeral)?;
        if let Some(env) = &input.environment {
            validate_environment(env)?;
        }
        validate_architectures(&input.architectures)?;

        let key = keys::function(&name);
        if self.state.functions.exists(&key) {
            return Err(LambdaError::conflict(format!(
                "Function already exist: {name}"
            )));
        }

        let packaged = package(&input.code, package_type, &name, &self.config)?;
        let architectures = if input.architectures.is_empty() {
            vec![Architecture::X86_64]
        } else {
            input.architectures
        };

        let configuration = FunctionConfiguration {
            function_arn: self.function_arn(&name),
            function_name: name.clone(),
            runtime: input.runtime,
            role: input.role,
            handler: input.handler,
            code_size: packaged.size,
            description: input.description.unwrap_or_default(),
            timeout,
            memory_size,
            last_modified: last_modified_now(),
            code_sha256: packaged.sha256,
            version: LATEST.to_owned(),
            environment: input.environment.map(|e| EnvironmentResponse {
                variables: e.variables,
            }),
            tracing_config: Some(input.tracing_config.unwrap_or(TracingConfig {
                mode: TracingMode::PassThrough,
            })),
            revision_id: ids::request_id(),
            state: Some(State::Active),
            last_update_status: Some(LastUpdateStatus::Successful),
            package_type: Some(package_type),
            architectures,
            ephemeral_storage: Some(EphemeralStorage { size: ephemeral }),
        };
        let record = FunctionRecord {
            configuration: configuration.clone(),
            code: packaged.location,
            tags: input.tags.into_iter().collect(),
        };

        self.state
            .functions
            .insert_new(key, record)
            .map_err(|_| LambdaError::conflict(format!("Function already exist: {name}")))?;
        info!(function_name = %name, code_size = configuration.code_size, "created function");
        Ok(configuration)
    }

    /// Handle `GetFunction`.
    pub fn handle_get_function(
        &self,
        input: GetFunctionInput,
    ) -> Result<GetFunctionOutput, LambdaError> {
        let name = self.resolve(&input.function_name, input.qualifier.as_deref())?;
        let record = self.require_function(&name)?;
        let reserved = self.state.concurrency.find(&keys::concurrency(&name));
        Ok(GetFunctionOutput {
            tags: (!record.tags.is_empty()).then(|| record.tags.to_map()),
            concurrency: reserved.map(|n| Concurrency {
                reserved_concurrent_executions: Some(n),
            }),
            configuration: record.configuration,
            code: record.code,
        })
    }

    /// Handle `GetFunctionConfiguration`.
    pub fn handle_get_function_configuration(
        &self,
        input: GetFunctionConfigurationInput,
    ) -> Result<FunctionConfiguration, LambdaError> {
        let name = self.resolve(&input.function_name, input.qualifier.as_deref())?;
        Ok(self.require_function(&name)?.configuration)
    }

    /// Handle `DeleteFunction`. The function's policy and reserved
    /// concurrency go with it.
    pub fn handle_delete_function(
        &self,
        input: DeleteFunctionInput,
    ) -> Result<EmptyOutput, LambdaError> {
        let name = self.resolve(&input.function_name, input.qualifier.as_deref())?;
        if self.state.functions.delete(&keys::function(&name)).is_none() {
            return Err(LambdaError::function_not_found(&self.function_arn(&name)));
        }
        self.state.policies.delete(&keys::policy(&name));
        self.state.concurrency.delete(&keys::concurrency(&name));
        info!(function_name = %name, "deleted function");
        Ok(EmptyOutput {})
    }

    /// Handle `ListFunctions`. `Marker` is a stringified index.
    pub fn handle_list_functions(
        &self,
        input: ListFunctionsInput,
    ) -> Result<ListFunctionsOutput, LambdaError> {
        let limit = match input.max_items {
            None => DEFAULT_MAX_ITEMS,
            Some(n) if (1..=50).contains(&n) => usize::try_from(n).unwrap_or(DEFAULT_MAX_ITEMS),
            Some(n) => {
                return Err(LambdaError::validation(format!(
                    "1 validation error detected: Value '{n}' at 'maxItems' failed to satisfy \
                     constraint: Member must have value between 1 and 50"
                )));
            }
        };
        let functions: Vec<FunctionConfiguration> = self
            .state
            .functions
            .list_values(keys::FUNCTION_PREFIX)
            .into_iter()
            .map(|r| r.configuration)
            .collect();
        let page = paginate_by_index(functions, input.marker.as_deref(), limit)
            .map_err(|e| LambdaError::invalid_parameter(e.to_string()))?;
        debug!(count = page.items.len(), "listed functions");
        Ok(ListFunctionsOutput {
            functions: page.items,
            next_marker: page.next_token,
        })
    }

    /// Handle `UpdateFunctionConfiguration`.
    pub fn handle_update_function_configuration(
        &self,
        input: UpdateFunctionConfigurationInput,
    ) -> Result<FunctionConfiguration, LambdaError> {
        let name = self.resolve(&input.function_name, None)?;
        if let Some(role) = &input.role {
            validate_role(role)?;
        }
        if let Some(runtime) = &input.runtime {
            validate_runtime(runtime)?;
        }
        if let Some(timeout) = input.timeout {
            validate_timeout(timeout)?;
        }
        if let Some(memory) = input.memory_size {
            validate_memory_size(memory)?;
        }
        if let Some(storage) = input.ephemeral_storage {
            validate_ephemeral_storage(storage.size)?;
        }
        if let Some(env) = &input.environment {
            validate_environment(env)?;
        }
        self.require_function(&name)?;

        let updated = self.state.functions.update_if_revision(
            &keys::function(&name),
            input.revision_id.as_deref(),
            |record| {
                let c = &mut record.configuration;
                if let Some(role) = input.role {
                    c.role = role;
                }
                if let Some(handler) = input.handler {
                    c.handler = Some(handler);
                }
                if let Some(description) = input.description {
                    c.description = description;
                }
                if let Some(timeout) = input.timeout {
                    c.timeout = timeout;
                }
                if let Some(memory) = input.memory_size {
                    c.memory_size = memory;
                }
                if let Some(env) = input.environment {
                    c.environment = Some(EnvironmentResponse {
                        variables: env.variables,
                    });
                }
                if let Some(runtime) = input.runtime {
                    c.runtime = Some(runtime);
                }
                if let Some(tracing) = input.tracing_config {
                    c.tracing_config = Some(tracing);
                }
                if let Some(storage) = input.ephemeral_storage {
                    c.ephemeral_storage = Some(storage);
                }
                c.last_modified = last_modified_now();
                c.last_update_status = Some(LastUpdateStatus::Successful);
                c.revision_id = ids::request_id();
                c.clone()
            },
        )?;
        info!(function_name = %name, revision_id = %updated.revision_id, "updated function configuration");
        Ok(updated)
    }

    /// Handle `UpdateFunctionCode`. With `DryRun` the new package is
    /// validated and hashed but not stored.
    pub fn handle_update_function_code(
        &self,
        input: UpdateFunctionCodeInput,
    ) -> Result<FunctionConfiguration, LambdaError> {
        let name = self.resolve(&input.function_name, None)?;
        validate_architectures(&input.architectures)?;
        let current = self.require_function(&name)?;
        let package_type = current
            .configuration
            .package_type
            .unwrap_or(PackageType::Zip);
        let packaged = package(&input.code(), package_type, &name, &self.config)?;

        if input.dry_run.unwrap_or(false) {
            if let Some(expected) = input.revision_id.as_deref() {
                if expected != current.configuration.revision_id {
                    return Err(LambdaError::precondition_failed());
                }
            }
            return Ok(FunctionConfiguration {
                code_sha256: packaged.sha256,
                code_size: packaged.size,
                ..current.configuration
            });
        }

        let updated = self.state.functions.update_if_revision(
            &keys::function(&name),
            input.revision_id.as_deref(),
            |record| {
                record.code = packaged.location;
                let c = &mut record.configuration;
                c.code_sha256 = packaged.sha256;
                c.code_size = packaged.size;
                if !input.architectures.is_empty() {
                    c.architectures = input.architectures;
                }
                c.last_modified = last_modified_now();
                c.last_update_status = Some(LastUpdateStatus::Successful);
                c.revision_id = ids::request_id();
                c.clone()
            },
        )?;
        info!(function_name = %name, code_sha256 = %updated.code_sha256, "updated function code");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mockstack_lambda_model::LambdaErrorCode;
    use mockstack_lambda_model::types::Environment;

    use super::*;
    use crate::provider::test_util::{create_function_input, provider, provider_with_function};

    fn get(p: &MockStackLambda, name: &str) -> Result<FunctionConfiguration, LambdaError> {
        p.handle_get_function_configuration(GetFunctionConfigurationInput {
            function_name: name.to_owned(),
            qualifier: None,
        })
    }

    #[test]
    fn test_should_create_and_get_function() {
        let p = provider();
        let created = p.handle_create_function(create_function_input("f")).unwrap();
        assert_eq!(
            created.function_arn,
            "arn:aws:lambda:us-east-1:000000000000:function:f"
        );
        assert_eq!(created.version, "$LATEST");
        assert_eq!(created.timeout, 3);
        assert_eq!(created.memory_size, 128);
        assert_eq!(created.state, Some(State::Active));
        assert!(!created.revision_id.is_empty());
        assert_eq!(get(&p, "f").unwrap(), created);
    }

    #[test]
    fn test_should_reject_duplicate_function() {
        let p = provider_with_function("f");
        let err = p
            .handle_create_function(create_function_input("f"))
            .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::ResourceConflictException);
        assert_eq!(err.status_code.as_u16(), 409);
    }

    #[test]
    fn test_should_require_runtime_for_zip_functions() {
        let input = CreateFunctionInput {
            runtime: None,
            ..create_function_input("f")
        };
        let err = provider().handle_create_function(input).unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::InvalidParameterValueException);
    }

    #[test]
    fn test_should_validate_role_on_create() {
        let input = CreateFunctionInput {
            role: "not-a-role".to_owned(),
            ..create_function_input("f")
        };
        let err = provider().handle_create_function(input).unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::ValidationException);
    }

    #[test]
    fn test_should_return_tags_and_concurrency_from_get_function() {
        let p = provider();
        let mut input = create_function_input("f");
        input.tags = BTreeMap::from([("team".to_owned(), "core".to_owned())]);
        p.handle_create_function(input).unwrap();
        p.state.concurrency.set(keys::concurrency("f"), 5);

        let out = p
            .handle_get_function(GetFunctionInput {
                function_name: "f".to_owned(),
                qualifier: None,
            })
            .unwrap();
        assert_eq!(out.tags.unwrap()["team"], "core");
        assert_eq!(
            out.concurrency.unwrap().reserved_concurrent_executions,
            Some(5)
        );
        assert_eq!(out.code.repository_type, "S3");
    }

    #[test]
    fn test_should_delete_function_with_policy_and_concurrency() {
        let p = provider_with_function("f");
        p.state.concurrency.set(keys::concurrency("f"), 1);
        p.handle_delete_function(DeleteFunctionInput {
            function_name: "f".to_owned(),
            qualifier: None,
        })
        .unwrap();
        assert!(p.state.concurrency.is_empty());
        let err = get(&p, "f").unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::ResourceNotFoundException);

        let err = p
            .handle_delete_function(DeleteFunctionInput {
                function_name: "f".to_owned(),
                qualifier: None,
            })
            .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::ResourceNotFoundException);
    }

    #[test]
    fn test_should_page_functions_by_marker() {
        let p = provider();
        for i in 0..5 {
            p.handle_create_function(create_function_input(&format!("f{i}")))
                .unwrap();
        }
        let mut seen = Vec::new();
        let mut marker = None;
        loop {
            let page = p
                .handle_list_functions(ListFunctionsInput {
                    marker,
                    max_items: Some(2),
                    ..ListFunctionsInput::default()
                })
                .unwrap();
            seen.extend(page.functions.into_iter().map(|f| f.function_name));
            marker = page.next_marker;
            if marker.is_none() {
                break;
            }
        }
        assert_eq!(seen, vec!["f0", "f1", "f2", "f3", "f4"]);
    }

    #[test]
    fn test_should_reject_out_of_range_max_items() {
        let err = provider()
            .handle_list_functions(ListFunctionsInput {
                max_items: Some(51),
                ..ListFunctionsInput::default()
            })
            .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::ValidationException);
    }

    #[test]
    fn test_should_update_configuration_with_matching_revision() {
        let p = provider_with_function("f");
        let before = get(&p, "f").unwrap();
        let updated = p
            .handle_update_function_configuration(UpdateFunctionConfigurationInput {
                function_name: "f".to_owned(),
                timeout: Some(30),
                environment: Some(Environment {
                    variables: BTreeMap::from([("STAGE".to_owned(), "dev".to_owned())]),
                }),
                revision_id: Some(before.revision_id.clone()),
                ..UpdateFunctionConfigurationInput::default()
            })
            .unwrap();
        assert_eq!(updated.timeout, 30);
        assert_ne!(updated.revision_id, before.revision_id);
        assert_eq!(updated.environment.unwrap().variables["STAGE"], "dev");
    }

    #[test]
    fn test_should_fail_update_on_stale_revision() {
        let p = provider_with_function("f");
        let err = p
            .handle_update_function_configuration(UpdateFunctionConfigurationInput {
                function_name: "f".to_owned(),
                description: Some("x".to_owned()),
                revision_id: Some("stale".to_owned()),
                ..UpdateFunctionConfigurationInput::default()
            })
            .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::PreconditionFailedException);
        assert_eq!(get(&p, "f").unwrap().description, "");
    }

    #[test]
    fn test_should_update_code_hash() {
        let p = provider_with_function("f");
        let before = get(&p, "f").unwrap();
        let updated = p
            .handle_update_function_code(UpdateFunctionCodeInput {
                function_name: "f".to_owned(),
                zip_file: Some(STANDARD.encode(b"PK\x03\x04new-archive")),
                ..UpdateFunctionCodeInput::default()
            })
            .unwrap();
        assert_ne!(updated.code_sha256, before.code_sha256);
        assert_ne!(updated.revision_id, before.revision_id);
    }

    #[test]
    fn test_should_not_store_dry_run_code_update() {
        let p = provider_with_function("f");
        let before = get(&p, "f").unwrap();
        let preview = p
            .handle_update_function_code(UpdateFunctionCodeInput {
                function_name: "f".to_owned(),
                zip_file: Some(STANDARD.encode(b"PK\x03\x04other")),
                dry_run: Some(true),
                ..UpdateFunctionCodeInput::default()
            })
            .unwrap();
        assert_ne!(preview.code_sha256, before.code_sha256);
        assert_eq!(get(&p, "f").unwrap(), before);
    }
}
