//! TagResource, UntagResource, ListTags.

use mockstack_core::Arn;
use mockstack_lambda_model::LambdaError;
use mockstack_lambda_model::input::{ListTagsInput, TagResourceInput, UntagResourceInput};
use mockstack_lambda_model::output::{EmptyOutput, ListTagsOutput};
use tracing::debug;

use super::MockStackLambda;
use crate::state::keys;

const MAX_TAGS: usize = 50;

/// Function name of a `arn:aws:lambda:...:function:<name>` resource.
fn function_name_from_resource(resource: &str) -> Result<String, LambdaError> {
    let invalid = || {
        LambdaError::validation(format!(
            "1 validation error detected: Value '{resource}' at 'resource' failed to satisfy \
             constraint: Member must satisfy regular expression pattern: \
             arn:(aws[a-zA-Z-]*):lambda:[a-z]{{2}}((-gov)|(-iso([a-z]?)))?-[a-z]+-\\d{{1}}:\\d{{12}}:function:[a-zA-Z0-9-_]+"
        ))
    };
    let arn: Arn = resource.parse().map_err(|_| invalid())?;
    if arn.service != "lambda" || arn.resource_type() != "function" {
        return Err(invalid());
    }
    let name = arn.resource_id().ok_or_else(invalid)?;
    match name.split_once(':') {
        None => Ok(name.to_owned()),
        Some(_) => Err(LambdaError::invalid_parameter(
            "Tags on function aliases and versions are not supported. Please specify a \
             function ARN.",
        )),
    }
}

impl MockStackLambda {
    /// Handle `TagResource`.
    pub fn handle_tag_resource(&self, input: TagResourceInput) -> Result<EmptyOutput, LambdaError> {
        let name = function_name_from_resource(&input.resource)?;
        self.require_function(&name)?;
        let count = input.tags.len();
        self.state
            .functions
            .try_update(&keys::function(&name), |record| {
                record.tags.merge(input.tags);
                if record.tags.len() > MAX_TAGS {
                    return Err(LambdaError::invalid_parameter(format!(
                        "Number of tags exceeds resource tag limit of {MAX_TAGS}."
                    )));
                }
                Ok(())
            })?;
        debug!(resource = %input.resource, count, "tagged function");
        Ok(EmptyOutput {})
    }

    /// Handle `UntagResource`. Unknown keys are ignored.
    pub fn handle_untag_resource(
        &self,
        input: UntagResourceInput,
    ) -> Result<EmptyOutput, LambdaError> {
        let name = function_name_from_resource(&input.resource)?;
        self.require_function(&name)?;
        self.state
            .functions
            .update(&keys::function(&name), |record| {
                record.tags.remove_keys(&input.tag_keys);
            })?;
        debug!(resource = %input.resource, "untagged function");
        Ok(EmptyOutput {})
    }

    /// Handle `ListTags`.
    pub fn handle_list_tags(&self, input: ListTagsInput) -> Result<ListTagsOutput, LambdaError> {
        let name = function_name_from_resource(&input.resource)?;
        let record = self.require_function(&name)?;
        Ok(ListTagsOutput {
            tags: record.tags.to_map(),
        })
    }
}
