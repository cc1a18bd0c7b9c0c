//! Lambda handler bridging the JSON protocol layer to the provider.

use std::sync::Arc;

use bytes::Bytes;
use mockstack_http::RequestContext;
use mockstack_http::json::{JsonHandler, JsonHandlerFuture, decode_input, encode_output};
use mockstack_lambda_model::{LambdaError, LambdaOperation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::provider::MockStackLambda;

/// Handler that bridges the HTTP layer to the Lambda provider.
#[derive(Debug, Clone)]
pub struct MockStackLambdaHandler {
    provider: Arc<MockStackLambda>,
}

impl MockStackLambdaHandler {
    /// Create a handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackLambda>) -> Self {
        Self { provider }
    }
}

impl JsonHandler for MockStackLambdaHandler {
    type Operation = LambdaOperation;
    type Error = LambdaError;

    fn handle_operation(
        &self,
        op: LambdaOperation,
        body: Bytes,
        ctx: RequestContext,
    ) -> JsonHandlerFuture<LambdaError> {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move {
            debug!(operation = %op, request_id = %ctx.request_id, "dispatching lambda operation");
            dispatch(&provider, op, &body)
        })
    }
}

fn invoke<I: DeserializeOwned, O: Serialize>(
    body: &[u8],
    handle: impl FnOnce(I) -> Result<O, LambdaError>,
) -> Result<Vec<u8>, LambdaError> {
    let output = handle(decode_input::<I, LambdaError>(body)?)?;
    encode_output::<O, LambdaError>(&output)
}

fn dispatch(
    provider: &MockStackLambda,
    op: LambdaOperation,
    body: &[u8],
) -> Result<Vec<u8>, LambdaError> {
    use LambdaOperation as Op;

    match op {
        Op::CreateFunction => invoke(body, |i| provider.handle_create_function(i)),
        Op::GetFunction => invoke(body, |i| provider.handle_get_function(i)),
        Op::GetFunctionConfiguration => {
            invoke(body, |i| provider.handle_get_function_configuration(i))
        }
        Op::DeleteFunction => invoke(body, |i| provider.handle_delete_function(i)),
        Op::ListFunctions => invoke(body, |i| provider.handle_list_functions(i)),
        Op::UpdateFunctionConfiguration => {
            invoke(body, |i| provider.handle_update_function_configuration(i))
        }
        Op::UpdateFunctionCode => invoke(body, |i| provider.handle_update_function_code(i)),

        Op::AddPermission => invoke(body, |i| provider.handle_add_permission(i)),
        Op::RemovePermission => invoke(body, |i| provider.handle_remove_permission(i)),
        Op::GetPolicy => invoke(body, |i| provider.handle_get_policy(i)),

        Op::TagResource => invoke(body, |i| provider.handle_tag_resource(i)),
        Op::UntagResource => invoke(body, |i| provider.handle_untag_resource(i)),
        Op::ListTags => invoke(body, |i| provider.handle_list_tags(i)),

        Op::PutFunctionConcurrency => {
            invoke(body, |i| provider.handle_put_function_concurrency(i))
        }
        Op::GetFunctionConcurrency => {
            invoke(body, |i| provider.handle_get_function_concurrency(i))
        }
        Op::DeleteFunctionConcurrency => {
            invoke(body, |i| provider.handle_delete_function_concurrency(i))
        }
    }
}

#[cfg(test)]
mod tests {
    use mockstack_lambda_model::LambdaErrorCode;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::LambdaConfig;
    use crate::provider::test_util::{ROLE, zip_b64};

    fn handler() -> MockStackLambdaHandler {
        MockStackLambdaHandler::new(Arc::new(MockStackLambda::new(LambdaConfig::default())))
    }

    async fn call(
        h: &MockStackLambdaHandler,
        op: LambdaOperation,
        body: &Value,
    ) -> Result<Value, LambdaError> {
        let bytes = Bytes::from(serde_json::to_vec(body).unwrap());
        let out = h.handle_operation(op, bytes, RequestContext::new()).await?;
        Ok(serde_json::from_slice(&out).unwrap())
    }

    fn create_body(name: &str) -> Value {
        json!({
            "FunctionName": name,
            "Runtime": "nodejs20.x",
            "Role": ROLE,
            "Handler": "index.handler",
            "Code": {"ZipFile": zip_b64()},
            "Tags": {"env": "test"}
        })
    }

    #[tokio::test]
    async fn test_should_create_and_get_function_over_json() {
        let h = handler();
        let created = call(&h, LambdaOperation::CreateFunction, &create_body("hello"))
            .await
            .unwrap();
        assert_eq!(created["FunctionName"], "hello");
        assert_eq!(created["PackageType"], "Zip");
        assert_eq!(created["Architectures"], json!(["x86_64"]));

        let got = call(
            &h,
            LambdaOperation::GetFunction,
            &json!({"FunctionName": "hello"}),
        )
        .await
        .unwrap();
        assert_eq!(got["Configuration"]["CodeSha256"], created["CodeSha256"]);
        assert_eq!(got["Tags"]["env"], "test");
        assert_eq!(got["Code"]["RepositoryType"], "S3");
    }

    #[tokio::test]
    async fn test_should_list_functions_with_empty_body() {
        let h = handler();
        call(&h, LambdaOperation::CreateFunction, &create_body("a"))
            .await
            .unwrap();
        let out = call(&h, LambdaOperation::ListFunctions, &json!({}))
            .await
            .unwrap();
        assert_eq!(out["Functions"].as_array().unwrap().len(), 1);
        assert!(out.get("NextMarker").is_none());
    }

    #[tokio::test]
    async fn test_should_report_missing_function_as_404() {
        let err = call(
            &handler(),
            LambdaOperation::GetFunctionConfiguration,
            &json!({"FunctionName": "nope"}),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::ResourceNotFoundException);
        assert_eq!(err.status_code.as_u16(), 404);
    }

    #[tokio::test]
    async fn test_should_reject_malformed_json_body() {
        let h = handler();
        let err = h
            .handle_operation(
                LambdaOperation::ListFunctions,
                Bytes::from_static(b"{not json"),
                RequestContext::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, LambdaErrorCode::InvalidRequestContentException);
    }

    #[tokio::test]
    async fn test_should_round_trip_permission_and_policy() {
        let h = handler();
        call(&h, LambdaOperation::CreateFunction, &create_body("f"))
            .await
            .unwrap();
        call(
            &h,
            LambdaOperation::AddPermission,
            &json!({
                "FunctionName": "f",
                "StatementId": "apigw",
                "Action": "lambda:InvokeFunction",
                "Principal": "apigateway.amazonaws.com"
            }),
        )
        .await
        .unwrap();
        let out = call(&h, LambdaOperation::GetPolicy, &json!({"FunctionName": "f"}))
            .await
            .unwrap();
        let policy: Value = serde_json::from_str(out["Policy"].as_str().unwrap()).unwrap();
        assert_eq!(policy["Statement"][0]["Sid"], "apigw");
        assert!(out["RevisionId"].is_string());
    }
}
