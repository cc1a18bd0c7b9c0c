//! STS handler bridging the awsQuery protocol layer to the provider.

use std::sync::Arc;

use mockstack_core::{FromQueryParams, QueryParams, ServiceError};
use mockstack_http::RequestContext;
use mockstack_http::query::{
    QueryHandler, QueryHandlerFuture, XmlSerialize, decode_params, to_query_response,
};
use mockstack_sts_model::{STS_NAMESPACE, StsError, StsOperation};
use tracing::debug;

use crate::provider::MockStackSts;

#[derive(Debug, Clone)]
pub struct MockStackStsHandler {
    provider: Arc<MockStackSts>,
}

impl MockStackStsHandler {
    /// Create a handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackSts>) -> Self {
        Self { provider }
    }
}

impl QueryHandler for MockStackStsHandler {
    type Operation = StsOperation;
    type Error = StsError;

    fn handle_operation(
        &self,
        op: StsOperation,
        params: QueryParams,
        ctx: RequestContext,
    ) -> QueryHandlerFuture<StsError> {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move {
            debug!(operation = %op, request_id = %ctx.request_id, "dispatching sts operation");
            dispatch(&provider, op, &params, &ctx)
        })
    }
}

fn invoke<I: FromQueryParams, O: XmlSerialize>(
    op: StsOperation,
    params: &QueryParams,
    ctx: &RequestContext,
    handle: impl FnOnce(I) -> Result<O, StsError>,
) -> Result<Vec<u8>, StsError> {
    let output = handle(decode_params::<I, StsError>(params)?)?;
    to_query_response(op.as_str(), STS_NAMESPACE, &output, &ctx.request_id)
        .map_err(|e| <StsError as ServiceError>::internal_error(e.to_string()))
}

fn dispatch(
    provider: &MockStackSts,
    op: StsOperation,
    params: &QueryParams,
    ctx: &RequestContext,
) -> Result<Vec<u8>, StsError> {
    use StsOperation as Op;

    match op {
        Op::GetCallerIdentity => invoke(op, params, ctx, |i| {
            provider.handle_get_caller_identity(i, ctx.access_key_id.as_deref())
        }),
        Op::AssumeRole => invoke(op, params, ctx, |i| provider.handle_assume_role(i)),
        Op::AssumeRoleWithWebIdentity => invoke(op, params, ctx, |i| {
            provider.handle_assume_role_with_web_identity(i)
        }),
        Op::GetSessionToken => invoke(op, params, ctx, |i| provider.handle_get_session_token(i)),
        Op::GetAccessKeyInfo => invoke(op, params, ctx, |i| provider.handle_get_access_key_info(i)),
    }
}
