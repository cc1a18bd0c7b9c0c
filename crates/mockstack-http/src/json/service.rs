//! Hyper `Service` for `awsJson` protocol services.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use mockstack_core::{AwsOperation, ServiceError};

use crate::body::ResponseBody;
use crate::context::RequestContext;
use crate::json::response::{error_to_response, json_response};
use crate::json::router::{check_content_type, resolve_operation};
use crate::json::validate::{parse_object, validate_required};

/// Boxed future returned by [`JsonHandler::handle_operation`].
pub type JsonHandlerFuture<E> = Pin<Box<dyn Future<Output = Result<Vec<u8>, E>> + Send>>;

/// Business logic behind a JSON protocol service.
///
/// The handler receives a resolved operation, the raw JSON body (already
/// checked to be an object carrying the operation's required fields) and the
/// request context, and returns the serialized JSON output.
pub trait JsonHandler: Send + Sync + 'static {
    /// The service's operation enum.
    type Operation: AwsOperation;
    /// The service's error type.
    type Error: ServiceError;

    /// Handle one operation.
    fn handle_operation(
        &self,
        op: Self::Operation,
        body: Bytes,
        ctx: RequestContext,
    ) -> JsonHandlerFuture<Self::Error>;
}

/// Configuration for a JSON protocol service.
#[derive(Debug, Clone)]
pub struct JsonServiceConfig {
    /// Service name used in logs and the `server` header.
    pub service_name: &'static str,
}

/// Hyper `Service` wrapping a [`JsonHandler`].
#[derive(Debug)]
pub struct JsonHttpService<H> {
    handler: Arc<H>,
    config: Arc<JsonServiceConfig>,
}

impl<H: JsonHandler> JsonHttpService<H> {
    /// Create a service dispatching to `handler`.
    pub fn new(handler: Arc<H>, config: JsonServiceConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }

    /// Name of the wrapped service.
    #[must_use]
    pub fn service_name(&self) -> &'static str {
        self.config.service_name
    }

    /// Run a buffered request through the full pipeline.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<ResponseBody> {
        let ctx = RequestContext::from_headers(req.headers());
        let request_id = ctx.request_id.clone();
        let response = process_request(req, self.handler.as_ref(), &self.config, ctx).await;
        add_common_headers(response, &request_id)
    }
}

impl<H> Clone for JsonHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: JsonHandler> hyper::service::Service<http::Request<Incoming>> for JsonHttpService<H> {
    type Response = http::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let svc = self.clone();
        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            let response = match incoming.collect().await {
                Ok(collected) => {
                    svc.handle(http::Request::from_parts(parts, collected.to_bytes()))
                        .await
                }
                Err(e) => {
                    let ctx = RequestContext::new();
                    let err = H::Error::internal_error(format!("Failed to read request body: {e}"));
                    add_common_headers(error_to_response(&err, &ctx.request_id), &ctx.request_id)
                }
            };
            Ok(response)
        })
    }
}

/// Process a single JSON protocol request.
async fn process_request<H: JsonHandler>(
    req: http::Request<Bytes>,
    handler: &H,
    config: &JsonServiceConfig,
    ctx: RequestContext,
) -> http::Response<ResponseBody> {
    let request_id = ctx.request_id.clone();
    match run(req, handler, config, ctx).await {
        Ok(json) => json_response(json, &request_id),
        Err(err) => {
            tracing::debug!(
                service = config.service_name,
                code = err.code(),
                message = err.message(),
                "request failed"
            );
            error_to_response(&err, &request_id)
        }
    }
}

async fn run<H: JsonHandler>(
    req: http::Request<Bytes>,
    handler: &H,
    config: &JsonServiceConfig,
    ctx: RequestContext,
) -> Result<Vec<u8>, H::Error> {
    let (parts, body) = req.into_parts();

    if parts.method != http::Method::POST {
        return Err(H::Error::validation(format!(
            "JSON protocol requests must use POST, got {}",
            parts.method
        )));
    }
    check_content_type::<H::Error>(&parts.headers)?;

    let op: H::Operation = resolve_operation(&parts.extensions, &parts.headers)?;

    let object = parse_object::<H::Error>(&body)?;
    validate_required::<H::Error>(&object, op.required_fields())?;

    tracing::debug!(
        service = config.service_name,
        operation = %op,
        request_id = %ctx.request_id,
        "dispatching operation"
    );
    handler.handle_operation(op, body, ctx).await
}

fn add_common_headers(
    mut response: http::Response<ResponseBody>,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-amzn-requestid").or_insert(hv);
    }
    headers.insert("server", http::HeaderValue::from_static("MockStack"));
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );
    response
}
