//! Hyper `Service` for `awsQuery` protocol services.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use mockstack_core::{
    AwsOperation, FromQueryParams, ParamError, QueryParams, ServiceError, missing_field_message,
};

use crate::body::ResponseBody;
use crate::context::{ExplicitAction, RequestContext};
use crate::query::xml::error_to_xml;

/// Content type of `awsQuery` responses.
pub const CONTENT_TYPE: &str = "text/xml";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Boxed future returned by [`QueryHandler::handle_operation`].
pub type QueryHandlerFuture<E> = Pin<Box<dyn Future<Output = Result<Vec<u8>, E>> + Send>>;

/// Business logic behind an `awsQuery` service.
///
/// The handler receives the resolved operation and its decoded parameters and
/// returns the complete XML response document.
pub trait QueryHandler: Send + Sync + 'static {
    /// The service's operation enum.
    type Operation: AwsOperation;
    /// The service's error type.
    type Error: ServiceError;

    /// Handle one operation.
    fn handle_operation(
        &self,
        op: Self::Operation,
        params: QueryParams,
        ctx: RequestContext,
    ) -> QueryHandlerFuture<Self::Error>;
}

/// Configuration for an `awsQuery` service.
#[derive(Debug, Clone)]
pub struct QueryServiceConfig {
    /// Service name used in logs and gateway routing.
    pub service_name: &'static str,
    /// XML namespace of response documents.
    pub namespace: &'static str,
}

/// Hyper `Service` wrapping a [`QueryHandler`].
#[derive(Debug)]
pub struct QueryHttpService<H> {
    handler: Arc<H>,
    config: Arc<QueryServiceConfig>,
}

impl<H: QueryHandler> QueryHttpService<H> {
    /// Create a service dispatching to `handler`.
    pub fn new(handler: Arc<H>, config: QueryServiceConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }

    /// Protocol settings this service was built with.
    #[must_use]
    pub fn config(&self) -> &QueryServiceConfig {
        &self.config
    }

    /// Whether `action` names an operation of this service.
    #[must_use]
    pub fn supports_action(&self, action: &str) -> bool {
        H::Operation::from_name(action).is_some()
    }

    /// Run a buffered request through the full pipeline.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<ResponseBody> {
        let ctx = RequestContext::from_headers(req.headers());
        let request_id = ctx.request_id.clone();
        match run(req, self.handler.as_ref(), &self.config, ctx).await {
            Ok(xml) => xml_response(http::StatusCode::OK, xml, &request_id),
            Err(err) => {
                tracing::debug!(
                    service = self.config.service_name,
                    code = err.code(),
                    message = err.message(),
                    "request failed"
                );
                error_to_response(&err, self.config.namespace, &request_id)
            }
        }
    }
}

impl<H> Clone for QueryHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: QueryHandler> hyper::service::Service<http::Request<Incoming>> for QueryHttpService<H> {
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
                    let request_id = mockstack_core::ids::request_id();
                    let err = H::Error::internal_error(format!("Failed to read request body: {e}"));
                    error_to_response(&err, svc.config.namespace, &request_id)
                }
            };
            Ok(response)
        })
    }
}

/// Decode all parameters of a query request: query string merged with the form body.
pub fn parse_params<E: ServiceError>(req: &http::Request<Bytes>) -> Result<QueryParams, E> {
    let method = req.method();
    if method == http::Method::POST {
        if let Some(value) = req.headers().get(http::header::CONTENT_TYPE) {
            let is_form = value
                .to_str()
                .unwrap_or_default()
                .to_ascii_lowercase()
                .starts_with(FORM_CONTENT_TYPE);
            if !is_form {
                return Err(E::validation(format!(
                    "Query protocol requests must be {FORM_CONTENT_TYPE}"
                )));
            }
        }
    } else if method != http::Method::GET {
        return Err(E::validation(format!(
            "Query protocol requests must use POST or GET, got {method}"
        )));
    }

    let mut params = QueryParams::parse(req.body());
    if let Some(query) = req.uri().query() {
        params.extend_from(QueryParams::parse(query.as_bytes()));
    }
    Ok(params)
}

/// Resolve the operation from the explicit extension or the `Action` parameter.
pub fn resolve_operation<O, E>(extensions: &http::Extensions, params: &QueryParams) -> Result<O, E>
where
    O: AwsOperation,
    E: ServiceError,
{
    let name = extensions
        .get::<ExplicitAction>()
        .map(|a| a.0.as_str())
        .or_else(|| params.action())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| E::invalid_action(""))?;
    O::from_name(name).ok_or_else(|| E::invalid_action(name))
}

/// Check every required parameter is present and non-empty.
pub fn validate_required<E: ServiceError>(params: &QueryParams, fields: &[&str]) -> Result<(), E> {
    match fields.iter().find(|f| !params.has(f)) {
        Some(field) => Err(E::validation(missing_field_message(field))),
        None => Ok(()),
    }
}

/// Build a typed input from parameters, mapping failures to a validation error.
pub fn decode_params<T, E>(params: &QueryParams) -> Result<T, E>
where
    T: FromQueryParams,
    E: ServiceError,
{
    T::from_query_params(params).map_err(|e| match e {
        ParamError::Missing(field) => E::validation(missing_field_message(&field)),
        invalid @ ParamError::Invalid { .. } => E::validation(invalid.to_string()),
    })
}

async fn run<H: QueryHandler>(
    req: http::Request<Bytes>,
    handler: &H,
    config: &QueryServiceConfig,
    ctx: RequestContext,
) -> Result<Vec<u8>, H::Error> {
    let params = parse_params::<H::Error>(&req)?;
    let op: H::Operation = resolve_operation(req.extensions(), &params)?;
    validate_required::<H::Error>(&params, op.required_fields())?;

    tracing::debug!(
        service = config.service_name,
        operation = %op,
        request_id = %ctx.request_id,
        "dispatching operation"
    );
    handler.handle_operation(op, params, ctx).await
}

fn xml_response(
    status: http::StatusCode,
    xml: Vec<u8>,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let mut response = http::Response::new(ResponseBody::from_bytes(xml));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(CONTENT_TYPE),
    );
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.insert("x-amzn-requestid", hv);
    }
    headers.insert("server", http::HeaderValue::from_static("MockStack"));
    response
}

/// Convert a service error into a complete XML error response.
#[must_use]
pub fn error_to_response<E: ServiceError>(
    error: &E,
    namespace: &str,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let xml = error_to_xml(
        error.fault(),
        error.code(),
        error.message(),
        namespace,
        request_id,
    );
    xml_response(error.status_code(), xml, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::collect;
    use crate::test_support::EchoQueryHandler;

    fn service() -> QueryHttpService<EchoQueryHandler> {
        QueryHttpService::new(
            Arc::new(EchoQueryHandler),
            QueryServiceConfig {
                service_name: "test",
                namespace: "urn:test",
            },
        )
    }

    fn form(body: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(http::Method::POST)
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body(Bytes::from(body.to_owned()))
            .unwrap()
    }

    async fn text(resp: http::Response<ResponseBody>) -> String {
        String::from_utf8(collect(resp.into_body()).await.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_should_dispatch_form_request() {
        let resp = service().handle(form("Action=Describe&Name=alpha")).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], CONTENT_TYPE);
        let xml = text(resp).await;
        assert!(xml.contains("<DescribeResponse xmlns=\"urn:test\">"));
        assert!(xml.contains("<Name>alpha</Name>"));
    }

    #[tokio::test]
    async fn test_should_accept_get_with_query_string() {
        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri("/?Action=Describe&Name=beta")
            .body(Bytes::new())
            .unwrap();
        let xml = text(service().handle(req).await).await;
        assert!(xml.contains("<Name>beta</Name>"));
    }

    #[tokio::test]
    async fn test_should_reject_missing_action() {
        let resp = service().handle(form("Name=x")).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let xml = text(resp).await;
        assert!(xml.contains("<Code>InvalidAction</Code>"));
        assert!(xml.contains("<Type>Sender</Type>"));
    }

    #[tokio::test]
    async fn test_should_reject_unknown_action() {
        let xml = text(service().handle(form("Action=Nope")).await).await;
        assert!(xml.contains("<Code>InvalidAction</Code>"));
        assert!(xml.contains("Nope"));
    }

    #[tokio::test]
    async fn test_should_reject_missing_required_parameter() {
        let resp = service().handle(form("Action=Describe")).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let xml = text(resp).await;
        assert!(xml.contains("<Code>Validation</Code>"));
        assert!(xml.contains("&apos;name&apos;") || xml.contains("'name'"));
    }

    #[tokio::test]
    async fn test_should_reject_json_content_type_and_other_methods() {
        let mut req = form("Action=List");
        req.headers_mut().insert(
            "content-type",
            http::HeaderValue::from_static("application/json"),
        );
        let resp = service().handle(req).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);

        let mut req = form("Action=List");
        *req.method_mut() = http::Method::PUT;
        let xml = text(service().handle(req).await).await;
        assert!(xml.contains("<Code>Validation</Code>"));
    }

    #[tokio::test]
    async fn test_should_render_handler_errors_as_error_response() {
        let resp = service().handle(form("Action=Fail")).await;
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        let xml = text(resp).await;
        assert!(xml.contains("<ErrorResponse xmlns=\"urn:test\">"));
        assert!(xml.contains("<Code>NotFound</Code>"));
    }

    #[test]
    fn test_should_report_supported_actions() {
        assert!(service().supports_action("List"));
        assert!(!service().supports_action("AssumeRole"));
    }
}
