//! Gateway service that routes requests to the hosted services.
//!
//! Every request is buffered once, then offered to each registered
//! [`ServiceRouter`] in order. DynamoDB and Lambda are claimed by their
//! `X-Amz-Target` prefix (Lambda also by its REST paths), IAM and STS by the
//! SigV4 signing name or the `Host` prefix. Unsigned form requests that no
//! router claims are matched on their `Action` parameter.
//!
//! Health-check endpoints (`/_localstack/health`, `/_health`, `/health`) are
//! intercepted at the gateway level and report every hosted service.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use mockstack_core::QueryParams;
use tracing::debug;

use crate::service::{GatewayBody, ServiceRouter, gateway_body_from_string};

/// Gateway that routes incoming HTTP requests across the enabled services.
#[derive(Clone)]
pub struct GatewayService {
    routers: Arc<[Box<dyn ServiceRouter>]>,
}

impl std::fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("services", &self.service_names())
            .finish()
    }
}

impl GatewayService {
    /// Create a gateway over routers tried in the given order.
    pub fn new(routers: Vec<Box<dyn ServiceRouter>>) -> Self {
        Self {
            routers: routers.into(),
        }
    }

    /// Names of the hosted services, in routing order.
    #[must_use]
    pub fn service_names(&self) -> Vec<&'static str> {
        self.routers.iter().map(|r| r.name()).collect()
    }

    /// Route a buffered request.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<GatewayBody> {
        if is_health_check(req.method(), req.uri().path()) {
            return health_check_response(&self.service_names());
        }

        if let Some(router) = self.routers.iter().find(|r| r.matches(&req)) {
            debug!(service = router.name(), path = %req.uri().path(), "routing request");
            return router.call(req).await;
        }

        if let Some(action) = query_action(&req) {
            if let Some(router) = self.routers.iter().find(|r| r.supports_action(&action)) {
                debug!(service = router.name(), %action, "routing by action");
                return router.call(req).await;
            }
        }

        debug!(method = %req.method(), path = %req.uri().path(), "no service matched");
        not_found_response()
    }
}

impl Service<http::Request<Incoming>> for GatewayService {
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let gateway = self.clone();
        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            let response = match incoming.collect().await {
                Ok(collected) => {
                    gateway
                        .handle(http::Request::from_parts(parts, collected.to_bytes()))
                        .await
                }
                Err(e) => json_response(
                    http::StatusCode::BAD_REQUEST,
                    &serde_json::json!({
                        "__type": "SerializationException",
                        "message": format!("Failed to read request body: {e}"),
                    }),
                ),
            };
            Ok(response)
        })
    }
}

/// The `Action` of an unsigned awsQuery request, from the query string or a
/// form-encoded body.
fn query_action(req: &http::Request<Bytes>) -> Option<String> {
    let mut params = req
        .uri()
        .query()
        .map(|q| QueryParams::parse(q.as_bytes()))
        .unwrap_or_default();
    let is_form = req
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        params.extend_from(QueryParams::parse(req.body()));
    }
    params.action().map(str::to_owned)
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    (*method == http::Method::GET || *method == http::Method::HEAD)
        && matches!(path, "/_localstack/health" | "/_health" | "/health")
}

fn json_response(status: http::StatusCode, body: &serde_json::Value) -> http::Response<GatewayBody> {
    let mut response = http::Response::new(gateway_body_from_string(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

/// Produce a combined health check response for all hosted services.
fn health_check_response(services: &[&str]) -> http::Response<GatewayBody> {
    let services: serde_json::Map<String, serde_json::Value> = services
        .iter()
        .map(|name| ((*name).to_owned(), serde_json::Value::from("running")))
        .collect();
    json_response(
        http::StatusCode::OK,
        &serde_json::json!({
            "services": services,
            "edition": "community",
            "version": crate::VERSION,
        }),
    )
}

fn not_found_response() -> http::Response<GatewayBody> {
    json_response(
        http::StatusCode::NOT_FOUND,
        &serde_json::json!({
            "__type": "UnknownOperationException",
            "message": "No service is registered for this request",
        }),
    )
}
