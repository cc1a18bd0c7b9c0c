//! Service router abstraction for the gateway.
//!
//! Each hosted service implements [`ServiceRouter`] to declare which requests
//! it claims and how it answers them. The gateway buffers the request body
//! once, then dispatches to the first router that matches.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use mockstack_core::ServiceError;
use mockstack_http::context::{ExplicitAction, credential_scope};
use mockstack_http::json::{JsonHandler, JsonHttpService};
use mockstack_http::query::{QueryHandler, QueryHttpService};
use mockstack_http::{ResponseBody, json};

use crate::lambda_rest::RestCall;

/// Type-erased response body used by the gateway.
pub type GatewayBody = BoxBody<Bytes, io::Error>;

/// Future returned by [`ServiceRouter::call`].
pub type RouterFuture = Pin<Box<dyn Future<Output = http::Response<GatewayBody>> + Send>>;

/// Create a [`GatewayBody`] from a string.
pub fn gateway_body_from_string(s: impl Into<String>) -> GatewayBody {
    Full::new(Bytes::from(s.into()))
        .map_err(|never: Infallible| match never {})
        .boxed()
}

fn boxed(response: http::Response<ResponseBody>) -> http::Response<GatewayBody> {
    response.map(BodyExt::boxed)
}

/// A routable service registered with the gateway.
pub trait ServiceRouter: Send + Sync {
    /// Service name for health reporting (`"dynamodb"`, `"iam"`, ...).
    fn name(&self) -> &'static str;

    /// Whether this router claims the request from its headers, path or host.
    fn matches(&self, req: &http::Request<Bytes>) -> bool;

    /// Whether an awsQuery `Action` belongs to this service. Used for
    /// requests no router claimed by headers.
    fn supports_action(&self, _action: &str) -> bool {
        false
    }

    fn call(&self, req: http::Request<Bytes>) -> RouterFuture;
}

// ---------------------------------------------------------------------------
// awsJson services
// ---------------------------------------------------------------------------

/// Translation of REST-style requests into a JSON action call.
#[derive(Debug, Clone, Copy)]
pub struct RestBinding {
    pub matches_path: fn(&str) -> bool,
    pub translate: fn(&http::Request<Bytes>) -> Option<RestCall>,
}

/// Routes `awsJson` requests by `X-Amz-Target` prefix, plus optional REST paths.
#[derive(Debug)]
pub struct JsonServiceRouter<H: JsonHandler> {
    name: &'static str,
    target_prefix: &'static str,
    inner: JsonHttpService<H>,
    rest: Option<RestBinding>,
}

impl<H: JsonHandler> JsonServiceRouter<H> {
    /// Create a router for `inner`.
    pub fn new(name: &'static str, target_prefix: &'static str, inner: JsonHttpService<H>) -> Self {
        Self {
            name,
            target_prefix,
            inner,
            rest: None,
        }
    }

    /// Also serve the REST paths described by `rest`.
    #[must_use]
    pub fn with_rest(mut self, rest: RestBinding) -> Self {
        self.rest = Some(rest);
        self
    }

    fn has_target(&self, req: &http::Request<Bytes>) -> bool {
        req.headers()
            .get("x-amz-target")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|t| t.starts_with(self.target_prefix))
    }
}

impl<H: JsonHandler> ServiceRouter for JsonServiceRouter<H> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, req: &http::Request<Bytes>) -> bool {
        self.has_target(req)
            || self
                .rest
                .is_some_and(|rest| (rest.matches_path)(req.uri().path()))
    }

    fn call(&self, req: http::Request<Bytes>) -> RouterFuture {
        let svc = self.inner.clone();
        if self.has_target(&req) {
            return Box::pin(async move { boxed(svc.handle(req).await) });
        }

        let call = self.rest.and_then(|rest| (rest.translate)(&req));
        Box::pin(async move {
            let Some(call) = call else {
                let err = H::Error::invalid_action(req.uri().path());
                let request_id = mockstack_core::ids::request_id();
                let mut response = json::error_to_response(&err, &request_id);
                *response.status_mut() = http::StatusCode::NOT_FOUND;
                return boxed(response);
            };
            let success = call.success;
            let mut response = svc.handle(call.into_request(req)).await;
            if response.status() == http::StatusCode::OK {
                *response.status_mut() = success;
                if success == http::StatusCode::NO_CONTENT {
                    *response.body_mut() = ResponseBody::empty();
                }
            }
            boxed(response)
        })
    }
}

impl RestCall {
    /// Rebuild the request as a JSON protocol call, keeping the caller's headers.
    fn into_request(self, original: http::Request<Bytes>) -> http::Request<Bytes> {
        let (mut parts, _) = original.into_parts();
        parts.method = http::Method::POST;
        parts.headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/x-amz-json-1.1"),
        );
        parts
            .extensions
            .insert(ExplicitAction(self.action.to_owned()));
        http::Request::from_parts(parts, self.body)
    }
}

// ---------------------------------------------------------------------------
// awsQuery services
// ---------------------------------------------------------------------------

/// Routes `awsQuery` requests by SigV4 signing name or `Host` prefix.
#[derive(Debug)]
pub struct QueryServiceRouter<H: QueryHandler> {
    signing_name: &'static str,
    inner: QueryHttpService<H>,
}

impl<H: QueryHandler> QueryServiceRouter<H> {
    /// Create a router for `inner`.
    pub fn new(signing_name: &'static str, inner: QueryHttpService<H>) -> Self {
        Self {
            signing_name,
            inner,
        }
    }
}

/// Whether the `Host` header starts with `<service>.`.
fn host_names_service(headers: &http::HeaderMap, service: &str) -> bool {
    headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|host| host.strip_prefix(service))
        .is_some_and(|rest| rest.starts_with('.'))
}

impl<H: QueryHandler> ServiceRouter for QueryServiceRouter<H> {
    fn name(&self) -> &'static str {
        self.signing_name
    }

    fn matches(&self, req: &http::Request<Bytes>) -> bool {
        match credential_scope(req.headers()) {
            Some(scope) => scope.service == self.signing_name,
            None => host_names_service(req.headers(), self.signing_name),
        }
    }

    fn supports_action(&self, action: &str) -> bool {
        self.inner.supports_action(action)
    }

    fn call(&self, req: http::Request<Bytes>) -> RouterFuture {
        let svc = self.inner.clone();
        Box::pin(async move { boxed(svc.handle(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> http::Request<Bytes> {
        let mut builder = http::Request::builder().method("POST").uri("/");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_should_match_host_prefix_exactly() {
        let req = request(&[("host", "sts.localhost.localstack.cloud:4566")]);
        assert!(host_names_service(req.headers(), "sts"));
        let req = request(&[("host", "stsx.localhost")]);
        assert!(!host_names_service(req.headers(), "sts"));
        let req = request(&[("host", "localhost:4566")]);
        assert!(!host_names_service(req.headers(), "iam"));
    }

    #[test]
    fn test_should_rewrite_rest_call_as_json_request() {
        let original = http::Request::builder()
            .method("GET")
            .uri("/2015-03-31/functions/f")
            .header("authorization", "AWS4-HMAC-SHA256 Credential=AKID/20240101/us-east-1/lambda/aws4_request")
            .body(Bytes::new())
            .unwrap();
        let call = RestCall {
            action: "GetFunction",
            body: Bytes::from_static(br#"{"FunctionName":"f"}"#),
            success: http::StatusCode::OK,
        };
        let req = call.into_request(original);
        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(
            req.extensions().get::<ExplicitAction>(),
            Some(&ExplicitAction("GetFunction".to_owned()))
        );
        assert!(req.headers().contains_key("authorization"));
    }
}
