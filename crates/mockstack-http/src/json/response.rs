//! JSON response serialization and error formatting.

use bytes::Bytes;
use mockstack_core::ServiceError;

use crate::body::ResponseBody;

/// Content type for JSON protocol responses.
pub const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Serialize a service error into a JSON body.
///
/// ```json
/// {
///   "__type": "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
///   "message": "Requested resource not found"
/// }
/// ```
#[must_use]
pub fn error_to_json<E: ServiceError>(error: &E) -> Vec<u8> {
    let body = serde_json::json!({
        "__type": error.error_type(),
        "message": error.message(),
    });
    serde_json::to_vec(&body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize JSON error body");
        Vec::new()
    })
}

fn build(status: http::StatusCode, json: Vec<u8>, request_id: &str) -> http::Response<ResponseBody> {
    let crc = crc32fast::hash(&json);
    let mut response = http::Response::new(ResponseBody::from_bytes(Bytes::from(json)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(CONTENT_TYPE),
    );
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.insert("x-amzn-requestid", hv);
    }
    headers.insert("x-amz-crc32", http::HeaderValue::from(crc));
    response
}

/// Convert a service error into a complete HTTP error response.
#[must_use]
pub fn error_to_response<E: ServiceError>(
    error: &E,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let mut response = build(error.status_code(), error_to_json(error), request_id);
    response.headers_mut().insert(
        "x-amzn-errortype",
        http::HeaderValue::from_static(error.code()),
    );
    response
}

/// Build a 200 response from JSON bytes.
#[must_use]
pub fn json_response(json: Vec<u8>, request_id: &str) -> http::Response<ResponseBody> {
    build(http::StatusCode::OK, json, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::collect;
    use crate::test_support::TestError;

    #[tokio::test]
    async fn test_should_format_error_json_and_headers() {
        let err = TestError::not_found("Table 'users' not found");
        let resp = error_to_response(&err, "req-1");
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["content-type"], CONTENT_TYPE);
        assert_eq!(resp.headers()["x-amzn-requestid"], "req-1");
        assert_eq!(resp.headers()["x-amzn-errortype"], "NotFound");
        assert!(resp.headers().contains_key("x-amz-crc32"));

        let body = collect(resp.into_body()).await;
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["__type"], "test#NotFound");
        assert_eq!(parsed["message"], "Table 'users' not found");
    }

    #[tokio::test]
    async fn test_should_checksum_success_body() {
        let json = br#"{"TableNames":["users"]}"#.to_vec();
        let expected = crc32fast::hash(&json).to_string();
        let resp = json_response(json, "req-2");
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()["x-amz-crc32"], expected.as_str());
    }
}
