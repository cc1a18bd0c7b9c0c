//! REST routes of the Lambda API.
//!
//! SDK clients address Lambda with `restJson` paths such as
//! `GET /2015-03-31/functions/{name}`. Each route is translated into its
//! action name and a JSON body carrying the path and query members, so the
//! same `awsJson` handler serves both styles.

use bytes::Bytes;
use http::{Method, StatusCode};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

const REST_PREFIXES: &[&str] = &[
    "/2015-03-31/functions",
    "/2017-03-31/tags/",
    "/2017-10-31/functions/",
    "/2019-09-30/functions/",
];

/// A REST request resolved to a JSON action call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestCall {
    pub action: &'static str,
    pub body: Bytes,
    /// Status returned in place of `200 OK` on success.
    pub success: StatusCode,
}

/// Whether `path` belongs to the Lambda REST API.
#[must_use]
pub fn is_rest_path(path: &str) -> bool {
    REST_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Where a route reads its members from.
#[derive(Debug, Clone, Copy)]
enum Member {
    /// Path segment at the given index.
    Path(usize, &'static str),
    /// Query parameter copied as a string.
    Query(&'static str, &'static str),
    /// Query parameter copied as a number when it parses as one.
    QueryNumber(&'static str, &'static str),
    /// Every value of a repeated query parameter, as a list.
    QueryList(&'static str, &'static str),
}

struct Route {
    method: Method,
    /// Segment pattern; `*` matches any single segment.
    pattern: &'static [&'static str],
    action: &'static str,
    success: StatusCode,
    members: &'static [Member],
}

const FUNCTION: Member = Member::Path(2, "FunctionName");
const QUALIFIER: Member = Member::Query("Qualifier", "Qualifier");

static ROUTES: &[Route] = &[
    Route {
        method: Method::POST,
        pattern: &["2015-03-31", "functions"],
        action: "CreateFunction",
        success: StatusCode::CREATED,
        members: &[],
    },
    Route {
        method: Method::GET,
        pattern: &["2015-03-31", "functions"],
        action: "ListFunctions",
        success: StatusCode::OK,
        members: &[
            Member::Query("Marker", "Marker"),
            Member::QueryNumber("MaxItems", "MaxItems"),
            Member::Query("MasterRegion", "MasterRegion"),
            Member::Query("FunctionVersion", "FunctionVersion"),
        ],
    },
    Route {
        method: Method::GET,
        pattern: &["2015-03-31", "functions", "*"],
        action: "GetFunction",
        success: StatusCode::OK,
        members: &[FUNCTION, QUALIFIER],
    },
    Route {
        method: Method::DELETE,
        pattern: &["2015-03-31", "functions", "*"],
        action: "DeleteFunction",
        success: StatusCode::NO_CONTENT,
        members: &[FUNCTION, QUALIFIER],
    },
    Route {
        method: Method::GET,
        pattern: &["2015-03-31", "functions", "*", "configuration"],
        action: "GetFunctionConfiguration",
        success: StatusCode::OK,
        members: &[FUNCTION, QUALIFIER],
    },
    Route {
        method: Method::PUT,
        pattern: &["2015-03-31", "functions", "*", "configuration"],
        action: "UpdateFunctionConfiguration",
        success: StatusCode::OK,
        members: &[FUNCTION],
    },
    Route {
        method: Method::PUT,
        pattern: &["2015-03-31", "functions", "*", "code"],
        action: "UpdateFunctionCode",
        success: StatusCode::OK,
        members: &[FUNCTION],
    },
    Route {
        method: Method::POST,
        pattern: &["2015-03-31", "functions", "*", "policy"],
        action: "AddPermission",
        success: StatusCode::CREATED,
        members: &[FUNCTION, QUALIFIER],
    },
    Route {
        method: Method::GET,
        pattern: &["2015-03-31", "functions", "*", "policy"],
        action: "GetPolicy",
        success: StatusCode::OK,
        members: &[FUNCTION, QUALIFIER],
    },
    Route {
        method: Method::DELETE,
        pattern: &["2015-03-31", "functions", "*", "policy", "*"],
        action: "RemovePermission",
        success: StatusCode::NO_CONTENT,
        members: &[
            FUNCTION,
            Member::Path(4, "StatementId"),
            QUALIFIER,
            Member::Query("RevisionId", "RevisionId"),
        ],
    },
    Route {
        method: Method::POST,
        pattern: &["2017-03-31", "tags", "*"],
        action: "TagResource",
        success: StatusCode::NO_CONTENT,
        members: &[Member::Path(2, "Resource")],
    },
    Route {
        method: Method::DELETE,
        pattern: &["2017-03-31", "tags", "*"],
        action: "UntagResource",
        success: StatusCode::NO_CONTENT,
        members: &[Member::Path(2, "Resource"), Member::QueryList("tagKeys", "TagKeys")],
    },
    Route {
        method: Method::GET,
        pattern: &["2017-03-31", "tags", "*"],
        action: "ListTags",
        success: StatusCode::OK,
        members: &[Member::Path(2, "Resource")],
    },
    Route {
        method: Method::PUT,
        pattern: &["2017-10-31", "functions", "*", "concurrency"],
        action: "PutFunctionConcurrency",
        success: StatusCode::OK,
        members: &[FUNCTION],
    },
    Route {
        method: Method::GET,
        pattern: &["2019-09-30", "functions", "*", "concurrency"],
        action: "GetFunctionConcurrency",
        success: StatusCode::OK,
        members: &[FUNCTION],
    },
    Route {
        method: Method::DELETE,
        pattern: &["2017-10-31", "functions", "*", "concurrency"],
        action: "DeleteFunctionConcurrency",
        success: StatusCode::NO_CONTENT,
        members: &[FUNCTION],
    },
];

impl Route {
    fn matches(&self, method: &Method, segments: &[String]) -> bool {
        &self.method == method
            && self.pattern.len() == segments.len()
            && self
                .pattern
                .iter()
                .zip(segments)
                .all(|(pattern, segment)| *pattern == "*" || pattern == segment)
    }
}

/// Resolve a REST request to its action call. Returns `None` for paths that
/// name no Lambda route.
#[must_use]
pub fn translate(req: &http::Request<Bytes>) -> Option<RestCall> {
    let segments: Vec<String> = req
        .uri()
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();
    let route = ROUTES
        .iter()
        .find(|route| route.matches(req.method(), &segments))?;
    let query: Vec<(String, String)> = req
        .uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    Some(RestCall {
        action: route.action,
        body: merge_members(req.body(), route.members, &segments, &query),
        success: route.success,
    })
}

/// Add path and query members to the JSON body. Bodies that are not JSON
/// objects are passed through so the handler reports them.
fn merge_members(
    body: &Bytes,
    members: &[Member],
    segments: &[String],
    query: &[(String, String)],
) -> Bytes {
    let mut object = if body.is_empty() {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(object)) => object,
            _ => return body.clone(),
        }
    };
    if members.is_empty() {
        return body.clone();
    }

    let first = |name: &str| {
        query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    for member in members {
        let (field, value) = match *member {
            Member::Path(index, field) => (field, segments.get(index).cloned().map(Value::String)),
            Member::Query(param, field) => (field, first(param).map(Value::String)),
            Member::QueryNumber(param, field) => (
                field,
                first(param).map(|raw| {
                    raw.parse::<i64>()
                        .map_or(Value::String(raw), |n| Value::Number(n.into()))
                }),
            ),
            Member::QueryList(param, field) => {
                let values: Vec<Value> = query
                    .iter()
                    .filter(|(k, _)| k == param)
                    .map(|(_, v)| Value::String(v.clone()))
                    .collect();
                (field, (!values.is_empty()).then_some(Value::Array(values)))
            }
        };
        if let Some(value) = value {
            object.insert(field.to_owned(), value);
        }
    }
    Bytes::from(Value::Object(object).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, uri: &str, body: &str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from(body.to_owned()))
            .unwrap()
    }

    fn body_of(call: &RestCall) -> Value {
        serde_json::from_slice(&call.body).unwrap()
    }

    #[test]
    fn test_should_recognize_rest_prefixes() {
        assert!(is_rest_path("/2015-03-31/functions/"));
        assert!(is_rest_path("/2017-03-31/tags/arn"));
        assert!(is_rest_path("/2019-09-30/functions/f/concurrency"));
        assert!(!is_rest_path("/"));
        assert!(!is_rest_path("/2015-03-31/event-source-mappings/"));
    }

    #[test]
    fn test_should_translate_get_function_with_qualifier() {
        let call = translate(&request(
            "GET",
            "/2015-03-31/functions/my-fn?Qualifier=%24LATEST",
            "",
        ))
        .unwrap();
        assert_eq!(call.action, "GetFunction");
        assert_eq!(
            body_of(&call),
            serde_json::json!({"FunctionName": "my-fn", "Qualifier": "$LATEST"})
        );
    }

    #[test]
    fn test_should_pass_create_body_through_with_created_status() {
        let body = r#"{"FunctionName":"f","Role":"r","Code":{}}"#;
        let call = translate(&request("POST", "/2015-03-31/functions/", body)).unwrap();
        assert_eq!(call.action, "CreateFunction");
        assert_eq!(call.success, StatusCode::CREATED);
        assert_eq!(call.body, Bytes::from(body));
    }

    #[test]
    fn test_should_merge_function_name_into_update_body() {
        let call = translate(&request(
            "PUT",
            "/2015-03-31/functions/f/configuration",
            r#"{"Timeout":30}"#,
        ))
        .unwrap();
        assert_eq!(call.action, "UpdateFunctionConfiguration");
        assert_eq!(
            body_of(&call),
            serde_json::json!({"FunctionName": "f", "Timeout": 30})
        );
    }

    #[test]
    fn test_should_decode_arn_in_tag_path() {
        let call = translate(&request(
            "DELETE",
            "/2017-03-31/tags/arn%3Aaws%3Alambda%3Aus-east-1%3A000000000000%3Afunction%3Af?tagKeys=a&tagKeys=b",
            "",
        ))
        .unwrap();
        assert_eq!(call.action, "UntagResource");
        assert_eq!(call.success, StatusCode::NO_CONTENT);
        assert_eq!(
            body_of(&call),
            serde_json::json!({
                "Resource": "arn:aws:lambda:us-east-1:000000000000:function:f",
                "TagKeys": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_should_translate_remove_permission_with_statement_id() {
        let call = translate(&request(
            "DELETE",
            "/2015-03-31/functions/f/policy/sid-1?RevisionId=r1",
            "",
        ))
        .unwrap();
        assert_eq!(call.action, "RemovePermission");
        assert_eq!(
            body_of(&call),
            serde_json::json!({"FunctionName": "f", "StatementId": "sid-1", "RevisionId": "r1"})
        );
    }

    #[test]
    fn test_should_parse_max_items_as_number() {
        let call = translate(&request("GET", "/2015-03-31/functions/?MaxItems=5", "")).unwrap();
        assert_eq!(call.action, "ListFunctions");
        assert_eq!(body_of(&call), serde_json::json!({"MaxItems": 5}));
    }

    #[test]
    fn test_should_route_concurrency_by_api_version() {
        let get = translate(&request("GET", "/2019-09-30/functions/f/concurrency", "")).unwrap();
        assert_eq!(get.action, "GetFunctionConcurrency");
        let put = translate(&request(
            "PUT",
            "/2017-10-31/functions/f/concurrency",
            r#"{"ReservedConcurrentExecutions":10}"#,
        ))
        .unwrap();
        assert_eq!(put.action, "PutFunctionConcurrency");
        assert!(translate(&request("GET", "/2017-10-31/functions/f/concurrency", "")).is_none());
    }

    #[test]
    fn test_should_reject_unknown_method_or_path() {
        assert!(translate(&request("PATCH", "/2015-03-31/functions/f", "")).is_none());
        assert!(translate(&request("GET", "/2015-03-31/functions/f/aliases", "")).is_none());
    }

    #[test]
    fn test_should_pass_non_object_body_through() {
        let call = translate(&request("PUT", "/2015-03-31/functions/f/code", "[1]")).unwrap();
        assert_eq!(call.body, Bytes::from("[1]"));
    }
}
