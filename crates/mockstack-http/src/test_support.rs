//! Minimal operation, error and handler types for exercising the protocol layer.

use std::fmt;
use std::io::{self, Write};

use bytes::Bytes;
use mockstack_core::{AwsOperation, QueryParams, ServiceError, invalid_action_message};
use quick_xml::Writer;

use crate::context::RequestContext;
use crate::json::service::{JsonHandler, JsonHandlerFuture};
use crate::query::service::{QueryHandler, QueryHandlerFuture};
use crate::query::xml::{XmlSerialize, to_query_response, write_text_element};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TestOp {
    Describe,
    List,
    Fail,
}

impl TestOp {
    const ALL: [Self; 3] = [Self::Describe, Self::List, Self::Fail];
}

impl fmt::Display for TestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AwsOperation for TestOp {
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Describe => "Describe",
            Self::List => "List",
            Self::Fail => "Fail",
        }
    }

    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Describe => &["Name"],
            Self::List | Self::Fail => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TestErrorKind {
    Validation,
    InvalidAction,
    Serialization,
    Internal,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub(crate) struct TestError {
    pub kind: TestErrorKind,
    pub message: String,
}

impl TestError {
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: TestErrorKind::NotFound,
            message: message.into(),
        }
    }

    fn of(kind: TestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl ServiceError for TestError {
    fn code(&self) -> &'static str {
        match self.kind {
            TestErrorKind::Validation => "Validation",
            TestErrorKind::InvalidAction => "InvalidAction",
            TestErrorKind::Serialization => "Serialization",
            TestErrorKind::Internal => "Internal",
            TestErrorKind::NotFound => "NotFound",
        }
    }

    fn error_type(&self) -> &'static str {
        match self.kind {
            TestErrorKind::Validation => "test#Validation",
            TestErrorKind::InvalidAction => "test#InvalidAction",
            TestErrorKind::Serialization => "test#Serialization",
            TestErrorKind::Internal => "test#Internal",
            TestErrorKind::NotFound => "test#NotFound",
        }
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn status_code(&self) -> http::StatusCode {
        match self.kind {
            TestErrorKind::NotFound => http::StatusCode::NOT_FOUND,
            TestErrorKind::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::BAD_REQUEST,
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::of(TestErrorKind::Validation, message)
    }

    fn invalid_action(action: &str) -> Self {
        Self::of(TestErrorKind::InvalidAction, invalid_action_message(action))
    }

    fn serialization(message: impl Into<String>) -> Self {
        Self::of(TestErrorKind::Serialization, message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::of(TestErrorKind::Internal, message)
    }
}

/// Echoes the operation name and request body back as JSON.
#[derive(Debug)]
pub(crate) struct EchoJsonHandler;

impl JsonHandler for EchoJsonHandler {
    type Operation = TestOp;
    type Error = TestError;

    fn handle_operation(
        &self,
        op: TestOp,
        body: Bytes,
        _ctx: RequestContext,
    ) -> JsonHandlerFuture<TestError> {
        Box::pin(async move {
            if op == TestOp::Fail {
                return Err(TestError::not_found("nothing here"));
            }
            let echo: serde_json::Value =
                serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
            let out = serde_json::json!({ "Operation": op.as_str(), "Echo": echo });
            serde_json::to_vec(&out).map_err(|e| TestError::internal_error(e.to_string()))
        })
    }
}

struct NameOutput(Option<String>);

impl XmlSerialize for NameOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", self.0.as_deref().unwrap_or_default())
    }
}

/// Echoes the `Name` parameter back inside a query response.
#[derive(Debug)]
pub(crate) struct EchoQueryHandler;

impl QueryHandler for EchoQueryHandler {
    type Operation = TestOp;
    type Error = TestError;

    fn handle_operation(
        &self,
        op: TestOp,
        params: QueryParams,
        ctx: RequestContext,
    ) -> QueryHandlerFuture<TestError> {
        Box::pin(async move {
            if op == TestOp::Fail {
                return Err(TestError::not_found("nothing here"));
            }
            let output = NameOutput(params.optional("Name"));
            to_query_response(op.as_str(), "urn:test", &output, &ctx.request_id)
                .map_err(|e| TestError::internal_error(e.to_string()))
        })
    }
}
