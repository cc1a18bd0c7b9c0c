//! The `awsQuery` protocol (IAM, STS).

pub mod service;
pub mod xml;

pub use service::{
    QueryHandler, QueryHandlerFuture, QueryHttpService, QueryServiceConfig, decode_params,
};
pub use xml::{XmlError, XmlSerialize, to_empty_query_response, to_query_response};
