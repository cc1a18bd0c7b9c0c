//! The `awsJson` protocol (DynamoDB, Lambda).

pub mod response;
pub mod router;
pub mod service;
pub mod validate;

pub use response::{CONTENT_TYPE, error_to_response, json_response};
pub use service::{JsonHandler, JsonHandlerFuture, JsonHttpService, JsonServiceConfig};
pub use validate::{decode_input, encode_output};
