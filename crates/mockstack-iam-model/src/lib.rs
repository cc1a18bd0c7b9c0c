//! IAM model types for MockStack.
//!
//! Inputs are decoded from awsQuery parameters via [`FromQueryParams`];
//! outputs write their `<{Action}Result>` contents via [`XmlSerialize`].
//! Policy documents are held as raw JSON and URL-encoded on output.
//!
//! [`FromQueryParams`]: mockstack_core::FromQueryParams
//! [`XmlSerialize`]: mockstack_http::query::XmlSerialize
#![allow(clippy::module_name_repetitions, missing_docs)]

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{IamError, IamErrorCode};
pub use operations::IamOperation;

/// XML namespace of IAM responses.
pub const IAM_NAMESPACE: &str = "https://iam.amazonaws.com/doc/2010-05-08/";
