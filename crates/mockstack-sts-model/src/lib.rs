//! STS model types for MockStack.
#![allow(clippy::module_name_repetitions, missing_docs)]

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{StsError, StsErrorCode};
pub use operations::StsOperation;

/// XML namespace of STS responses.
pub const STS_NAMESPACE: &str = "https://sts.amazonaws.com/doc/2011-06-15/";
