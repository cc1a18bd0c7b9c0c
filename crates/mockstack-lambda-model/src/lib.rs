//! Lambda control-plane model types for MockStack.
//!
//! Functions, their resource policies, tags and reserved concurrency. Types
//! use `PascalCase` JSON member names.
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    missing_docs
)]

#[macro_use]
mod macros;

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{LambdaError, LambdaErrorCode};
pub use operations::LambdaOperation;
