//! DynamoDB control-plane model types for MockStack.
//!
//! Input, output, and shared types for table management, table settings,
//! backups, global tables, resource policies, tags, contributor insights,
//! exports and imports. All types follow the DynamoDB JSON wire format with
//! `PascalCase` field names.
#![allow(
    clippy::doc_markdown,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions,
    missing_docs
)]

#[macro_use]
mod macros;

pub mod backup;
pub mod error;
pub mod global_table;
pub mod input;
pub mod insights;
pub mod operations;
pub mod output;
pub mod transfer;
pub mod types;

pub use error::{DynamoDBError, DynamoDBErrorCode};
pub use operations::DynamoDBOperation;
