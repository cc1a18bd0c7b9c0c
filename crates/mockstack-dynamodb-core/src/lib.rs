//! DynamoDB control-plane business logic for MockStack.
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod handler;
pub mod provider;
pub mod state;
mod validate;

pub use config::DynamoDBConfig;
pub use handler::MockStackDynamoDBHandler;
pub use provider::MockStackDynamoDB;
