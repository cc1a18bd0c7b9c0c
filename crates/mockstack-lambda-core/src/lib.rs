//! Lambda control-plane business logic for MockStack.
//!
//! Functions are stored with their configuration, code location and tags.
//! Nothing is ever invoked.
#![allow(missing_docs, clippy::module_name_repetitions)]

mod code;
pub mod config;
pub mod handler;
pub mod provider;
pub mod state;
mod validate;

pub use config::LambdaConfig;
pub use handler::MockStackLambdaHandler;
pub use provider::MockStackLambda;
