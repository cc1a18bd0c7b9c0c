//! STS business logic for MockStack.
//!
//! Credentials are issued without consulting IAM: any syntactically valid
//! role ARN can be assumed. Issued sessions are remembered so that
//! `GetCallerIdentity` signed with a session key reports the assumed role.
#![allow(missing_docs, clippy::module_name_repetitions)]

pub mod config;
pub mod handler;
pub mod provider;
pub mod state;
mod validate;

pub use config::StsConfig;
pub use handler::MockStackStsHandler;
pub use provider::MockStackSts;
