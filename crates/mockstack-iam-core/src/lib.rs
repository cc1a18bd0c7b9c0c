//! IAM business logic for MockStack.
//!
//! Roles with inline and attached policies, customer managed policies with
//! versions, and users. Nothing is enforced: policies are stored and
//! returned, never evaluated.
#![allow(missing_docs, clippy::module_name_repetitions)]

pub mod config;
pub mod handler;
pub mod provider;
pub mod state;
mod validate;

pub use config::IamConfig;
pub use handler::MockStackIamHandler;
pub use provider::MockStackIam;
