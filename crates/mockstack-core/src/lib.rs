//! Core types, configuration, and state management for MockStack.
//!
//! This crate provides the building blocks shared by every emulated service:
//!
//! - [`StateStore`]: the injected, internally synchronized key-value store
//!   (point get/set/delete, prefix listing, compare-and-swap on revisions)
//! - [`Arn`]: ARN parsing and formatting
//! - [`pagination`]: index-token and natural-key pagination over in-memory slices
//! - [`TagSet`]: tag merge/untag semantics
//! - [`AwsOperation`] / [`ServiceError`]: the contracts the protocol layer
//!   dispatches against
//! - [`QueryParams`]: awsQuery (form-encoded) parameter access

mod arn;
mod config;
mod error;
pub mod ids;
pub mod pagination;
mod params;
mod service;
mod store;
mod tags;
mod types;

pub use arn::{Arn, ArnError};
pub use config::MockStackConfig;
pub use error::{MockStackError, MockStackResult};
pub use ids::RevisionClock;
pub use pagination::{Page, PaginationError};
pub use params::{FromQueryParams, ParamError, QueryParams};
pub use service::{
    AwsOperation, ServiceError, invalid_action_message, lower_camel, missing_field_message,
};
pub use store::{Revisioned, StateStore, StoreError, StoreResult};
pub use tags::TagSet;
pub use types::{AccountId, AwsRegion};
