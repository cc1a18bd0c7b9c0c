//! Protocol layer for MockStack.
//!
//! Two wire protocols cover every emulated service:
//!
//! - **`awsJson`** ([`json`]): `POST /` with `X-Amz-Target: <Service>_<Version>.<Action>`
//!   and a JSON object body. Used by DynamoDB and Lambda.
//! - **`awsQuery`** ([`query`]): form-encoded `Action=<Action>&...` parameters with
//!   XML responses. Used by IAM and STS.
//!
//! Each protocol provides a dispatcher (shell validation, action resolution,
//! required-field validation), a handler trait forming the boundary with the
//! business logic, a response builder, and a hyper `Service`.

pub mod body;
pub mod context;
pub mod json;
pub mod query;

#[cfg(test)]
mod test_support;

pub use body::ResponseBody;
pub use context::{CredentialScope, ExplicitAction, RequestContext, credential_scope};
