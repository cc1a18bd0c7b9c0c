//! IAM handler bridging the awsQuery protocol layer to the provider.

use std::sync::Arc;

use mockstack_core::{FromQueryParams, QueryParams, ServiceError};
use mockstack_http::RequestContext;
use mockstack_http::query::{
    QueryHandler, QueryHandlerFuture, XmlSerialize, decode_params, to_empty_query_response,
    to_query_response,
};
use mockstack_iam_model::{IAM_NAMESPACE, IamError, IamOperation};
use tracing::debug;

use crate::provider::MockStackIam;

/// Handler that bridges the HTTP layer to the IAM provider.
#[derive(Debug, Clone)]
pub struct MockStackIamHandler {
    provider: Arc<MockStackIam>,
}

impl MockStackIamHandler {
    /// Create a handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<MockStackIam>) -> Self {
        Self { provider }
    }
}

impl QueryHandler for MockStackIamHandler {
    type Operation = IamOperation;
    type Error = IamError;

    fn handle_operation(
        &self,
        op: IamOperation,
        params: QueryParams,
        ctx: RequestContext,
    ) -> QueryHandlerFuture<IamError> {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move {
            debug!(operation = %op, request_id = %ctx.request_id, "dispatching iam operation");
            dispatch(&provider, op, &params, &ctx.request_id)
        })
    }
}

/// Decode, run, and wrap the output in the `<{Action}Response>` envelope.
fn invoke<I: FromQueryParams, O: XmlSerialize>(
    op: IamOperation,
    params: &QueryParams,
    request_id: &str,
    handle: impl FnOnce(I) -> Result<O, IamError>,
) -> Result<Vec<u8>, IamError> {
    let output = handle(decode_params::<I, IamError>(params)?)?;
    let xml = if op.has_result() {
        to_query_response(op.as_str(), IAM_NAMESPACE, &output, request_id)
    } else {
        to_empty_query_response(op.as_str(), IAM_NAMESPACE, request_id)
    };
    xml.map_err(|e| <IamError as ServiceError>::internal_error(e.to_string()))
}

fn dispatch(
    provider: &MockStackIam,
    op: IamOperation,
    params: &QueryParams,
    request_id: &str,
) -> Result<Vec<u8>, IamError> {
    use IamOperation as Op;

    let p = params;
    let id = request_id;
    match op {
        Op::CreateRole => invoke(op, p, id, |i| provider.handle_create_role(i)),
        Op::GetRole => invoke(op, p, id, |i| provider.handle_get_role(i)),
        Op::DeleteRole => invoke(op, p, id, |i| provider.handle_delete_role(i)),
        Op::ListRoles => invoke(op, p, id, |i| provider.handle_list_roles(i)),
        Op::UpdateRole => invoke(op, p, id, |i| provider.handle_update_role(i)),
        Op::UpdateAssumeRolePolicy => {
            invoke(op, p, id, |i| provider.handle_update_assume_role_policy(i))
        }

        Op::PutRolePolicy => invoke(op, p, id, |i| provider.handle_put_role_policy(i)),
        Op::GetRolePolicy => invoke(op, p, id, |i| provider.handle_get_role_policy(i)),
        Op::DeleteRolePolicy => invoke(op, p, id, |i| provider.handle_delete_role_policy(i)),
        Op::ListRolePolicies => invoke(op, p, id, |i| provider.handle_list_role_policies(i)),

        Op::CreatePolicy => invoke(op, p, id, |i| provider.handle_create_policy(i)),
        Op::GetPolicy => invoke(op, p, id, |i| provider.handle_get_policy(i)),
        Op::DeletePolicy => invoke(op, p, id, |i| provider.handle_delete_policy(i)),
        Op::ListPolicies => invoke(op, p, id, |i| provider.handle_list_policies(i)),
        Op::CreatePolicyVersion => {
            invoke(op, p, id, |i| provider.handle_create_policy_version(i))
        }
        Op::GetPolicyVersion => invoke(op, p, id, |i| provider.handle_get_policy_version(i)),
        Op::ListPolicyVersions => invoke(op, p, id, |i| provider.handle_list_policy_versions(i)),
        Op::DeletePolicyVersion => {
            invoke(op, p, id, |i| provider.handle_delete_policy_version(i))
        }
        Op::SetDefaultPolicyVersion => {
            invoke(op, p, id, |i| provider.handle_set_default_policy_version(i))
        }

        Op::AttachRolePolicy => invoke(op, p, id, |i| provider.handle_attach_role_policy(i)),
        Op::DetachRolePolicy => invoke(op, p, id, |i| provider.handle_detach_role_policy(i)),
        Op::ListAttachedRolePolicies => {
            invoke(op, p, id, |i| provider.handle_list_attached_role_policies(i))
        }

        Op::TagRole => invoke(op, p, id, |i| provider.handle_tag_role(i)),
        Op::UntagRole => invoke(op, p, id, |i| provider.handle_untag_role(i)),
        Op::ListRoleTags => invoke(op, p, id, |i| provider.handle_list_role_tags(i)),

        Op::CreateUser => invoke(op, p, id, |i| provider.handle_create_user(i)),
        Op::GetUser => invoke(op, p, id, |i| provider.handle_get_user(i)),
        Op::DeleteUser => invoke(op, p, id, |i| provider.handle_delete_user(i)),
        Op::ListUsers => invoke(op, p, id, |i| provider.handle_list_users(i)),
    }
}
