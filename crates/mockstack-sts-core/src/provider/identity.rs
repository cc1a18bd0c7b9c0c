//! Caller and access key identity.

use mockstack_sts_model::StsError;
use mockstack_sts_model::input::{GetAccessKeyInfoInput, GetCallerIdentityInput};
use mockstack_sts_model::output::{GetAccessKeyInfoOutput, GetCallerIdentityOutput};

use super::MockStackSts;
use crate::state::keys;
use crate::validate::validate_access_key_id;

impl MockStackSts {
    /// Identity of the key the request was signed with. Keys this
    /// emulator did not issue resolve to the configured account root.
    pub fn handle_get_caller_identity(
        &self,
        _input: GetCallerIdentityInput,
        access_key_id: Option<&str>,
    ) -> Result<GetCallerIdentityOutput, StsError> {
        let session = access_key_id.and_then(|key| self.state.sessions.find(&keys::session(key)));
        Ok(match session {
            Some(record) => GetCallerIdentityOutput {
                user_id: record.user_id(),
                arn: record.principal_arn(),
                account: record.account_id,
            },
            None => {
                let account = self.config.account_id.to_string();
                GetCallerIdentityOutput {
                    user_id: account.clone(),
                    arn: format!("arn:aws:iam::{account}:root"),
                    account,
                }
            }
        })
    }

    /// Handle `GetAccessKeyInfo`.
    pub fn handle_get_access_key_info(
        &self,
        input: GetAccessKeyInfoInput,
    ) -> Result<GetAccessKeyInfoOutput, StsError> {
        validate_access_key_id(&input.access_key_id)?;
        let account = self
            .state
            .sessions
            .find(&keys::session(&input.access_key_id))
            .map_or_else(|| self.config.account_id.to_string(), |r| r.account_id);
        Ok(GetAccessKeyInfoOutput { account })
    }
}
