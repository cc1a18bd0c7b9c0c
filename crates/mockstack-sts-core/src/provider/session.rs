//! `GetSessionToken`.

use mockstack_core::TagSet;
use mockstack_sts_model::StsError;
use mockstack_sts_model::input::GetSessionTokenInput;
use mockstack_sts_model::output::GetSessionTokenOutput;
use tracing::info;

use super::MockStackSts;
use crate::state::{SessionPrincipal, SessionRecord, keys};
use crate::validate::{DEFAULT_SESSION_TOKEN_DURATION, SESSION_TOKEN_DURATION, duration};

impl MockStackSts {
    /// Session credentials for the account itself. MFA parameters are accepted
    /// and ignored.
    pub fn handle_get_session_token(
        &self,
        input: GetSessionTokenInput,
    ) -> Result<GetSessionTokenOutput, StsError> {
        let seconds = duration(
            input.duration_seconds,
            DEFAULT_SESSION_TOKEN_DURATION,
            SESSION_TOKEN_DURATION,
        )?;
        let credentials = Self::issue_credentials(seconds);
        self.state.sessions.set(
            keys::session(&credentials.access_key_id),
            SessionRecord {
                credentials: credentials.clone(),
                account_id: self.config.account_id.to_string(),
                principal: SessionPrincipal::Account,
                source_identity: None,
                tags: TagSet::new(),
            },
        );
        info!(
            access_key_id = %credentials.access_key_id,
            duration_seconds = seconds,
            "issued session token"
        );
        Ok(GetSessionTokenOutput { credentials })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use mockstack_sts_model::input::GetCallerIdentityInput;

    use super::*;
    use crate::provider::test_util::*;

    #[test]
    fn test_should_default_to_twelve_hours() {
        let p = provider();
        let out = p
            .handle_get_session_token(GetSessionTokenInput::default())
            .unwrap();
        let remaining = out.credentials.expiration - Utc::now();
        assert!(remaining > Duration::hours(11));
        assert!(remaining <= Duration::hours(12));
    }

    #[test]
    fn test_should_reject_out_of_range_duration() {
        let p = provider();
        let err = p
            .handle_get_session_token(GetSessionTokenInput {
                duration_seconds: Some(129_601),
                ..GetSessionTokenInput::default()
            })
            .unwrap_err();
        assert!(err.message.contains("129600"));
    }

    #[test]
    fn test_should_resolve_session_key_to_account_root() {
        let p = provider();
        let key = p
            .handle_get_session_token(GetSessionTokenInput::default())
            .unwrap()
            .credentials
            .access_key_id;
        let identity = p
            .handle_get_caller_identity(GetCallerIdentityInput, Some(&key))
            .unwrap();
        assert_eq!(identity.arn, "arn:aws:iam::000000000000:root");
    }
}
