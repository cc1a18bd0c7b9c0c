//! `AssumeRole` and `AssumeRoleWithWebIdentity`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mockstack_core::TagSet;
use mockstack_sts_model::StsError;
use mockstack_sts_model::input::{AssumeRoleInput, AssumeRoleWithWebIdentityInput};
use mockstack_sts_model::output::{AssumeRoleOutput, AssumeRoleWithWebIdentityOutput};
use mockstack_sts_model::types::{AssumedRoleUser, Credentials};
use serde_json::Value;
use tracing::info;

use super::MockStackSts;
use crate::state::{SessionPrincipal, SessionRecord, keys};
use crate::validate::{
    DEFAULT_DURATION, ROLE_DURATION, duration, packed_policy_size, parse_role_arn,
    validate_session_name, validate_session_tags,
};

/// `sub`, `aud` and `iss` claims of a JWT, if the token is one.
#[derive(Debug, Default, PartialEq, Eq)]
struct TokenClaims {
    subject: Option<String>,
    audience: Option<String>,
    issuer: Option<String>,
}

fn token_claims(token: &str) -> TokenClaims {
    let payload = token
        .split('.')
        .nth(1)
        .and_then(|p| URL_SAFE_NO_PAD.decode(p.trim_end_matches('=')).ok())
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok());
    let Some(claims) = payload else {
        return TokenClaims::default();
    };
    let text = |name: &str| match claims.get(name) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items.first().and_then(Value::as_str).map(str::to_owned),
        _ => None,
    };
    TokenClaims {
        subject: text("sub"),
        audience: text("aud"),
        issuer: text("iss"),
    }
}

/// A started role session.
struct RoleSession {
    credentials: Credentials,
    assumed_role_user: AssumedRoleUser,
}

impl MockStackSts {
    fn start_role_session(
        &self,
        role_arn: &str,
        session_name: &str,
        duration_seconds: i32,
        source_identity: Option<String>,
        tags: TagSet,
    ) -> Result<RoleSession, StsError> {
        let (account_id, role_name) = parse_role_arn(role_arn)?;
        let role_id = self.role_id(role_arn);
        let record = SessionRecord {
            credentials: Self::issue_credentials(duration_seconds),
            account_id,
            principal: SessionPrincipal::AssumedRole {
                role_arn: role_arn.to_owned(),
                role_name,
                role_id,
                session_name: session_name.to_owned(),
            },
            source_identity,
            tags,
        };
        let assumed_role_user = AssumedRoleUser {
            assumed_role_id: record.user_id(),
            arn: record.principal_arn(),
        };
        let credentials = record.credentials.clone();
        self.state
            .sessions
            .set(keys::session(&credentials.access_key_id), record);

        info!(
            role_arn,
            session_name,
            access_key_id = %credentials.access_key_id,
            "assumed role"
        );
        Ok(RoleSession {
            credentials,
            assumed_role_user,
        })
    }

    /// Handle `AssumeRole`.
    pub fn handle_assume_role(&self, input: AssumeRoleInput) -> Result<AssumeRoleOutput, StsError> {
        parse_role_arn(&input.role_arn)?;
        validate_session_name(&input.role_session_name)?;
        let seconds = duration(input.duration_seconds, DEFAULT_DURATION, ROLE_DURATION)?;
        let packed_policy_size = packed_policy_size(input.policy.as_deref())?;
        validate_session_tags(input.tags.len())?;

        let session = self.start_role_session(
            &input.role_arn,
            &input.role_session_name,
            seconds,
            input.source_identity.clone(),
            input.tags.into_iter().collect(),
        )?;
        Ok(AssumeRoleOutput {
            credentials: session.credentials,
            assumed_role_user: session.assumed_role_user,
            packed_policy_size,
            source_identity: input.source_identity,
        })
    }

    /// The token is not verified; JWT claims are echoed back when present.
    pub fn handle_assume_role_with_web_identity(
        &self,
        input: AssumeRoleWithWebIdentityInput,
    ) -> Result<AssumeRoleWithWebIdentityOutput, StsError> {
        parse_role_arn(&input.role_arn)?;
        validate_session_name(&input.role_session_name)?;
        let token_len = input.web_identity_token.len();
        if !(4..=20_000).contains(&token_len) {
            return Err(StsError::constraint(
                "webIdentityToken",
                "***",
                "Member must have length between 4 and 20000",
            ));
        }
        let seconds = duration(input.duration_seconds, DEFAULT_DURATION, ROLE_DURATION)?;
        let packed_policy_size = packed_policy_size(input.policy.as_deref())?;

        let claims = token_claims(&input.web_identity_token);
        let session = self.start_role_session(
            &input.role_arn,
            &input.role_session_name,
            seconds,
            None,
            TagSet::new(),
        )?;
        Ok(AssumeRoleWithWebIdentityOutput {
            credentials: session.credentials,
            subject_from_web_identity_token: claims
                .subject
                .unwrap_or_else(|| input.role_session_name.clone()),
            assumed_role_user: session.assumed_role_user,
            packed_policy_size,
            provider: input.provider_id.or(claims.issuer),
            audience: claims.audience,
        })
    }
}

#[cfg(test)]
mod tests {
    use mockstack_sts_model::StsErrorCode;

    use super::*;
    use crate::provider::test_util::*;

    fn assume(session: &str) -> AssumeRoleInput {
        AssumeRoleInput {
            role_arn: ROLE_ARN.to_owned(),
            role_session_name: session.to_owned(),
            ..AssumeRoleInput::default()
        }
    }

    #[test]
    fn test_should_assume_role_and_remember_session() {
        let p = provider();
        let out = p.handle_assume_role(assume("ci")).unwrap();
        assert_eq!(
            out.assumed_role_user.arn,
            "arn:aws:sts::111122223333:assumed-role/deploy/ci"
        );
        assert!(out.assumed_role_user.assumed_role_id.ends_with(":ci"));
        assert!(out.credentials.access_key_id.starts_with("ASIA"));
        assert!(
            p.state
                .sessions
                .exists(&keys::session(&out.credentials.access_key_id))
        );
    }

    #[test]
    fn test_should_reject_bad_role_arn_and_duration() {
        let p = provider();
        let mut input = assume("ci");
        input.role_arn = "arn:aws:iam::111122223333:user/alice".to_owned();
        assert_eq!(
            p.handle_assume_role(input).unwrap_err().code,
            StsErrorCode::ValidationError
        );

        let mut input = assume("ci");
        input.duration_seconds = Some(60);
        assert!(p.handle_assume_role(input).is_err());
        assert!(p.state.sessions.is_empty());
    }

    #[test]
    fn test_should_report_packed_policy_size() {
        let p = provider();
        let mut input = assume("ci");
        input.policy = Some(r#"{"Version":"2012-10-17","Statement":[]}"#.to_owned());
        let out = p.handle_assume_role(input).unwrap();
        assert_eq!(out.packed_policy_size, Some(1));
    }

    #[test]
    fn test_should_echo_jwt_claims_for_web_identity() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"user-42","aud":"app","iss":"https://idp"}"#);
        let token = format!("eyJhbGciOiJub25lIn0.{payload}.sig");
        let p = provider();
        let out = p
            .handle_assume_role_with_web_identity(AssumeRoleWithWebIdentityInput {
                role_arn: ROLE_ARN.to_owned(),
                role_session_name: "web".to_owned(),
                web_identity_token: token,
                ..AssumeRoleWithWebIdentityInput::default()
            })
            .unwrap();
        assert_eq!(out.subject_from_web_identity_token, "user-42");
        assert_eq!(out.audience.as_deref(), Some("app"));
        assert_eq!(out.provider.as_deref(), Some("https://idp"));
    }

    #[test]
    fn test_should_accept_opaque_web_identity_token() {
        let p = provider();
        let out = p
            .handle_assume_role_with_web_identity(AssumeRoleWithWebIdentityInput {
                role_arn: ROLE_ARN.to_owned(),
                role_session_name: "web".to_owned(),
                web_identity_token: "opaque-token".to_owned(),
                provider_id: Some("www.amazon.com".to_owned()),
                ..AssumeRoleWithWebIdentityInput::default()
            })
            .unwrap();
        assert_eq!(out.subject_from_web_identity_token, "web");
        assert_eq!(out.provider.as_deref(), Some("www.amazon.com"));
        assert!(out.audience.is_none());
    }
}
