//! STS operation inputs.

use mockstack_core::{FromQueryParams, ParamError, QueryParams};

fn required(params: &QueryParams, name: &str) -> Result<String, ParamError> {
    params.required(name).map(str::to_owned)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetCallerIdentityInput;

impl FromQueryParams for GetCallerIdentityInput {
    fn from_query_params(_params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssumeRoleInput {
    pub role_arn: String,
    pub role_session_name: String,
    pub duration_seconds: Option<i32>,
    /// Inline session policy (raw JSON).
    pub policy: Option<String>,
    pub external_id: Option<String>,
    pub source_identity: Option<String>,
    /// Session tags.
    pub tags: Vec<(String, String)>,
}

impl FromQueryParams for AssumeRoleInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_arn: required(params, "RoleArn")?,
            role_session_name: required(params, "RoleSessionName")?,
            duration_seconds: params.optional_i32("DurationSeconds")?,
            policy: params.optional("Policy"),
            external_id: params.optional("ExternalId"),
            source_identity: params.optional("SourceIdentity"),
            tags: params.tags("Tags"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssumeRoleWithWebIdentityInput {
    pub role_arn: String,
    pub role_session_name: String,
    pub web_identity_token: String,
    pub provider_id: Option<String>,
    pub duration_seconds: Option<i32>,
    pub policy: Option<String>,
}

impl FromQueryParams for AssumeRoleWithWebIdentityInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            role_arn: required(params, "RoleArn")?,
            role_session_name: required(params, "RoleSessionName")?,
            web_identity_token: required(params, "WebIdentityToken")?,
            provider_id: params.optional("ProviderId"),
            duration_seconds: params.optional_i32("DurationSeconds")?,
            policy: params.optional("Policy"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSessionTokenInput {
    pub duration_seconds: Option<i32>,
    /// MFA device; accepted and ignored.
    pub serial_number: Option<String>,
    pub token_code: Option<String>,
}

impl FromQueryParams for GetSessionTokenInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            duration_seconds: params.optional_i32("DurationSeconds")?,
            serial_number: params.optional("SerialNumber"),
            token_code: params.optional("TokenCode"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAccessKeyInfoInput {
    pub access_key_id: String,
}

impl FromQueryParams for GetAccessKeyInfoInput {
    fn from_query_params(params: &QueryParams) -> Result<Self, ParamError> {
        Ok(Self {
            access_key_id: required(params, "AccessKeyId")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_decode_assume_role_with_session_tags() {
        let params = QueryParams::parse(
            b"RoleArn=arn%3Aaws%3Aiam%3A%3A000000000000%3Arole%2Fapp&RoleSessionName=s1\
              &DurationSeconds=1800&Tags.member.1.Key=team&Tags.member.1.Value=core",
        );
        let input = AssumeRoleInput::from_query_params(&params).unwrap();
        assert_eq!(input.role_arn, "arn:aws:iam::000000000000:role/app");
        assert_eq!(input.duration_seconds, Some(1800));
        assert_eq!(input.tags, vec![("team".to_owned(), "core".to_owned())]);
    }

    #[test]
    fn test_should_reject_non_numeric_duration() {
        let params = QueryParams::parse(b"DurationSeconds=soon");
        assert!(matches!(
            GetSessionTokenInput::from_query_params(&params),
            Err(ParamError::Invalid { .. })
        ));
    }
}
