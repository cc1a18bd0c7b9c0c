//! STS integration tests against a running MockStack server.

#[cfg(test)]
mod tests {
    use aws_credential_types::Credentials;
    use aws_sdk_sts::error::ProvideErrorMetadata;

    use crate::{DEFAULT_ACCOUNT, sdk_config, sts_client};

    const ROLE_ARN: &str = "arn:aws:iam::000000000000:role/deploy";

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_account_root_identity() {
        let client = sts_client();

        let identity = client.get_caller_identity().send().await.unwrap();
        assert_eq!(identity.account(), Some(DEFAULT_ACCOUNT));
        assert_eq!(
            identity.arn(),
            Some(format!("arn:aws:iam::{DEFAULT_ACCOUNT}:root").as_str())
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_resolve_identity_of_assumed_role_session() {
        let client = sts_client();

        let assumed = client
            .assume_role()
            .role_arn(ROLE_ARN)
            .role_session_name("ci")
            .send()
            .await
            .unwrap();
        let creds = assumed.credentials().unwrap();
        assert!(creds.access_key_id().starts_with("ASIA"));
        assert_eq!(
            assumed.assumed_role_user().unwrap().arn(),
            "arn:aws:sts::000000000000:assumed-role/deploy/ci"
        );

        let session_config = aws_sdk_sts::config::Builder::from(&sdk_config())
            .credentials_provider(Credentials::new(
                creds.access_key_id(),
                creds.secret_access_key(),
                Some(creds.session_token().to_owned()),
                None,
                "assumed-role",
            ))
            .build();
        let session_client = aws_sdk_sts::Client::from_conf(session_config);
        let identity = session_client.get_caller_identity().send().await.unwrap();
        assert_eq!(
            identity.arn(),
            Some("arn:aws:sts::000000000000:assumed-role/deploy/ci")
        );
        assert!(identity.user_id().is_some_and(|id| id.ends_with(":ci")));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_malformed_role_arn() {
        let client = sts_client();

        let err = client
            .assume_role()
            .role_arn("not-an-arn")
            .role_session_name("ci")
            .send()
            .await
            .unwrap_err();
        assert_eq!(err.into_service_error().code(), Some("ValidationError"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_issue_session_token() {
        let client = sts_client();

        let resp = client
            .get_session_token()
            .duration_seconds(900)
            .send()
            .await
            .unwrap();
        let creds = resp.credentials().unwrap();
        assert!(!creds.session_token().is_empty());

        let info = client
            .get_access_key_info()
            .access_key_id(creds.access_key_id())
            .send()
            .await
            .unwrap();
        assert_eq!(info.account(), Some(DEFAULT_ACCOUNT));
    }
}
