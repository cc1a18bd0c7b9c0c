//! IAM integration tests against a running MockStack server.

#[cfg(test)]
mod tests {
    use aws_sdk_iam::types::Tag;

    use crate::{LAMBDA_TRUST_POLICY, READ_POLICY, iam_client, unique_name};

    async fn create_role(client: &aws_sdk_iam::Client, role_name: &str) {
        client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(LAMBDA_TRUST_POLICY)
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to create role {role_name}: {e}"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_get_and_delete_role() {
        let client = iam_client();
        let role_name = unique_name("role");

        create_role(&client, &role_name).await;

        let listed = client.list_roles().send().await.unwrap();
        let role = listed
            .roles()
            .iter()
            .find(|r| r.role_name() == role_name)
            .unwrap();
        assert!(role.role_id().starts_with("AROA"));
        assert!(role.arn().ends_with(&format!(":role/{role_name}")));

        client.delete_role().role_name(&role_name).send().await.unwrap();
        let err = client
            .get_role()
            .role_name(&role_name)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_no_such_entity_exception());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_inline_policy_on_missing_role() {
        let client = iam_client();

        let err = client
            .put_role_policy()
            .role_name(unique_name("missing"))
            .policy_name("read")
            .policy_document(READ_POLICY)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_no_such_entity_exception());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_block_role_delete_until_inline_policy_removed() {
        let client = iam_client();
        let role_name = unique_name("inline");

        create_role(&client, &role_name).await;
        client
            .put_role_policy()
            .role_name(&role_name)
            .policy_name("read")
            .policy_document(READ_POLICY)
            .send()
            .await
            .unwrap();

        let fetched = client
            .get_role_policy()
            .role_name(&role_name)
            .policy_name("read")
            .send()
            .await
            .unwrap();
        assert_eq!(fetched.policy_name(), "read");

        let err = client
            .delete_role()
            .role_name(&role_name)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_delete_conflict_exception());

        client
            .delete_role_policy()
            .role_name(&role_name)
            .policy_name("read")
            .send()
            .await
            .unwrap();
        client.delete_role().role_name(&role_name).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_attach_and_detach_managed_policy() {
        let client = iam_client();
        let role_name = unique_name("attach");
        let policy_name = unique_name("policy");

        create_role(&client, &role_name).await;
        let created = client
            .create_policy()
            .policy_name(&policy_name)
            .policy_document(READ_POLICY)
            .send()
            .await
            .unwrap();
        let policy_arn = created.policy().and_then(|p| p.arn()).unwrap().to_owned();

        client
            .attach_role_policy()
            .role_name(&role_name)
            .policy_arn(&policy_arn)
            .send()
            .await
            .unwrap();
        let attached = client
            .list_attached_role_policies()
            .role_name(&role_name)
            .send()
            .await
            .unwrap();
        let arns: Vec<&str> = attached
            .attached_policies()
            .iter()
            .filter_map(|p| p.policy_arn())
            .collect();
        assert_eq!(arns, vec![policy_arn.as_str()]);

        let err = client
            .delete_policy()
            .policy_arn(&policy_arn)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_delete_conflict_exception());

        client
            .detach_role_policy()
            .role_name(&role_name)
            .policy_arn(&policy_arn)
            .send()
            .await
            .unwrap();
        client.delete_policy().policy_arn(&policy_arn).send().await.unwrap();
        client.delete_role().role_name(&role_name).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_manage_policy_versions() {
        let client = iam_client();
        let policy_name = unique_name("versions");

        let created = client
            .create_policy()
            .policy_name(&policy_name)
            .policy_document(READ_POLICY)
            .send()
            .await
            .unwrap();
        let policy_arn = created.policy().and_then(|p| p.arn()).unwrap().to_owned();

        client
            .create_policy_version()
            .policy_arn(&policy_arn)
            .policy_document(READ_POLICY)
            .set_as_default(true)
            .send()
            .await
            .unwrap();

        let versions = client
            .list_policy_versions()
            .policy_arn(&policy_arn)
            .send()
            .await
            .unwrap();
        assert_eq!(versions.versions().len(), 2);

        let policy = client.get_policy().policy_arn(&policy_arn).send().await.unwrap();
        assert_eq!(
            policy.policy().and_then(|p| p.default_version_id()),
            Some("v2")
        );

        client
            .delete_policy_version()
            .policy_arn(&policy_arn)
            .version_id("v1")
            .send()
            .await
            .unwrap();
        client.delete_policy().policy_arn(&policy_arn).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_tag_and_untag_role() {
        let client = iam_client();
        let role_name = unique_name("tags");

        create_role(&client, &role_name).await;
        client
            .tag_role()
            .role_name(&role_name)
            .tags(Tag::builder().key("env").value("dev").build().unwrap())
            .tags(Tag::builder().key("team").value("core").build().unwrap())
            .send()
            .await
            .unwrap();
        client
            .untag_role()
            .role_name(&role_name)
            .tag_keys("env")
            .send()
            .await
            .unwrap();

        let tags = client
            .list_role_tags()
            .role_name(&role_name)
            .send()
            .await
            .unwrap();
        let keys: Vec<&str> = tags.tags().iter().map(Tag::key).collect();
        assert_eq!(keys, vec!["team"]);

        client.delete_role().role_name(&role_name).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_list_users() {
        let client = iam_client();
        let user_name = unique_name("user");

        client.create_user().user_name(&user_name).send().await.unwrap();
        let users = client.list_users().send().await.unwrap();
        assert!(users.users().iter().any(|u| u.user_name() == user_name));

        client.delete_user().user_name(&user_name).send().await.unwrap();
    }
}
