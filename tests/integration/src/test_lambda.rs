//! Lambda control-plane integration tests against a running MockStack server.

#[cfg(test)]
mod tests {
    use aws_sdk_lambda::primitives::Blob;
    use aws_sdk_lambda::types::{FunctionCode, Runtime};

    use crate::{lambda_client, unique_name};

    const ROLE_ARN: &str = "arn:aws:iam::000000000000:role/lambda-role";

    async fn create_function(client: &aws_sdk_lambda::Client, name: &str) -> String {
        let resp = client
            .create_function()
            .function_name(name)
            .runtime(Runtime::from("python3.12"))
            .role(ROLE_ARN)
            .handler("index.handler")
            .code(
                FunctionCode::builder()
                    .zip_file(Blob::new(b"PK\x03\x04integration".to_vec()))
                    .build(),
            )
            .tags("team", "core")
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to create function {name}: {e}"));
        resp.function_arn().unwrap().to_owned()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_get_and_delete_function() {
        let client = lambda_client();
        let name = unique_name("fn");

        let arn = create_function(&client, &name).await;
        assert!(arn.ends_with(&format!(":function:{name}")));

        let resp = client.get_function().function_name(&name).send().await.unwrap();
        let config = resp.configuration().unwrap();
        assert_eq!(config.function_name(), Some(name.as_str()));
        assert_eq!(config.handler(), Some("index.handler"));

        client
            .delete_function()
            .function_name(&name)
            .send()
            .await
            .unwrap();
        let err = client
            .get_function()
            .function_name(&name)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_resource_not_found_exception());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_and_update_function() {
        let client = lambda_client();
        let name = unique_name("update");

        create_function(&client, &name).await;
        client
            .update_function_configuration()
            .function_name(&name)
            .timeout(30)
            .memory_size(256)
            .send()
            .await
            .unwrap();

        let listed = client.list_functions().send().await.unwrap();
        let config = listed
            .functions()
            .iter()
            .find(|f| f.function_name() == Some(name.as_str()))
            .unwrap();
        assert_eq!(config.timeout(), Some(30));
        assert_eq!(config.memory_size(), Some(256));

        client.delete_function().function_name(&name).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_add_and_remove_permission() {
        let client = lambda_client();
        let name = unique_name("perm");

        create_function(&client, &name).await;
        client
            .add_permission()
            .function_name(&name)
            .statement_id("s3-invoke")
            .action("lambda:InvokeFunction")
            .principal("s3.amazonaws.com")
            .send()
            .await
            .unwrap();

        let policy = client.get_policy().function_name(&name).send().await.unwrap();
        assert!(policy.policy().is_some_and(|p| p.contains("s3-invoke")));

        client
            .remove_permission()
            .function_name(&name)
            .statement_id("s3-invoke")
            .send()
            .await
            .unwrap();
        client.delete_function().function_name(&name).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_tag_and_untag_function() {
        let client = lambda_client();
        let name = unique_name("tags");

        let arn = create_function(&client, &name).await;
        client
            .tag_resource()
            .resource(&arn)
            .tags("env", "dev")
            .send()
            .await
            .unwrap();
        client
            .untag_resource()
            .resource(&arn)
            .tag_keys("team")
            .send()
            .await
            .unwrap();

        let tags = client.list_tags().resource(&arn).send().await.unwrap();
        let tags = tags.tags().unwrap();
        assert_eq!(tags.get("env").map(String::as_str), Some("dev"));
        assert!(!tags.contains_key("team"));

        client.delete_function().function_name(&name).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reserve_and_release_concurrency() {
        let client = lambda_client();
        let name = unique_name("concurrency");

        create_function(&client, &name).await;
        client
            .put_function_concurrency()
            .function_name(&name)
            .reserved_concurrent_executions(10)
            .send()
            .await
            .unwrap();
        let resp = client
            .get_function_concurrency()
            .function_name(&name)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.reserved_concurrent_executions(), Some(10));

        client
            .delete_function_concurrency()
            .function_name(&name)
            .send()
            .await
            .unwrap();
        client.delete_function().function_name(&name).send().await.unwrap();
    }
}
