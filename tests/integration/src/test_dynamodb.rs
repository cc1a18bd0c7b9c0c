//! DynamoDB control-plane integration tests against a running MockStack server.

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType, Replica, ReplicaStatus,
        ScalarAttributeType, Tag, TableStatus, TimeToLiveSpecification,
    };

    use crate::{dynamodb_client, unique_name};

    async fn create_simple_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        client
            .create_table()
            .table_name(table_name)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("pk")
                    .key_type(KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("pk")
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
    }

    async fn delete_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        let _ = client.delete_table().table_name(table_name).send().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_describe_active_table() {
        let client = dynamodb_client();
        let table_name = unique_name("create");

        create_simple_table(&client, &table_name).await;

        let resp = client
            .describe_table()
            .table_name(&table_name)
            .send()
            .await
            .unwrap();
        let desc = resp.table().unwrap();
        assert_eq!(desc.table_name(), Some(table_name.as_str()));
        assert_eq!(desc.table_status(), Some(&TableStatus::Active));
        assert_eq!(desc.key_schema().len(), 1);

        delete_table(&client, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_duplicate_table() {
        let client = dynamodb_client();
        let table_name = unique_name("dup");

        create_simple_table(&client, &table_name).await;
        let err = client
            .create_table()
            .table_name(&table_name)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("pk")
                    .key_type(KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("pk")
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_resource_in_use_exception());

        delete_table(&client, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_created_table() {
        let client = dynamodb_client();
        let table_name = unique_name("list");

        create_simple_table(&client, &table_name).await;

        let resp = client.list_tables().send().await.unwrap();
        assert!(resp.table_names().contains(&table_name));

        delete_table(&client, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_list_and_delete_backup() {
        let client = dynamodb_client();
        let table_name = unique_name("backup");

        create_simple_table(&client, &table_name).await;
        client
            .create_backup()
            .table_name(&table_name)
            .backup_name("nightly")
            .send()
            .await
            .unwrap();

        let listed = client
            .list_backups()
            .table_name(&table_name)
            .send()
            .await
            .unwrap();
        assert_eq!(listed.backup_summaries().len(), 1);
        let backup_arn = listed.backup_summaries()[0]
            .backup_arn()
            .unwrap()
            .to_owned();

        client
            .delete_backup()
            .backup_arn(&backup_arn)
            .send()
            .await
            .unwrap();
        let err = client
            .describe_backup()
            .backup_arn(&backup_arn)
            .send()
            .await
            .unwrap_err();
        assert!(err.into_service_error().is_backup_not_found_exception());

        delete_table(&client, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_global_table_with_active_replicas() {
        let client = dynamodb_client();
        let table_name = unique_name("global");

        let resp = client
            .create_global_table()
            .global_table_name(&table_name)
            .replication_group(Replica::builder().region_name("us-east-1").build())
            .replication_group(Replica::builder().region_name("eu-west-1").build())
            .send()
            .await
            .unwrap();

        let description = resp.global_table_description().unwrap();
        assert_eq!(description.replication_group().len(), 2);
        assert!(
            description
                .replication_group()
                .iter()
                .all(|r| r.replica_status() == Some(&ReplicaStatus::Active))
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_tag_and_untag_table() {
        let client = dynamodb_client();
        let table_name = unique_name("tags");

        create_simple_table(&client, &table_name).await;
        let table_arn = client
            .describe_table()
            .table_name(&table_name)
            .send()
            .await
            .unwrap()
            .table()
            .and_then(|t| t.table_arn())
            .unwrap()
            .to_owned();

        client
            .tag_resource()
            .resource_arn(&table_arn)
            .tags(Tag::builder().key("env").value("dev").build().unwrap())
            .tags(Tag::builder().key("team").value("core").build().unwrap())
            .send()
            .await
            .unwrap();
        client
            .untag_resource()
            .resource_arn(&table_arn)
            .tag_keys("env")
            .send()
            .await
            .unwrap();

        let tags = client
            .list_tags_of_resource()
            .resource_arn(&table_arn)
            .send()
            .await
            .unwrap();
        let keys: Vec<&str> = tags.tags().iter().map(Tag::key).collect();
        assert_eq!(keys, vec!["team"]);

        delete_table(&client, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_enable_time_to_live() {
        let client = dynamodb_client();
        let table_name = unique_name("ttl");

        create_simple_table(&client, &table_name).await;
        client
            .update_time_to_live()
            .table_name(&table_name)
            .time_to_live_specification(
                TimeToLiveSpecification::builder()
                    .attribute_name("expires_at")
                    .enabled(true)
                    .build()
                    .unwrap(),
            )
            .send()
            .await
            .unwrap();

        let resp = client
            .describe_time_to_live()
            .table_name(&table_name)
            .send()
            .await
            .unwrap();
        let ttl = resp.time_to_live_description().unwrap();
        assert_eq!(ttl.attribute_name(), Some("expires_at"));

        delete_table(&client, &table_name).await;
    }
}
