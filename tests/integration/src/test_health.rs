//! Gateway health endpoint.

#[cfg(test)]
mod tests {
    use crate::endpoint_url;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running_services() {
        let body: serde_json::Value = reqwest::get(format!("{}/_localstack/health", endpoint_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        for service in ["dynamodb", "lambda", "iam", "sts"] {
            assert_eq!(body["services"][service], "running", "{service}");
        }
    }
}
