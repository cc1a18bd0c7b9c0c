//! MockStack Server - local emulator for AWS control-plane APIs.
//!
//! Hosts DynamoDB, Lambda, IAM and STS behind a single LocalStack-compatible
//! endpoint. A gateway layer routes each request to the service it targets.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 mockstack-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `SERVICES` | *(empty = all)* | Comma-separated list of services to enable |
//! | `DEFAULT_REGION` | `us-east-1` | Region used in minted ARNs |
//! | `ACCOUNT_ID` | `000000000000` | Account used in minted ARNs |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod gateway;
mod lambda_rest;
mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mockstack_core::MockStackConfig;
use mockstack_dynamodb_core::{DynamoDBConfig, MockStackDynamoDB, MockStackDynamoDBHandler};
use mockstack_http::json::{JsonHttpService, JsonServiceConfig};
use mockstack_http::query::{QueryHttpService, QueryServiceConfig};
use mockstack_iam_core::{IamConfig, MockStackIam, MockStackIamHandler};
use mockstack_lambda_core::{LambdaConfig, MockStackLambda, MockStackLambdaHandler};
use mockstack_sts_core::{MockStackSts, MockStackStsHandler, StsConfig};

use crate::gateway::GatewayService;
use crate::service::{JsonServiceRouter, QueryServiceRouter, RestBinding, ServiceRouter};

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build one router per enabled service, in routing order.
fn build_routers(config: &MockStackConfig) -> Vec<Box<dyn ServiceRouter>> {
    let mut routers: Vec<Box<dyn ServiceRouter>> = Vec::new();

    if config.is_enabled("dynamodb") {
        let provider = MockStackDynamoDB::new(DynamoDBConfig::from_gateway(config));
        let handler = MockStackDynamoDBHandler::new(Arc::new(provider));
        let service = JsonHttpService::new(
            Arc::new(handler),
            JsonServiceConfig {
                service_name: "dynamodb",
            },
        );
        routers.push(Box::new(JsonServiceRouter::new(
            "dynamodb", "DynamoDB_", service,
        )));
    }

    if config.is_enabled("lambda") {
        let provider = MockStackLambda::new(LambdaConfig::from_gateway(config));
        let handler = MockStackLambdaHandler::new(Arc::new(provider));
        let service = JsonHttpService::new(
            Arc::new(handler),
            JsonServiceConfig {
                service_name: "lambda",
            },
        );
        routers.push(Box::new(
            JsonServiceRouter::new("lambda", "AWSLambda", service).with_rest(RestBinding {
                matches_path: lambda_rest::is_rest_path,
                translate: lambda_rest::translate,
            }),
        ));
    }

    if config.is_enabled("iam") {
        let provider = MockStackIam::new(IamConfig::from_gateway(config));
        let handler = MockStackIamHandler::new(Arc::new(provider));
        let service = QueryHttpService::new(
            Arc::new(handler),
            QueryServiceConfig {
                service_name: "iam",
                namespace: mockstack_iam_model::IAM_NAMESPACE,
            },
        );
        routers.push(Box::new(QueryServiceRouter::new("iam", service)));
    }

    if config.is_enabled("sts") {
        let provider = MockStackSts::new(StsConfig::from_gateway(config));
        let handler = MockStackStsHandler::new(Arc::new(provider));
        let service = QueryHttpService::new(
            Arc::new(handler),
            QueryServiceConfig {
                service_name: "sts",
                namespace: mockstack_sts_model::STS_NAMESPACE,
            },
        );
        routers.push(Box::new(QueryServiceRouter::new("sts", service)));
    }

    routers
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Probe the health endpoint of a running gateway.
///
/// Succeeds if the response is 200 OK and reports at least one running service.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request =
        format!("GET /_localstack/health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = MockStackConfig::from_env().context("invalid configuration")?;

    // Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    for name in config.unknown_services() {
        warn!(service = %name, "requested service is not supported, skipping");
    }

    let routers = build_routers(&config);
    if routers.is_empty() {
        anyhow::bail!("no services enabled. Check the SERVICES environment variable.");
    }

    let gateway = GatewayService::new(routers);
    let service_names = gateway.service_names();

    let listen_addr = &config.gateway_listen;
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid bind address: {listen_addr}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        services = ?service_names,
        region = %config.default_region,
        account_id = %config.account_id,
        version = VERSION,
        "starting MockStack Server",
    );

    serve(listener, gateway).await
}
