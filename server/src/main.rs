//! Gateway entry point: loads configuration, mints the GitHub App bearer
//! client, wires the build store and (optionally) the failure reporter, and
//! serves the axum router with graceful shutdown — following the same CLI +
//! tracing + signal-handling shape the teacher's own binaries use.

mod app;
mod build_store;
mod config;
mod error;
mod routes;

use std::sync::Arc;

use clap::Parser;
use github_event_handler::auth::{GitHubAppAuthenticator, OctocrabAppClient};
use github_event_handler::DispatchConfig;
use jsonwebtoken::EncodingKey;
use kube::Client;
use metrics_exporter_prometheus::PrometheusBuilder;
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::AppState;
use crate::build_store::InMemoryBuildStore;
use crate::config::{Cli, GatewayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = GatewayConfig::from_env()?;

    let key = EncodingKey::from_rsa_pem(config.key_pem.expose_secret().as_bytes())?;
    let bearer = OctocrabAppClient::authenticate_app(config.github_api_base_url.clone(), config.app_id, key)?;

    let store = Arc::new(InMemoryBuildStore::new([]));

    let reporter: Arc<dyn github_event_handler::scheduler::FailureReporter + Send + Sync> = if config.report_build_failures {
        let kube_client = build_kube_client(config.kube_config.as_deref()).await?;
        let shutdown = CancellationToken::new();
        let reporter = github_event_handler::reporter::Reporter::new(
            config.namespace.clone(),
            config.github_api_base_url.clone(),
            store.clone(),
        );
        let handles = reporter.run(kube_client, 2, shutdown.clone());
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            shutdown.cancel();
            for handle in handles {
                let _ = handle.await;
            }
        });
        reporter
    } else {
        Arc::new(github_event_handler::scheduler::NoopReporter)
    };

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let dispatch_config = DispatchConfig {
        app_id: Some(config.app_id),
        check_suite_on_pr: config.check_suite_on_pr,
        check_suite_short_circuits: config.check_suite_short_circuits,
        default_shared_secret: config.default_shared_secret.as_ref().map(|s| s.expose_secret().to_string()),
        author_allowlist: config.author_allowlist.clone(),
        emitted_events: config.emitted_events.clone(),
        report_build_failures: config.report_build_failures,
    };

    let state = Arc::new(AppState {
        config: dispatch_config,
        bearer,
        store,
        reporter,
        metrics_handle,
    });

    let router = app::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "github-gateway listening");

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Builds the kube client the reporter watches pods with: an explicit
/// `KUBE_CONFIG` path when one is set, otherwise the usual in-cluster /
/// default-kubeconfig resolution `Client::try_default` performs.
async fn build_kube_client(kube_config: Option<&std::path::Path>) -> Result<Client, Box<dyn std::error::Error>> {
    match kube_config {
        Some(path) => {
            let kubeconfig = kube::config::Kubeconfig::read_from(path)?;
            let config = kube::Config::from_custom_kubeconfig(kubeconfig, &kube::config::KubeConfigOptions::default()).await?;
            Ok(Client::try_from(config)?)
        }
        None => Ok(Client::try_default().await?),
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = log_level
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
