//! Shared request state and router assembly (§2.1, §6).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use github_event_handler::auth::InstallationAuthenticator;
use github_event_handler::build_store::BuildStore;
use github_event_handler::scheduler::FailureReporter;
use github_event_handler::DispatchConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{event_handler, healthz};

/// Everything a request handler needs, generic over the build store and the
/// bearer-level GitHub App client so tests can substitute stubs for both.
pub struct AppState<S, N> {
    pub config: DispatchConfig,
    pub bearer: N,
    pub store: Arc<S>,
    pub reporter: Arc<dyn FailureReporter + Send + Sync>,
    pub metrics_handle: PrometheusHandle,
}

pub fn router<S, N>(state: Arc<AppState<S, N>>) -> Router
where
    S: BuildStore + 'static,
    N: InstallationAuthenticator + Send + Sync + 'static,
{
    Router::new()
        .route("/events/github", post(event_handler::handle_event::<S, N>))
        .route("/events/github/:app/:inst", post(event_handler::handle_event_for::<S, N>))
        .route("/healthz", get(healthz::healthz))
        .route("/metrics", get(healthz::metrics::<S, N>))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .with_state(state)
}
