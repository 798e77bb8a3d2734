//! Health and metrics surface (§6, §2.1's ambient stack).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use github_event_handler::auth::InstallationAuthenticator;
use github_event_handler::build_store::BuildStore;

use crate::app::AppState;

pub async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Renders the process's Prometheus registry.
pub async fn metrics<S, N>(State(state): State<Arc<AppState<S, N>>>) -> String
where
    S: BuildStore,
    N: InstallationAuthenticator,
{
    state.metrics_handle.render()
}
