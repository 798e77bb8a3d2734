//! The webhook sink (§6): extracts the `X-GitHub-Event`/`X-Hub-Signature`
//! headers and the raw body, hands them to
//! `github_event_handler::dispatch`, and renders its result per the
//! response contract in §6.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use github_event_handler::auth::InstallationAuthenticator;
use github_event_handler::build_store::BuildStore;
use github_event_handler::ids::{AppId, InstallationId};
use github_event_handler::{dispatch, DispatchStatus};
use serde_json::json;
use tracing::instrument;

use crate::app::AppState;
use crate::error::GatewayError;

const EVENT_HEADER: &str = "x-github-event";
const SIGNATURE_HEADER: &str = "x-hub-signature";

#[instrument(skip_all)]
pub async fn handle_event<S, N>(state: State<Arc<AppState<S, N>>>, headers: HeaderMap, body: axum::body::Bytes) -> Result<Response, GatewayError>
where
    S: BuildStore,
    N: InstallationAuthenticator,
{
    run(state, headers, body, None).await
}

/// `POST /events/github/:app/:inst`: pins the installation explicitly, for
/// event types whose payload carries no `installation` object of its own.
#[instrument(skip(state, headers, body))]
pub async fn handle_event_for<S, N>(
    state: State<Arc<AppState<S, N>>>,
    Path((app, inst)): Path<(u64, u64)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, GatewayError>
where
    S: BuildStore,
    N: InstallationAuthenticator,
{
    if AppId(app) != state.0.config.app_id.unwrap_or(AppId(app)) {
        tracing::warn!(path_app_id = app, "path app id does not match configured app id");
    }
    run(state, headers, body, Some(InstallationId(inst))).await
}

async fn run<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
    installation_override: Option<InstallationId>,
) -> Result<Response, GatewayError>
where
    S: BuildStore,
    N: InstallationAuthenticator,
{
    let event_type = header_value(&headers, EVENT_HEADER);
    let signature = header_value(&headers, SIGNATURE_HEADER);

    let result = dispatch(
        &state.config,
        &state.bearer,
        state.store.as_ref(),
        state.reporter.as_ref(),
        &event_type,
        &body,
        &signature,
        installation_override,
    )
    .await?;

    Ok(render(result))
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string()
}

/// §6's response contract: `200 {"status":"Complete"}` on acceptance,
/// `200 {"message":"Ignored"}` on an unknown event, `200
/// {"status":"build skipped[...]"}` on policy rejection.
fn render(result: github_event_handler::DispatchResult) -> Response {
    match result.status {
        DispatchStatus::Complete => {
            metrics::counter!("github_gateway_events_total", "status" => "complete").increment(1);
            metrics::counter!("github_gateway_builds_created_total").increment(result.builds_created.len() as u64);
            (
                StatusCode::OK,
                Json(json!({ "status": "Complete", "builds": result.builds_created })),
            )
                .into_response()
        }
        DispatchStatus::Ignored => {
            metrics::counter!("github_gateway_events_total", "status" => "ignored").increment(1);
            (StatusCode::OK, Json(json!({ "message": "Ignored" }))).into_response()
        }
        DispatchStatus::Skipped(reason) => {
            metrics::counter!("github_gateway_events_total", "status" => "skipped").increment(1);
            (StatusCode::OK, Json(json!({ "status": reason }))).into_response()
        }
        DispatchStatus::Pong => {
            metrics::counter!("github_gateway_events_total", "status" => "pong").increment(1);
            (StatusCode::OK, Json(json!({ "message": "pong" }))).into_response()
        }
    }
}
