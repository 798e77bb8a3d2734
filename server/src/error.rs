//! HTTP-facing error type (§7): wraps `github_event_handler::error::EventError`
//! and this crate's own startup/config failures, and renders each to the
//! status code §7's disposition table assigns it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use github_event_handler::error::EventError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Event(#[from] EventError),
}

impl GatewayError {
    /// §7's disposition table.
    fn status(&self) -> StatusCode {
        match self {
            // Startup-time only; never reached once the router is serving.
            Self::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            Self::Event(EventError::MalformedBody { .. }) => StatusCode::BAD_REQUEST,
            Self::Event(EventError::ProjectNotFound { .. }) => StatusCode::BAD_REQUEST,
            Self::Event(EventError::NoSecret { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Event(EventError::SignatureInvalid) => StatusCode::FORBIDDEN,
            Self::Event(EventError::AuthFailure { .. }) => StatusCode::FORBIDDEN,
            // Not a named taxonomy row; treated as the upstream-failure class
            // alongside AuthFailure/AdapterTransient rather than minted a new
            // status code.
            Self::Event(EventError::GitHubApi { .. }) => StatusCode::BAD_GATEWAY,
            Self::Event(EventError::Store { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            // `WrongApp` is a silent drop per §7, and `dispatch()` never
            // returns it as an `Err` — it resolves to `DispatchStatus::Ignored`
            // instead. Kept here only so the match stays exhaustive.
            Self::Event(EventError::WrongApp { .. }) => StatusCode::OK,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            metrics::counter!("github_gateway_errors_total", "class" => "server").increment(1);
        } else {
            tracing::warn!(error = %self, "request rejected");
            metrics::counter!("github_gateway_errors_total", "class" => "client").increment(1);
        }
        (status, axum::Json(json!({ "status": self.to_string() }))).into_response()
    }
}
