//! Error taxonomy for the event-handling core (§7 of the design).
//!
//! These variants are the ones a request handler needs to turn into an HTTP
//! status; the mapping lives on the `server` side (`server::error::GatewayError`)
//! so that this crate stays transport-agnostic.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EventError {
    #[snafu(display("request body was not valid JSON for event {event_type}: {source}"))]
    MalformedBody {
        event_type: String,
        source: serde_json::Error,
    },

    #[snafu(display("no project registered for repository {repo_full_name}"))]
    ProjectNotFound { repo_full_name: String },

    #[snafu(display("project {repo_full_name} has no shared secret and no default is configured"))]
    NoSecret { repo_full_name: String },

    #[snafu(display("webhook signature did not match"))]
    SignatureInvalid,

    #[snafu(display("failed to authenticate as the GitHub App: {message}"))]
    AuthFailure { message: String },

    #[snafu(display("event carried app id {payload_app_id} but this gateway is app {our_app_id}"))]
    WrongApp {
        payload_app_id: u64,
        our_app_id: u64,
    },

    #[snafu(display("GitHub API call failed: {source}"))]
    GitHubApi { source: crate::github_api::ApiError },

    #[snafu(display("build store call failed: {source}"))]
    Store { source: crate::build_store::BuildStoreError },
}

pub type Result<T, E = EventError> = std::result::Result<T, E>;
