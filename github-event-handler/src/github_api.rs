//! The installation-scoped GitHub surface the dispatcher needs (§4.5, §4.6,
//! §4.9): fetching pull requests, driving check suites, and posting issue
//! comments. Expressed as a trait so tests can swap in a stub without
//! touching the network — mirrors the shape the copied event handler
//! already expected of its `GitHubApi` parameter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::ids::AppId;

#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(display("GitHub API request failed: {source}"))]
    Request { source: octocrab::Error },
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PullRequestInfo {
    pub number: u64,
    pub head_sha: String,
}

#[derive(Debug, Clone)]
pub struct CheckSuiteInfo {
    pub id: u64,
}

/// Everything the dispatcher does against GitHub once scoped to a single
/// installation. One implementation wraps octocrab; tests provide their own.
pub trait GitHubApi {
    fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> impl std::future::Future<Output = Result<PullRequestInfo>> + Send;

    fn create_check_suite(
        &self,
        owner: &str,
        repo: &str,
        head_sha: &str,
        head_branch: &str,
    ) -> impl std::future::Future<Output = Result<CheckSuiteInfo>> + Send;

    fn rerequest_check_suite(
        &self,
        owner: &str,
        repo: &str,
        check_suite_id: u64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn list_check_suites_for_ref(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        app_id: AppId,
    ) -> impl std::future::Future<Output = Result<Vec<CheckSuiteInfo>>> + Send;

    fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// The installation token this client was minted with, so callers (the
    /// enricher, the reporter registration) can forward it downstream
    /// without re-deriving it.
    fn installation_token(&self) -> &InstallationToken;
}

/// `GitHubApi` backed by a real, installation-authenticated `octocrab::Octocrab`.
#[derive(Clone)]
pub struct OctocrabApi {
    client: octocrab::Octocrab,
    token: InstallationToken,
}

impl OctocrabApi {
    pub fn new(client: octocrab::Octocrab, token: InstallationToken) -> Self {
        Self { client, token }
    }

    /// Build a client directly from an already-minted installation token,
    /// without re-exchanging the app JWT. Used by the reporter (§4.9), which
    /// stores the token handed to it at build-registration time rather than
    /// minting a fresh one per comment.
    pub fn from_token(base_url: Option<&str>, token: InstallationToken) -> Result<Self> {
        let mut builder = octocrab::Octocrab::builder().personal_token(token.token.clone());
        if let Some(base_url) = base_url {
            builder = builder.base_uri(base_url).map_err(|e| ApiError::Request { source: e })?;
        }
        let client = builder.build().map_err(|e| ApiError::Request { source: e })?;
        Ok(Self { client, token })
    }
}

#[derive(Debug, Serialize)]
struct CreateCheckSuiteBody<'a> {
    head_sha: &'a str,
    head_branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckSuiteResponse {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct CheckSuiteListResponse {
    check_suites: Vec<CheckSuiteResponse>,
}

impl GitHubApi for OctocrabApi {
    async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestInfo> {
        let pr = self
            .client
            .pulls(owner, repo)
            .get(number)
            .await
            .context(RequestSnafu)?;
        Ok(PullRequestInfo {
            number: pr.number,
            head_sha: pr.head.sha,
        })
    }

    async fn create_check_suite(&self, owner: &str, repo: &str, head_sha: &str, head_branch: &str) -> Result<CheckSuiteInfo> {
        let route = format!("/repos/{owner}/{repo}/check-suites");
        let body = CreateCheckSuiteBody { head_sha, head_branch };
        let response: CheckSuiteResponse = self
            .client
            ._post(route, Some(&body))
            .await
            .context(RequestSnafu)?;
        Ok(CheckSuiteInfo { id: response.id })
    }

    /// "Rerequest a check suite" responds `201 Created` with an empty body —
    /// asking octocrab for `()` instead of a parsed type means we only check
    /// the status, the same way octocrab's own no-content routes do.
    async fn rerequest_check_suite(&self, owner: &str, repo: &str, check_suite_id: u64) -> Result<()> {
        let route = format!("/repos/{owner}/{repo}/check-suites/{check_suite_id}/rerequest");
        self.client._post(route, None::<&()>).await.context(RequestSnafu)
    }

    async fn list_check_suites_for_ref(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        app_id: AppId,
    ) -> Result<Vec<CheckSuiteInfo>> {
        let route = format!("/repos/{owner}/{repo}/commits/{sha}/check-suites?app_id={app_id}");
        let response: CheckSuiteListResponse =
            self.client._get(route).await.context(RequestSnafu)?;
        Ok(response
            .check_suites
            .into_iter()
            .map(|s| CheckSuiteInfo { id: s.id })
            .collect())
    }

    async fn create_issue_comment(&self, owner: &str, repo: &str, issue_number: u64, body: &str) -> Result<()> {
        self.client
            .issues(owner, repo)
            .create_comment(issue_number, body)
            .await
            .context(RequestSnafu)?;
        Ok(())
    }

    fn installation_token(&self) -> &InstallationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> InstallationToken {
        InstallationToken {
            token: "test-token".to_string(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn create_check_suite_sends_the_head_branch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/check-suites"))
            .and(body_json(serde_json::json!({
                "head_sha": "deadbeef",
                "head_branch": "refs/pull/7/head",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 99 })))
            .mount(&server)
            .await;

        let api = OctocrabApi::from_token(Some(&server.uri()), token()).unwrap();
        let suite = api
            .create_check_suite("acme", "widgets", "deadbeef", "refs/pull/7/head")
            .await
            .unwrap();

        assert_eq!(suite.id, 99);
    }

    #[tokio::test]
    async fn rerequest_check_suite_accepts_the_empty_201_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/check-suites/99/rerequest"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let api = OctocrabApi::from_token(Some(&server.uri()), token()).unwrap();
        api.rerequest_check_suite("acme", "widgets", 99).await.unwrap();
    }
}
