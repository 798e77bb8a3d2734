//! The webhook ingestion core (§1–§2 of the design): signature verification,
//! event parsing, policy, the pull-request → check-suite adapter, the
//! issue-comment enricher, the build scheduler, and the failure reporter.
//!
//! Transport (HTTP extraction, status-code mapping) lives in the `server`
//! crate; this crate exposes [`dispatch`] as the single entry point a
//! transport layer drives once it has a raw body, the `X-GitHub-Event`
//! header, and the `X-Hub-Signature` header in hand.

pub mod auth;
pub mod build_store;
pub mod error;
pub mod event;
pub mod filter;
pub mod github_api;
pub mod ids;
pub mod model;
pub mod policy;
pub mod reporter;
pub mod scheduler;
pub mod signature;
pub mod workqueue;

use snafu::{OptionExt, ResultExt};
use tracing::{instrument, warn};

use auth::InstallationAuthenticator;
use build_store::BuildStore;
use error::{EventError, MalformedBodySnafu, NoSecretSnafu, ProjectNotFoundSnafu, StoreSnafu};
use event::EventKind;
use github_api::GitHubApi;
use ids::AppId;
use model::{ForwardedPayload, Revision, DEFAULT_REF};
use scheduler::{FailureReporter, ScheduleRequest};

/// Startup-immutable gateway configuration, passed explicitly through the
/// dispatcher (§9's "Global configuration" note) rather than read from
/// ambient state. The `server` crate's env-parsed config converts into this.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub app_id: Option<AppId>,
    pub check_suite_on_pr: bool,
    /// REDESIGN FLAG (§9): whether `prToCheckSuite` short-circuits the rest
    /// of the PR handler. `false` preserves the historical fall-through
    /// behavior (a `pull_request` build is still created).
    pub check_suite_short_circuits: bool,
    pub default_shared_secret: Option<String>,
    pub author_allowlist: Vec<String>,
    pub emitted_events: Vec<String>,
    pub report_build_failures: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            check_suite_on_pr: true,
            check_suite_short_circuits: false,
            default_shared_secret: None,
            author_allowlist: policy::DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            emitted_events: vec!["*".to_string()],
            report_build_failures: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The event was accepted; zero or more builds were (attempted to be)
    /// created, subject to the emission filter.
    Complete,
    /// Unrecognized `X-GitHub-Event`, or a recognized kind the payload
    /// didn't carry the fields this gateway needs (§9's nil-payload note),
    /// or an event whose `appID` didn't match ours (§7's `WrongApp`).
    Ignored,
    /// Admitted by the parser but rejected by policy (fork/branch-delete).
    Skipped(String),
    /// `ping`.
    Pong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub status: DispatchStatus,
    /// Build types actually created, in creation order; empty unless
    /// `status == Complete`.
    pub builds_created: Vec<String>,
}

impl DispatchResult {
    fn status_only(status: DispatchStatus) -> Self {
        Self {
            status,
            builds_created: Vec::new(),
        }
    }
}

/// Handle one webhook delivery end to end: parse, validate, adapt/enrich,
/// and schedule. This is the "Event dispatcher" component (§2) minus the
/// HTTP-specific bits (header extraction, status-code rendering).
#[instrument(skip(cfg, bearer, store, reporter, raw_body), fields(event_type))]
pub async fn dispatch<B, N>(
    cfg: &DispatchConfig,
    bearer: &N,
    store: &B,
    reporter: &impl FailureReporter,
    event_type: &str,
    raw_body: &[u8],
    signature_header: &str,
    installation_override: Option<ids::InstallationId>,
) -> Result<DispatchResult, EventError>
where
    B: BuildStore,
    N: InstallationAuthenticator,
{
    let body: serde_json::Value = serde_json::from_slice(raw_body).context(MalformedBodySnafu {
        event_type: event_type.to_string(),
    })?;

    let Some(mut derived) = event::derive(event_type, &body).context(MalformedBodySnafu {
        event_type: event_type.to_string(),
    })?
    else {
        return Ok(DispatchResult::status_only(if event_type == "ping" {
            DispatchStatus::Pong
        } else {
            DispatchStatus::Ignored
        }));
    };

    // `/events/github/:app/:inst` lets an operator pin the installation
    // explicitly, for event types whose payload carries no `installation`
    // object of its own.
    if let Some(id) = installation_override {
        derived.installation_id = Some(id);
    }

    let project = store
        .get_project(&derived.repo_full_name)
        .await
        .context(StoreSnafu)?
        .context(ProjectNotFoundSnafu {
            repo_full_name: derived.repo_full_name.clone(),
        })?;

    let secret = project
        .shared_secret
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| cfg.default_shared_secret.clone())
        .context(NoSecretSnafu {
            repo_full_name: derived.repo_full_name.clone(),
        })?;

    if !signature::verify(&secret, raw_body, signature_header) {
        return Err(EventError::SignatureInvalid);
    }

    if let (Some(payload_app_id), Some(our_app_id)) = (derived.app_id, cfg.app_id) {
        if payload_app_id != our_app_id {
            warn!(%payload_app_id, %our_app_id, "dropping event for a different GitHub App");
            return Ok(DispatchResult::status_only(DispatchStatus::Ignored));
        }
    }

    if derived.branch_deleted {
        return Ok(DispatchResult::status_only(DispatchStatus::Skipped(
            "build skipped on branch deletion".to_string(),
        )));
    }

    let kind = EventKind::from_header(event_type);

    if let (EventKind::PullRequest, Some(pr)) = (kind, &derived.pull_request) {
        let action = derived.action.as_deref().unwrap_or_default();
        if !policy::admit_pull_request(action, pr, &cfg.author_allowlist) {
            return Ok(DispatchResult::status_only(DispatchStatus::Skipped(
                "build skipped".to_string(),
            )));
        }
    }

    let owner_repo = project.owner_and_repo().map(|(o, r)| (o.to_string(), r.to_string()));

    let installation = match derived.installation_id {
        Some(id) => Some(
            bearer
                .for_installation(id)
                .await
                .map_err(|e| EventError::AuthFailure { message: e.to_string() })?,
        ),
        None => None,
    };

    if let (EventKind::IssueComment, Some(facts)) = (kind, derived.issue_comment.clone()) {
        let action_eligible = matches!(derived.action.as_deref(), Some("created") | Some("edited"));
        let allowed =
            action_eligible && facts.is_pull_request && policy::admit_issue_comment_author(&facts.author_association, &cfg.author_allowlist);
        if allowed {
            if let (Some(client), Some((owner, repo))) = (&installation, &owner_repo) {
                let pr = client
                    .get_pull_request(owner, repo, facts.issue_number)
                    .await
                    .context(error::GitHubApiSnafu)?;
                derived.revision = Revision {
                    commit: pr.head_sha,
                    r#ref: format!("refs/pull/{}/head", facts.issue_number),
                };
            } else {
                derived.revision = Revision {
                    commit: String::new(),
                    r#ref: DEFAULT_REF.to_string(),
                };
            }
        } else {
            derived.revision = Revision {
                commit: String::new(),
                r#ref: DEFAULT_REF.to_string(),
            };
        }
    }

    if cfg.check_suite_on_pr {
        if let (EventKind::PullRequest, Some(pr), Some(client), Some((owner, repo)), Some(our_app_id)) =
            (kind, &derived.pull_request, &installation, &owner_repo, cfg.app_id)
        {
            let action = derived.action.as_deref().unwrap_or_default();
            if matches!(action, "opened" | "synchronize" | "reopened") {
                let head_branch = format!("refs/pull/{}/head", pr.number);
                if let Err(err) =
                    adapt_pull_request_to_check_suite(client, owner, repo, &pr.head_sha, &head_branch, our_app_id).await
                {
                    warn!(%err, owner, repo, "check-suite adapter failed, continuing with the primary request");
                }
                if cfg.check_suite_short_circuits {
                    return Ok(DispatchResult::status_only(DispatchStatus::Complete));
                }
            }
        }
    }

    let token_info = installation.as_ref().map(|c| c.installation_token().clone());
    let payload = match &token_info {
        Some(token) => {
            let forwarded = ForwardedPayload {
                r#type: event_type.to_string(),
                token: token.token.clone(),
                token_expires: token.expires_at,
                commit: Some(derived.revision.commit.clone()).filter(|c| !c.is_empty()),
                branch: Some(derived.revision.r#ref.clone()).filter(|r| !r.is_empty()),
                body,
                app_id: derived.app_id,
                installation_id: derived.installation_id,
            };
            serde_json::to_vec(&forwarded).unwrap_or_default()
        }
        None => serde_json::to_vec(&body).unwrap_or_default(),
    };

    let builds_created = scheduler::schedule(
        ScheduleRequest {
            project_id: &project.id,
            project_name: &project.name,
            event_type,
            action: derived.action.as_deref(),
            revision: derived.revision.clone(),
            payload,
            issue_id: derived.issue_id,
            installation_token: token_info.as_ref().map(|t| t.token.as_str()),
            report_build_failures: cfg.report_build_failures,
        },
        &cfg.emitted_events,
        store,
        reporter,
    )
    .await
    .context(StoreSnafu)?;

    Ok(DispatchResult {
        status: DispatchStatus::Complete,
        builds_created,
    })
}

/// The check-suite adapter (§4.5): create (or re-request) a check suite for
/// an eligible PR. Any failure here is logged by the caller and never fails
/// the outer request (`AdapterTransient`).
async fn adapt_pull_request_to_check_suite(
    client: &impl GitHubApi,
    owner: &str,
    repo: &str,
    head_sha: &str,
    head_branch: &str,
    our_app_id: AppId,
) -> Result<(), github_api::ApiError> {
    match client.create_check_suite(owner, repo, head_sha, head_branch).await {
        Ok(suite) => client.rerequest_check_suite(owner, repo, suite.id).await,
        Err(err) if is_unprocessable_entity(&err) => {
            let existing = client.list_check_suites_for_ref(owner, repo, head_sha, our_app_id).await?;
            if let Some(first) = existing.first() {
                client.rerequest_check_suite(owner, repo, first.id).await
            } else {
                Ok(())
            }
        }
        Err(err) => Err(err),
    }
}

fn is_unprocessable_entity(err: &github_api::ApiError) -> bool {
    let github_api::ApiError::Request { source: inner } = err;
    matches!(inner, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 422)
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::InstallationAuthenticator;
    use build_store::BuildStoreError;
    use github_api::{ApiError, CheckSuiteInfo, InstallationToken, PullRequestInfo};
    use ids::InstallationId;
    use model::{Build, GitHubProjectConfig, Project};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubStore {
        project: Mutex<Option<Project>>,
        created: Mutex<Vec<Build>>,
    }

    impl BuildStore for StubStore {
        async fn get_project(&self, _repo_full_name: &str) -> Result<Option<Project>, BuildStoreError> {
            Ok(self.project.lock().unwrap().clone())
        }

        async fn create_build(&self, build: Build) -> Result<(), BuildStoreError> {
            self.created.lock().unwrap().push(build);
            Ok(())
        }
    }

    struct NoopApi;

    impl GitHubApi for NoopApi {
        async fn get_pull_request(&self, _owner: &str, _repo: &str, number: u64) -> Result<PullRequestInfo, ApiError> {
            Ok(PullRequestInfo {
                number,
                head_sha: "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c".to_string(),
            })
        }

        async fn create_check_suite(&self, _owner: &str, _repo: &str, _head_sha: &str, _head_branch: &str) -> Result<CheckSuiteInfo, ApiError> {
            Ok(CheckSuiteInfo { id: 1 })
        }

        async fn rerequest_check_suite(&self, _owner: &str, _repo: &str, _id: u64) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_check_suites_for_ref(&self, _owner: &str, _repo: &str, _sha: &str, _app_id: AppId) -> Result<Vec<CheckSuiteInfo>, ApiError> {
            Ok(vec![])
        }

        async fn create_issue_comment(&self, _owner: &str, _repo: &str, _issue_number: u64, _body: &str) -> Result<(), ApiError> {
            Ok(())
        }

        fn installation_token(&self) -> &InstallationToken {
            static TOKEN: std::sync::OnceLock<InstallationToken> = std::sync::OnceLock::new();
            TOKEN.get_or_init(|| InstallationToken {
                token: "installation-token".to_string(),
                expires_at: None,
            })
        }
    }

    struct StubBearer;

    impl InstallationAuthenticator for StubBearer {
        type Error = std::convert::Infallible;

        async fn for_installation(&self, _id: InstallationId) -> Result<impl GitHubApi, Self::Error> {
            Ok(NoopApi)
        }
    }

    fn store_with_project() -> StubStore {
        let store = StubStore::default();
        *store.project.lock().unwrap() = Some(Project {
            id: "proj-1".to_string(),
            name: "owner/repo".to_string(),
            shared_secret: Some("shh".to_string()),
            github: GitHubProjectConfig {
                base_url: None,
                upload_url: None,
                token: None,
            },
        });
        store
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        use hmac::{Hmac, Mac};
        let mut mac = Hmac::<sha1::Sha1>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[tokio::test]
    async fn commit_comment_creates_two_builds_with_empty_ref() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "action": "created",
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "comment": {"commit_id": "9049f1265b7d61be4a8904a9a27120d2064dab3b"},
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "commit_comment",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.status, DispatchStatus::Complete);
        assert_eq!(result.builds_created, vec!["commit_comment", "commit_comment:created"]);
        let created = store.created.lock().unwrap();
        assert!(created.iter().all(|b| b.revision.r#ref.is_empty()));
    }

    #[tokio::test]
    async fn push_with_deleted_true_creates_no_builds() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "ref": "refs/heads/changes",
            "deleted": true,
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "push",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.status, DispatchStatus::Skipped("build skipped on branch deletion".to_string()));
        assert!(result.builds_created.is_empty());
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forked_pr_from_disallowed_author_is_skipped() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "number": 1,
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "pull_request": {
                "head": {"sha": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c", "repo": {"fork": true}},
                "author_association": "NONE",
            },
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "pull_request",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.status, DispatchStatus::Skipped("build skipped".to_string()));
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pull_request_opened_by_owner_creates_two_builds() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "number": 1,
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "pull_request": {
                "head": {"sha": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c", "repo": {"fork": false}},
                "author_association": "OWNER",
            },
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "pull_request",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.builds_created, vec!["pull_request", "pull_request:opened"]);
        let created = store.created.lock().unwrap();
        assert_eq!(created[0].revision.r#ref, "refs/pull/1/head");
    }

    #[tokio::test]
    async fn issue_comment_from_allowed_author_carries_a_token() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "action": "edited",
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "issue": {"number": 2, "pull_request": {}},
            "comment": {"author_association": "OWNER"},
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "issue_comment",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.builds_created, vec!["issue_comment", "issue_comment:edited"]);
        let created = store.created.lock().unwrap();
        assert_eq!(created[0].revision.r#ref, "refs/pull/2/head");
        let payload: serde_json::Value = serde_json::from_slice(&created[0].payload).unwrap();
        assert_eq!(payload["token"], "installation-token");
    }

    #[tokio::test]
    async fn issue_comment_deleted_skips_enrichment_even_from_an_allowed_author() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "action": "deleted",
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "issue": {"number": 2, "pull_request": {}},
            "comment": {"author_association": "OWNER"},
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "issue_comment",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.builds_created, vec!["issue_comment", "issue_comment:deleted"]);
        let created = store.created.lock().unwrap();
        assert_eq!(created[0].revision.r#ref, "refs/heads/master");
        assert!(created[0].revision.commit.is_empty());
    }

    #[tokio::test]
    async fn release_published_creates_two_builds_with_tag_ref() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({
            "action": "published",
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "release": {"tag_name": "0.0.1"},
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "release",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.builds_created, vec!["release", "release:published"]);
        let created = store.created.lock().unwrap();
        assert_eq!(created[0].revision.r#ref, "0.0.1");
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let store = store_with_project();
        let body = serde_json::to_vec(&json!({"repository": {"full_name": "owner/repo"}})).unwrap();

        let err = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "push",
            &body,
            "sha1=0000000000000000000000000000000000000000",
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EventError::SignatureInvalid));
    }

    #[tokio::test]
    async fn unknown_project_is_rejected() {
        let store = StubStore::default();
        let body = serde_json::to_vec(&json!({"repository": {"full_name": "owner/repo"}})).unwrap();
        let sig = sign("whatever", &body);

        let err = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "push",
            &body,
            &sig,
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, EventError::ProjectNotFound { .. }));
    }

    #[tokio::test]
    async fn ping_short_circuits_before_signature_verification() {
        let store = StubStore::default();
        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "ping",
            b"{}",
            "sha1=not-even-checked",
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.status, DispatchStatus::Pong);
    }

    #[tokio::test]
    async fn unsupported_event_is_ignored() {
        let store = StubStore::default();
        let result = dispatch(
            &DispatchConfig::default(),
            &StubBearer,
            &store,
            &scheduler::NoopReporter,
            "marketplace_purchase",
            b"{}",
            "sha1=anything",
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.status, DispatchStatus::Ignored);
    }

    #[tokio::test]
    async fn check_suite_short_circuit_skips_the_pull_request_build() {
        let store = store_with_project();
        let mut cfg = DispatchConfig {
            app_id: Some(ids::AppId(7)),
            ..DispatchConfig::default()
        };
        cfg.check_suite_short_circuits = true;
        let body = serde_json::to_vec(&json!({
            "action": "opened",
            "number": 1,
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "pull_request": {
                "head": {"sha": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c", "repo": {"fork": false}},
                "author_association": "OWNER",
            },
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(&cfg, &StubBearer, &store, &scheduler::NoopReporter, "pull_request", &body, &sig, None)
            .await
            .unwrap();

        assert_eq!(result.status, DispatchStatus::Complete);
        assert!(result.builds_created.is_empty());
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_suite_adapter_runs_before_scheduling_when_not_short_circuiting() {
        let store = store_with_project();
        let cfg = DispatchConfig {
            app_id: Some(ids::AppId(7)),
            ..DispatchConfig::default()
        };
        let body = serde_json::to_vec(&json!({
            "action": "synchronize",
            "number": 1,
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "pull_request": {
                "head": {"sha": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c", "repo": {"fork": false}},
                "author_association": "OWNER",
            },
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(&cfg, &StubBearer, &store, &scheduler::NoopReporter, "pull_request", &body, &sig, None)
            .await
            .unwrap();

        assert_eq!(result.builds_created, vec!["pull_request", "pull_request:synchronize"]);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn wrong_app_id_is_dropped_and_logged() {
        let store = store_with_project();
        let cfg = DispatchConfig {
            app_id: Some(ids::AppId(7)),
            ..DispatchConfig::default()
        };
        let body = serde_json::to_vec(&json!({
            "action": "requested",
            "repository": {"full_name": "owner/repo"},
            "installation": {"id": 99},
            "check_suite": {
                "head_sha": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c",
                "head_branch": "main",
                "app": {"id": 999},
            },
        }))
        .unwrap();
        let sig = sign("shh", &body);

        let result = dispatch(&cfg, &StubBearer, &store, &scheduler::NoopReporter, "check_suite", &body, &sig, None)
            .await
            .unwrap();

        assert_eq!(result.status, DispatchStatus::Ignored);
        assert!(store.created.lock().unwrap().is_empty());
        assert!(logs_contain("dropping event for a different GitHub App"));
    }
}
