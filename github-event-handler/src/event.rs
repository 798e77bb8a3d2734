//! Payload parsing & adapter (§4.3): turns `(X-GitHub-Event, raw body)` into
//! the uniformly-shaped fields the rest of the dispatcher needs.
//!
//! GitHub unions its webhook bodies by event name only, so the input is
//! necessarily untyped JSON; each supported kind gets its own minimal
//! `#[derive(Deserialize)]` shape carrying just the fields the derivation
//! rules in the table below consume. Unknown event names fall through to
//! `DerivedEvent::unknown`, which the dispatcher turns into `200 Ignored`.

use serde::Deserialize;
use serde_json::Value;

use crate::ids::{AppId, InstallationId, IssueId};
use crate::model::Revision;

/// The event kinds this gateway derives a revision/action for. Anything else
/// is `Unsupported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
    PullRequestReview,
    PullRequestReviewComment,
    CommitComment,
    Create,
    Release,
    Status,
    Deployment,
    DeploymentStatus,
    CheckSuite,
    CheckRun,
    IssueComment,
    Ping,
    Unsupported,
}

impl EventKind {
    pub fn from_header(event_type: &str) -> Self {
        match event_type {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            "pull_request_review" => Self::PullRequestReview,
            "pull_request_review_comment" => Self::PullRequestReviewComment,
            "commit_comment" => Self::CommitComment,
            "create" => Self::Create,
            "release" => Self::Release,
            "status" => Self::Status,
            "deployment" => Self::Deployment,
            "deployment_status" => Self::DeploymentStatus,
            "check_suite" => Self::CheckSuite,
            "check_run" => Self::CheckRun,
            "issue_comment" => Self::IssueComment,
            "ping" => Self::Ping,
            _ => Self::Unsupported,
        }
    }
}

/// Everything the dispatcher derives uniformly from a webhook delivery,
/// before policy (§4.10) and the adapter/enricher (§4.5, §4.6) run.
#[derive(Debug, Clone, Default)]
pub struct DerivedEvent {
    pub repo_full_name: String,
    pub revision: Revision,
    pub action: Option<String>,
    pub app_id: Option<AppId>,
    pub installation_id: Option<InstallationId>,
    pub issue_id: Option<IssueId>,
    /// Set for `push` events carrying `deleted: true` (§4.3's branch-delete policy).
    pub branch_deleted: bool,
    /// Set for `pull_request` events; carries the fields the allow policy (§4.10)
    /// and check-suite adapter (§4.5) need beyond the uniform fields above.
    pub pull_request: Option<PullRequestFacts>,
    /// Set for `issue_comment` events on a pull request.
    pub issue_comment: Option<IssueCommentFacts>,
}

#[derive(Debug, Clone)]
pub struct PullRequestFacts {
    pub number: u64,
    pub head_sha: String,
    pub is_fork: bool,
    pub author_association: String,
}

#[derive(Debug, Clone)]
pub struct IssueCommentFacts {
    pub issue_number: u64,
    pub is_pull_request: bool,
    pub author_association: String,
}

// ---------------------------------------------------------------------
// Minimal per-event wire shapes
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct Installation {
    id: u64,
}

#[derive(Debug, Deserialize, Default)]
struct Envelope {
    #[serde(default)]
    repository: Option<Repo>,
    #[serde(default)]
    installation: Option<Installation>,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    head_commit: Option<HeadCommit>,
}

#[derive(Debug, Deserialize)]
struct HeadCommit {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    pull_request: PullRequestBody,
}

#[derive(Debug, Deserialize)]
struct PullRequestBody {
    head: CommitRef,
    #[serde(default)]
    author_association: String,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
    #[serde(default)]
    repo: Option<HeadRepo>,
}

#[derive(Debug, Deserialize)]
struct HeadRepo {
    #[serde(default)]
    fork: bool,
}

#[derive(Debug, Deserialize)]
struct CommitCommentPayload {
    comment: CommitComment,
}

#[derive(Debug, Deserialize)]
struct CommitComment {
    commit_id: String,
}

#[derive(Debug, Deserialize)]
struct CreatePayload {
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    release: ReleaseBody,
}

#[derive(Debug, Deserialize)]
struct ReleaseBody {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentPayload {
    deployment: DeploymentBody,
}

#[derive(Debug, Deserialize)]
struct DeploymentBody {
    sha: String,
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentStatusPayload {
    deployment: DeploymentBody,
}

#[derive(Debug, Deserialize)]
struct CheckSuitePayload {
    check_suite: CheckSuiteBody,
}

#[derive(Debug, Deserialize)]
struct CheckSuiteBody {
    head_sha: String,
    #[serde(default)]
    head_branch: Option<String>,
    #[serde(default)]
    pull_requests: Vec<MinimalPullRequest>,
    #[serde(default)]
    app: Option<AppRef>,
}

#[derive(Debug, Deserialize)]
struct MinimalPullRequest {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct AppRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct CheckRunPayload {
    check_run: CheckRunBody,
}

#[derive(Debug, Deserialize)]
struct CheckRunBody {
    check_suite: CheckSuiteBody,
}

#[derive(Debug, Deserialize)]
struct IssueCommentPayload {
    issue: Issue,
    comment: IssueCommentBody,
}

#[derive(Debug, Deserialize)]
struct Issue {
    number: u64,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct IssueCommentBody {
    #[serde(default)]
    author_association: String,
}

/// Parse `(event_type, body)` into a [`DerivedEvent`]. Returns `Ok(None)` for
/// `ping` (handled with an immediate 200 by the caller) and unsupported event
/// types (handled with `200 Ignored`).
pub fn derive(event_type: &str, body: &Value) -> Result<Option<DerivedEvent>, serde_json::Error> {
    let kind = EventKind::from_header(event_type);
    if matches!(kind, EventKind::Ping | EventKind::Unsupported) {
        return Ok(None);
    }

    let envelope: Envelope = serde_json::from_value(body.clone()).unwrap_or_default();
    let repo_full_name = envelope
        .repository
        .map(|r| r.full_name)
        .unwrap_or_default();
    let installation_id = envelope.installation.map(|i| InstallationId(i.id));

    let mut derived = DerivedEvent {
        repo_full_name,
        installation_id,
        action: envelope.action,
        ..Default::default()
    };

    match kind {
        EventKind::Push => {
            let p: PushPayload = serde_json::from_value(body.clone())?;
            derived.branch_deleted = p.deleted;
            derived.revision = Revision {
                commit: p.head_commit.map(|c| c.id).unwrap_or_default(),
                r#ref: p.git_ref,
            };
            derived.action = None;
        }
        EventKind::PullRequest => {
            let p: PullRequestPayload = serde_json::from_value(body.clone())?;
            let is_fork = p.pull_request.head.repo.as_ref().map(|r| r.fork).unwrap_or(false);
            derived.issue_id = Some(IssueId(p.number));
            derived.revision = Revision {
                commit: p.pull_request.head.sha.clone(),
                r#ref: format!("refs/pull/{}/head", p.number),
            };
            derived.pull_request = Some(PullRequestFacts {
                number: p.number,
                head_sha: p.pull_request.head.sha,
                is_fork,
                author_association: p.pull_request.author_association,
            });
        }
        EventKind::PullRequestReview | EventKind::PullRequestReviewComment => {
            let p: PullRequestPayload = serde_json::from_value(body.clone())?;
            derived.revision = Revision {
                commit: p.pull_request.head.sha,
                r#ref: format!("refs/pull/{}/head", p.number),
            };
        }
        EventKind::CommitComment => {
            let p: CommitCommentPayload = serde_json::from_value(body.clone())?;
            derived.revision = Revision::with_default_ref(p.comment.commit_id);
            derived.revision.r#ref = String::new();
        }
        EventKind::Create => {
            let p: CreatePayload = serde_json::from_value(body.clone())?;
            derived.revision.r#ref = p.git_ref;
            derived.action = None;
        }
        EventKind::Release => {
            let p: ReleasePayload = serde_json::from_value(body.clone())?;
            derived.revision.r#ref = p.release.tag_name;
        }
        EventKind::Status => {
            let p: StatusPayload = serde_json::from_value(body.clone())?;
            derived.revision.commit = p.sha;
            derived.action = None;
        }
        EventKind::Deployment => {
            let p: DeploymentPayload = serde_json::from_value(body.clone())?;
            derived.revision = Revision {
                commit: p.deployment.sha,
                r#ref: p.deployment.git_ref,
            };
            derived.action = None;
        }
        EventKind::DeploymentStatus => {
            let p: DeploymentStatusPayload = serde_json::from_value(body.clone())?;
            derived.revision = Revision {
                commit: p.deployment.sha,
                r#ref: p.deployment.git_ref,
            };
            derived.action = None;
        }
        EventKind::CheckSuite => {
            // A `check_suite` delivery missing the fields this gateway cares
            // about is treated as unsupported rather than a malformed-body
            // error: there is no well-known variant to dereference.
            let Ok(p) = serde_json::from_value::<CheckSuitePayload>(body.clone()) else {
                return Ok(None);
            };
            derived.app_id = p.check_suite.app.map(|a| AppId(a.id));
            derived.issue_id = p.check_suite.pull_requests.first().map(|pr| IssueId(pr.number));
            derived.revision = Revision {
                commit: p.check_suite.head_sha,
                r#ref: p.check_suite.head_branch.unwrap_or_default(),
            };
        }
        EventKind::CheckRun => {
            let Ok(p) = serde_json::from_value::<CheckRunPayload>(body.clone()) else {
                return Ok(None);
            };
            let suite = p.check_run.check_suite;
            derived.app_id = suite.app.map(|a| AppId(a.id));
            derived.issue_id = suite.pull_requests.first().map(|pr| IssueId(pr.number));
            derived.revision = Revision {
                commit: suite.head_sha,
                r#ref: suite.head_branch.unwrap_or_default(),
            };
        }
        EventKind::IssueComment => {
            let p: IssueCommentPayload = serde_json::from_value(body.clone())?;
            let is_pr = p.issue.pull_request.is_some();
            derived.issue_id = Some(IssueId(p.issue.number));
            derived.issue_comment = Some(IssueCommentFacts {
                issue_number: p.issue.number,
                is_pull_request: is_pr,
                author_association: p.comment.author_association,
            });
            // Revision defaults to `refs/heads/master` with no commit; the
            // enricher (§4.6) overwrites this once it has fetched the PR, if
            // the commenting author is allow-listed.
            derived.revision = Revision {
                commit: String::new(),
                r#ref: if is_pr {
                    String::new() // filled in by the caller once the PR number is known
                } else {
                    crate::model::DEFAULT_REF.to_string()
                },
            };
        }
        EventKind::Ping | EventKind::Unsupported => unreachable!("handled above"),
    }

    Ok(Some(derived))
}
