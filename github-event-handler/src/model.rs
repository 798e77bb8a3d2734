//! Core data model (§3): projects, revisions, builds, and the payload shape
//! forwarded to the build store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AppId, InstallationId};

/// The ref a push-style event builds against when the payload itself carries
/// no usable ref.
pub const DEFAULT_REF: &str = "refs/heads/master";

/// GitHub-side configuration for a registered project.
#[derive(Debug, Clone)]
pub struct GitHubProjectConfig {
    pub base_url: Option<String>,
    pub upload_url: Option<String>,
    /// Carried from the build store's project record (§3's data model) for
    /// downstream consumers that clone or push against the repo directly;
    /// the dispatcher itself always authenticates via a minted installation
    /// token, never this field.
    pub token: Option<String>,
}

/// A project the gateway knows how to build: a GitHub repository plus the
/// secret used to validate webhook deliveries for it.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    /// `"owner/name"`.
    pub name: String,
    pub shared_secret: Option<String>,
    pub github: GitHubProjectConfig,
}

impl Project {
    pub fn owner_and_repo(&self) -> Option<(&str, &str)> {
        self.name.split_once('/')
    }
}

/// The commit and ref a build runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub r#ref: String,
}

impl Revision {
    pub fn with_default_ref(commit: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            r#ref: DEFAULT_REF.to_string(),
        }
    }
}

/// A single unit of work handed to the build store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    pub project_id: String,
    pub r#type: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub revision: Revision,
    pub payload: Vec<u8>,
}

fn default_provider() -> String {
    "github".to_string()
}

impl Build {
    pub const PROVIDER: &'static str = "github";

    pub fn new(project_id: impl Into<String>, kind: impl Into<String>, revision: Revision, payload: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            r#type: kind.into(),
            provider: Self::PROVIDER.to_string(),
            revision,
            payload,
        }
    }
}

/// The payload handed to the downstream worker, merging the original GitHub
/// body with the installation token minted for this delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardedPayload {
    pub r#type: String,
    pub token: String,
    pub token_expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub body: serde_json::Value,
    #[serde(skip)]
    pub app_id: Option<AppId>,
    #[serde(skip)]
    pub installation_id: Option<InstallationId>,
}

/// Process-wide, startup-immutable GitHub App identity (§3's `AppContext`).
#[derive(Clone)]
pub struct AppContext {
    pub app_id: AppId,
    pub installation_id: Option<InstallationId>,
    pub key_pem: secrecy::SecretString,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("app_id", &self.app_id)
            .field("installation_id", &self.installation_id)
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

/// A build the reporter has registered interest in: it carries an issue/PR
/// number and an installation token it can use to comment there if the
/// build's pod fails.
#[derive(Debug, Clone)]
pub struct CommentableBuild {
    pub build_id: String,
    pub project_name: String,
    pub issue_number: u64,
    pub installation_token: String,
}

/// Convention-bound pod name for a build's worker, per the glossary.
pub fn worker_pod_name(build_id: &str) -> String {
    format!("brigade-worker-{build_id}")
}
