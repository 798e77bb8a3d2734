//! Startup configuration (§6): environment variables loaded with `envious`,
//! plus the handful of CLI-only knobs (log level, listen port override)
//! layered on with `clap`.

use std::path::PathBuf;

use clap::Parser;
use github_event_handler::ids::AppId;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::GatewayError;

fn default_true() -> bool {
    true
}

fn default_authors() -> String {
    "COLLABORATOR,OWNER,MEMBER".to_string()
}

fn default_events() -> String {
    "*".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_port() -> u16 {
    7744
}

/// The env-var shaped half of the config (§6's table). Field names map to
/// `SCREAMING_SNAKE_CASE` env vars by `envious`'s default convention.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    app_id: u64,
    #[serde(default = "default_true")]
    check_suite_on_pr: bool,
    default_shared_secret: Option<String>,
    #[serde(default = "default_authors")]
    brigade_authors: String,
    #[serde(default = "default_events")]
    brigade_events: String,
    #[serde(default)]
    report_build_failures: bool,
    /// REDESIGN FLAG (§9): whether the check-suite adapter short-circuits
    /// the rest of the `pull_request` handler once it triggers a suite,
    /// instead of the historical fall-through that still creates a
    /// `pull_request` build. Off by default to preserve that behavior.
    #[serde(default)]
    check_suite_short_circuits: bool,
    key_file: PathBuf,
    github_api_base_url: Option<String>,
    #[serde(default = "default_namespace")]
    brigade_namespace: String,
    #[serde(default = "default_port")]
    brigade_gateway_port: u16,
    kube_config: Option<PathBuf>,
}

/// CLI-only overrides that don't belong in the environment table: the log
/// level and (for local runs) a config file path are conventionally flags,
/// not env-sourced settings, mirroring how other Brigade-adjacent CLIs split
/// the two.
#[derive(Debug, Parser)]
#[command(name = "github-gateway", about = "GitHub App webhook gateway")]
pub struct Cli {
    /// Overrides `RUST_LOG` for the tracing `EnvFilter`.
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,
}

/// Fully resolved gateway configuration, ready for `main` to build clients
/// and the router from.
#[derive(Clone)]
pub struct GatewayConfig {
    pub app_id: AppId,
    pub check_suite_on_pr: bool,
    pub check_suite_short_circuits: bool,
    pub default_shared_secret: Option<SecretString>,
    pub author_allowlist: Vec<String>,
    pub emitted_events: Vec<String>,
    pub report_build_failures: bool,
    pub key_pem: SecretString,
    /// Enterprise GitHub base URL; `None` means the public `api.github.com`.
    /// A GitHub App is installed against exactly one GitHub instance, so
    /// this is gateway-global rather than per-project, unlike `Project`'s
    /// own (currently informational) `github.base_url` field.
    pub github_api_base_url: Option<String>,
    pub namespace: String,
    pub port: u16,
    pub kube_config: Option<PathBuf>,
}

impl GatewayConfig {
    /// Loads §6's environment table via `envious`, then reads the PEM key
    /// file it points at.
    pub fn from_env() -> Result<Self, GatewayError> {
        let raw: RawConfig = envious::Config::default()
            .build_from_env()
            .map_err(|e| GatewayError::Config { message: e.to_string() })?;

        let key_pem = std::fs::read_to_string(&raw.key_file).map_err(|e| GatewayError::Config {
            message: format!("failed to read KEY_FILE {}: {e}", raw.key_file.display()),
        })?;

        Ok(Self {
            app_id: AppId(raw.app_id),
            check_suite_on_pr: raw.check_suite_on_pr,
            check_suite_short_circuits: raw.check_suite_short_circuits,
            default_shared_secret: raw.default_shared_secret.filter(|s| !s.is_empty()).map(SecretString::from),
            author_allowlist: split_csv(&raw.brigade_authors),
            emitted_events: split_csv(&raw.brigade_events),
            report_build_failures: raw.report_build_failures,
            key_pem: SecretString::from(key_pem),
            github_api_base_url: raw.github_api_base_url.filter(|s| !s.is_empty()),
            namespace: raw.brigade_namespace,
            port: raw.brigade_gateway_port,
            kube_config: raw.kube_config,
        })
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_empties() {
        assert_eq!(split_csv(" OWNER, COLLABORATOR ,,MEMBER"), vec!["OWNER", "COLLABORATOR", "MEMBER"]);
    }

    #[test]
    fn split_csv_of_star_is_a_single_wildcard() {
        assert_eq!(split_csv("*"), vec!["*"]);
    }
}
