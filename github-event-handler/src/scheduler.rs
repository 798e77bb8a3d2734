//! Build scheduler (§4.7): turns one accepted delivery into one or two
//! builds, subject to the emission filter (§4.8), and registers builds that
//! can fail visibly with the failure reporter (§4.9).

use tracing::{debug, instrument};

use crate::build_store::{BuildStore, BuildStoreError};
use crate::filter;
use crate::ids::IssueId;
use crate::model::{Build, Revision};

/// Registers a build the reporter should watch for pod failure. Kept
/// separate from `BuildStore` because it's an in-process concern (the
/// reporter's indexer), not a persistence one.
pub trait FailureReporter: Send + Sync {
    fn register(&self, build_id: &str, project_name: &str, issue_number: u64, installation_token: &str);
}

/// A no-op reporter for gateways started with `ReportBuildFailures=false`.
pub struct NoopReporter;

impl FailureReporter for NoopReporter {
    fn register(&self, _build_id: &str, _project_name: &str, _issue_number: u64, _installation_token: &str) {}
}

pub struct ScheduleRequest<'a> {
    pub project_id: &'a str,
    pub project_name: &'a str,
    pub event_type: &'a str,
    pub action: Option<&'a str>,
    pub revision: Revision,
    pub payload: Vec<u8>,
    pub issue_id: Option<IssueId>,
    pub installation_token: Option<&'a str>,
    pub report_build_failures: bool,
}

/// Emit `eventType`, then (if `action` is non-empty) `eventType:action`,
/// each filtered independently and in that order (§5's ordering guarantee).
/// Returns the build types actually created, in creation order, so callers
/// can assert against the literal scenarios in §8.
#[instrument(skip(build_store, reporter, req), fields(event_type = req.event_type, project = req.project_id))]
pub async fn schedule(
    req: ScheduleRequest<'_>,
    emitted_events: &[String],
    build_store: &impl BuildStore,
    reporter: &impl FailureReporter,
) -> Result<Vec<String>, BuildStoreError> {
    let mut kinds = vec![req.event_type.to_string()];
    if let Some(action) = req.action.filter(|a| !a.is_empty()) {
        kinds.push(format!("{}:{action}", req.event_type));
    }

    let mut created = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !filter::is_emitted(emitted_events, &kind) {
            debug!(kind, "emission filter dropped build");
            continue;
        }
        let build = Build::new(req.project_id, kind.clone(), req.revision.clone(), req.payload.clone());
        build_store.create_build(build.clone()).await?;
        created.push(kind);

        if let (true, Some(issue_id), Some(token)) = (req.report_build_failures, req.issue_id, req.installation_token) {
            if !issue_id.is_zero() && !token.is_empty() {
                reporter.register(&build.id, req.project_name, issue_id.0, token);
            }
        }
    }
    Ok(created)
}
