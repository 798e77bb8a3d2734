//! Pull-request allow policy (§4.10): decides whether a `pull_request` event
//! is admitted before it reaches the scheduler.

use crate::event::PullRequestFacts;

const ADMITTED_ACTIONS: &[&str] = &[
    "opened",
    "synchronize",
    "reopened",
    "labeled",
    "unlabeled",
    "closed",
];

/// Default allowlist of `author_association` values trusted to build from a
/// fork, used when the gateway config doesn't override it.
pub const DEFAULT_ALLOWLIST: &[&str] = &["COLLABORATOR", "OWNER", "MEMBER"];

/// Admits a `pull_request` event iff its action is in the admitted set and
/// either the PR isn't from a fork or its author association is allow-listed.
pub fn admit_pull_request(action: &str, pr: &PullRequestFacts, allowlist: &[String]) -> bool {
    if !ADMITTED_ACTIONS.contains(&action) {
        return false;
    }
    !pr.is_fork || allowlist.iter().any(|a| a == &pr.author_association)
}

/// Whether a commenting author on an `issue_comment` is trusted enough for
/// the enricher (§4.6) to fetch and attach PR details.
pub fn admit_issue_comment_author(author_association: &str, allowlist: &[String]) -> bool {
    allowlist.iter().any(|a| a == author_association)
}
