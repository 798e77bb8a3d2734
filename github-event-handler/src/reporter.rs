//! The build reporter (§4.9): watches spawned worker pods through a shared
//! cache and, on failure, posts a comment back to the originating GitHub
//! issue or pull request. Driven by a rate-limited [`Workqueue`] keyed by
//! `namespace/podName`, exactly like the per-key-serialized processing loop
//! the design calls for.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use k8s_openapi::api::core::v1::Pod;
use kube::runtime::watcher;
use kube::{Api, Client};
use snafu::{ResultExt, Snafu};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::build_store::BuildStore;
use crate::github_api::{GitHubApi, InstallationToken, OctocrabApi};
use crate::model::CommentableBuild;
use crate::scheduler::FailureReporter;
use crate::workqueue::Workqueue;

/// Fixed comment body posted on build failure; the build ID gives the
/// operator something to grep logs for.
fn failure_comment(build_id: &str) -> String {
    indoc::formatdoc! {"
        # Build Failed

        Build `{build_id}` failed. Check the build logs for details.
    "}
}

const MAX_RETRIES: u32 = 5;

/// Mirrors `k8s_openapi`'s `PodStatus.phase` string values, plus `Other` for
/// a phase string outside that set (§4.9 step 3's `UnexpectedPhase` path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
    Other(String),
}

impl PodPhase {
    /// Parses a raw `status.phase` string. Never fails: an unrecognized,
    /// non-empty value becomes `Other`, which `process` turns into a
    /// retryable `UnexpectedPhase` rather than silently no-op'ing.
    fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Unknown" | "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ReporterError {
    #[snafu(display("pod {key} reported an unrecognized phase {phase:?}"))]
    UnexpectedPhase { key: String, phase: String },

    #[snafu(display("no project registered for {project_name}"))]
    ProjectNotFound { project_name: String },

    #[snafu(display("build store lookup failed: {source}"))]
    Store { source: crate::build_store::BuildStoreError },

    #[snafu(display("failed to build an installation client: {source}"))]
    Client { source: crate::github_api::ApiError },

    #[snafu(display("failed to post the failure comment: {source}"))]
    Comment { source: crate::github_api::ApiError },
}

/// The pod-phase cache the reporter reads. Populated by `Add`/`Update`
/// watch events and by placeholder insertion at build-registration time;
/// never by the reporter's own worker loop.
#[derive(Clone, Default)]
struct PodIndex {
    phases: Arc<StdMutex<HashMap<String, PodPhase>>>,
}

impl PodIndex {
    fn insert_placeholder(&self, key: &str) {
        self.phases.lock().unwrap().entry(key.to_string()).or_insert(PodPhase::Pending);
    }

    fn set(&self, key: &str, phase: PodPhase) {
        self.phases.lock().unwrap().insert(key.to_string(), phase);
    }

    fn remove(&self, key: &str) {
        self.phases.lock().unwrap().remove(key);
    }

    fn get(&self, key: &str) -> Option<PodPhase> {
        self.phases.lock().unwrap().get(key).cloned()
    }
}

fn pod_key(namespace: &str, pod_name: &str) -> String {
    format!("{namespace}/{pod_name}")
}

/// Workqueue-driven controller over worker pods (§4.9).
pub struct Reporter<S> {
    namespace: String,
    github_api_base_url: Option<String>,
    store: Arc<S>,
    builds: StdMutex<HashMap<String, CommentableBuild>>,
    index: PodIndex,
    queue: Workqueue,
}

impl<S> Reporter<S>
where
    S: BuildStore + Send + Sync + 'static,
{
    pub fn new(namespace: impl Into<String>, github_api_base_url: Option<String>, store: Arc<S>) -> Arc<Self> {
        Arc::new(Self {
            namespace: namespace.into(),
            github_api_base_url,
            store,
            builds: StdMutex::new(HashMap::new()),
            index: PodIndex::default(),
            queue: Workqueue::new(),
        })
    }

    /// Spawn the pod watcher and `threadiness` worker tasks. Both stop once
    /// `shutdown` is cancelled; the returned handles can be awaited to
    /// confirm a clean drain.
    pub fn run(self: &Arc<Self>, client: Client, threadiness: usize, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(threadiness + 1);
        handles.push(self.clone().spawn_watcher(client, shutdown.clone()));
        for _ in 0..threadiness.max(1) {
            handles.push(self.clone().spawn_worker(shutdown.clone()));
        }
        handles
    }

    fn spawn_watcher(self: Arc<Self>, client: Client, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            use futures_util::StreamExt;

            let api: Api<Pod> = Api::namespaced(client, &self.namespace);
            let mut stream = watcher::watcher(api, watcher::Config::default()).boxed();

            loop {
                let next = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    next = stream.next() => next,
                };
                let Some(event) = next else { break };
                match event {
                    Ok(watcher::Event::Apply(pod)) | Ok(watcher::Event::InitApply(pod)) => {
                        self.observe(&pod);
                    }
                    Ok(watcher::Event::Delete(pod)) => {
                        if let Some(name) = pod.metadata.name.as_deref() {
                            let key = pod_key(&self.namespace, name);
                            self.index.remove(&key);
                            self.queue.add(key).await;
                        }
                    }
                    Ok(watcher::Event::Init) | Ok(watcher::Event::InitDone) => {}
                    Err(err) => {
                        tracing::warn!(%err, "pod watch stream errored, continuing");
                    }
                }
            }
            self.queue.shutdown().await;
        })
    }

    fn observe(&self, pod: &Pod) {
        let Some(name) = pod.metadata.name.as_deref() else { return };
        if !self.builds.lock().unwrap().contains_key(name) {
            // not a build we registered interest in; ignore to keep the
            // index from growing unbounded with unrelated pods.
            return;
        }
        let key = pod_key(&self.namespace, name);
        let phase = pod
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .unwrap_or("");
        self.index.set(&key, PodPhase::parse(phase));
        let queue = self.queue.clone();
        tokio::spawn(async move { queue.add(key).await });
    }

    fn spawn_worker(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let key = tokio::select! {
                    _ = shutdown.cancelled() => None,
                    key = self.queue.get() => key,
                };
                let Some(key) = key else { break };

                match self.process(&key).await {
                    Ok(()) => self.queue.forget(&key).await,
                    Err(err) => {
                        tracing::warn!(key, %err, "reporter step failed");
                        if self.queue.num_requeues(&key).await >= MAX_RETRIES {
                            tracing::error!(key, "giving up after {MAX_RETRIES} retries");
                            self.queue.forget(&key).await;
                        } else {
                            self.queue.add_rate_limited(&key).await;
                        }
                    }
                }
                self.queue.done(&key).await;
            }
        })
    }

    /// One pass of the processing loop (§4.9, step 2–4). `key` is
    /// `namespace/podName`.
    async fn process(&self, key: &str) -> Result<(), ReporterError> {
        let Some((_, pod_name)) = key.split_once('/') else {
            return Ok(());
        };
        let Some(phase) = self.index.get(key) else {
            // pod may have been deleted; nothing to do.
            return Ok(());
        };

        match phase {
            PodPhase::Pending | PodPhase::Running | PodPhase::Unknown => Ok(()),
            PodPhase::Succeeded => {
                // terminal, non-failure: the build succeeded, drop our
                // bookkeeping without commenting.
                self.builds.lock().unwrap().remove(pod_name);
                self.index.remove(key);
                Ok(())
            }
            PodPhase::Failed => self.report_failure(pod_name).await,
            PodPhase::Other(phase) => Err(ReporterError::UnexpectedPhase { key: key.to_string(), phase }),
        }
    }

    async fn report_failure(&self, pod_name: &str) -> Result<(), ReporterError> {
        let Some(build) = self.builds.lock().unwrap().get(pod_name).cloned() else {
            // not one of ours.
            return Ok(());
        };

        let project = self
            .store
            .get_project(&build.project_name)
            .await
            .context(StoreSnafu)?
            .context(ProjectNotFoundSnafu {
                project_name: build.project_name.clone(),
            })?;

        let base_url = project.github.base_url.as_deref().or(self.github_api_base_url.as_deref());
        let client = OctocrabApi::from_token(
            base_url,
            InstallationToken {
                token: build.installation_token.clone(),
                expires_at: None,
            },
        )
        .context(ClientSnafu)?;

        let Some((owner, repo)) = project.owner_and_repo() else {
            return Ok(());
        };

        client
            .create_issue_comment(owner, repo, build.issue_number, &failure_comment(&build.build_id))
            .await
            .context(CommentSnafu)?;

        self.builds.lock().unwrap().remove(pod_name);
        self.index.remove(&pod_key(&self.namespace, pod_name));
        Ok(())
    }
}

impl<S> FailureReporter for Reporter<S>
where
    S: BuildStore + Send + Sync + 'static,
{
    fn register(&self, build_id: &str, project_name: &str, issue_number: u64, installation_token: &str) {
        let pod_name = crate::model::worker_pod_name(build_id);
        self.builds.lock().unwrap().insert(
            pod_name.clone(),
            CommentableBuild {
                build_id: build_id.to_string(),
                project_name: project_name.to_string(),
                issue_number,
                installation_token: installation_token.to_string(),
            },
        );
        self.index.insert_placeholder(&pod_key(&self.namespace, &pod_name));
    }
}
