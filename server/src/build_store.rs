//! A reference `BuildStore` (§1, §4.4). The design deliberately specifies
//! the build store only by the interface the core consumes — "no concrete
//! backing store (database, queue, HTTP client) is implemented; callers
//! inject their own". This in-memory adapter exists so the binary in this
//! crate is runnable end to end; it is not meant to back a real deployment.

use std::collections::HashMap;
use std::sync::RwLock;

use github_event_handler::build_store::{BuildStore, BuildStoreError};
use github_event_handler::model::{Build, Project};
use tracing::info;

#[derive(Default)]
pub struct InMemoryBuildStore {
    projects: RwLock<HashMap<String, Project>>,
}

impl InMemoryBuildStore {
    pub fn new(projects: impl IntoIterator<Item = Project>) -> Self {
        let by_name = projects.into_iter().map(|p| (p.name.clone(), p)).collect();
        Self {
            projects: RwLock::new(by_name),
        }
    }
}

impl BuildStore for InMemoryBuildStore {
    async fn get_project(&self, repo_full_name: &str) -> Result<Option<Project>, BuildStoreError> {
        Ok(self
            .projects
            .read()
            .map_err(|_| BuildStoreError::Backend {
                message: "project registry lock poisoned".to_string(),
            })?
            .get(repo_full_name)
            .cloned())
    }

    async fn create_build(&self, build: Build) -> Result<(), BuildStoreError> {
        info!(build_id = %build.id, project_id = %build.project_id, kind = %build.r#type, "build created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use github_event_handler::model::{GitHubProjectConfig, Revision};

    fn project(name: &str) -> Project {
        Project {
            id: name.to_string(),
            name: name.to_string(),
            shared_secret: Some("shh".to_string()),
            github: GitHubProjectConfig {
                base_url: None,
                upload_url: None,
                token: None,
            },
        }
    }

    #[tokio::test]
    async fn looks_up_a_seeded_project_by_full_name() {
        let store = InMemoryBuildStore::new([project("owner/repo")]);
        let found = store.get_project("owner/repo").await.unwrap();
        assert_eq!(found.unwrap().id, "owner/repo");
    }

    #[tokio::test]
    async fn unknown_project_is_none_not_an_error() {
        let store = InMemoryBuildStore::new([]);
        assert!(store.get_project("owner/repo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_build_always_succeeds() {
        let store = InMemoryBuildStore::new([]);
        let build = Build::new("p1", "push", Revision::with_default_ref("abc123"), vec![]);
        store.create_build(build).await.unwrap();
    }
}
