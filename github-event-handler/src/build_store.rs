//! The downstream sink builds are handed to (§3, §4.4, §4.7). The gateway
//! only needs to look up a project by repository name and persist builds;
//! everything else (queuing, scheduling actual work) lives past this trait.

use crate::model::{Build, Project};

#[derive(Debug, snafu::Snafu)]
pub enum BuildStoreError {
    #[snafu(display("project store backend failed: {message}"))]
    Backend { message: String },
}

pub trait BuildStore: Send + Sync {
    fn get_project(
        &self,
        repo_full_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Project>, BuildStoreError>> + Send;

    fn create_build(
        &self,
        build: Build,
    ) -> impl std::future::Future<Output = Result<(), BuildStoreError>> + Send;
}
