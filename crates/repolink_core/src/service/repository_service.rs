//! Repository link use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for callers (CLI, request handlers).
//! - Build gateway requests for common single-field use cases.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - The store is held explicitly; there is no process-global state.

use crate::model::repository::{
    PrincipalId, ProjectId, Repository, RepositoryCreate, RepositoryDelete, RepositoryFind,
    RepositoryId, RepositoryPatch, VcsId,
};
use crate::repo::error::RepoResult;
use crate::repo::repository_repo::RepositoryStore;

/// Use-case service wrapper for repository link operations.
pub struct RepositoryService<S: RepositoryStore> {
    store: S,
}

impl<S: RepositoryStore> RepositoryService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Links a new repository and returns it as persisted.
    pub fn create(&self, create: &RepositoryCreate) -> RepoResult<Repository> {
        self.store.create_repository(create)
    }

    pub fn find_list(&self, find: &RepositoryFind) -> RepoResult<Vec<Repository>> {
        self.store.find_repository_list(find)
    }

    /// Returns the single repository matching `find`.
    pub fn find(&self, find: &RepositoryFind) -> RepoResult<Repository> {
        self.store.find_repository(find)
    }

    pub fn find_by_id(&self, id: RepositoryId) -> RepoResult<Repository> {
        self.store.find_repository(&RepositoryFind::by_id(id))
    }

    /// Returns the repository linked to `project_id`.
    pub fn find_by_project(&self, project_id: ProjectId) -> RepoResult<Repository> {
        self.store.find_repository(&RepositoryFind::by_project(project_id))
    }

    /// Lists every repository linked through one VCS.
    pub fn list_by_vcs(&self, vcs_id: VcsId) -> RepoResult<Vec<Repository>> {
        self.store.find_repository_list(&RepositoryFind::by_vcs(vcs_id))
    }

    pub fn patch(&self, patch: &RepositoryPatch) -> RepoResult<Repository> {
        self.store.patch_repository(patch)
    }

    /// Replaces only the branch filter.
    pub fn update_branch_filter(
        &self,
        id: RepositoryId,
        updater_id: PrincipalId,
        branch_filter: impl Into<String>,
    ) -> RepoResult<Repository> {
        let patch = RepositoryPatch::new(id, updater_id).with_branch_filter(branch_filter);
        self.store.patch_repository(&patch)
    }

    /// Replaces only the base directory.
    pub fn update_base_directory(
        &self,
        id: RepositoryId,
        updater_id: PrincipalId,
        base_directory: impl Into<String>,
    ) -> RepoResult<Repository> {
        let patch = RepositoryPatch::new(id, updater_id).with_base_directory(base_directory);
        self.store.patch_repository(&patch)
    }

    /// Permanently unlinks a repository.
    pub fn delete(&self, id: RepositoryId) -> RepoResult<()> {
        self.store.delete_repository(&RepositoryDelete { id })
    }
}
