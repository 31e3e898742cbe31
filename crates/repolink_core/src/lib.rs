//! Core persistence for project/VCS repository links.
//! This crate is the single source of truth for repository link invariants.

pub mod config;
pub mod db;
pub mod inbox;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod template;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::reference::{
    Principal, PrincipalCreate, Project, ProjectCreate, ReferenceValidationError, Vcs, VcsCreate,
    VcsType,
};
pub use model::repository::{
    PrincipalId, ProjectId, Repository, RepositoryCreate, RepositoryDelete, RepositoryFind,
    RepositoryId, RepositoryPatch, RepositoryValidationError, VcsId,
};
pub use repo::error::{classify_sqlite_error, ErrorKind, RepoError, RepoResult};
pub use repo::reference_repo::SqliteReferenceStore;
pub use repo::repository_repo::{RepositoryStore, SqliteRepositoryStore};
pub use service::repository_service::RepositoryService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
