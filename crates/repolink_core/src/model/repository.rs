//! Repository link domain model.
//!
//! # Responsibility
//! - Define the `Repository` record: one project's link to a VCS-hosted
//!   repository, plus its audit columns.
//! - Define the request shapes accepted by the persistence gateway.
//!
//! # Invariants
//! - `id` is assigned by the store and never reassigned.
//! - `creator_id == updater_id` right after creation.
//! - A patch only touches fields that are `Some`; `updater_id` is always set.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned repository identifier.
pub type RepositoryId = i64;
/// Identifier of the acting principal recorded in audit columns.
pub type PrincipalId = i64;
/// Identifier of the external VCS link.
pub type VcsId = i64;
/// Identifier of the owning project.
pub type ProjectId = i64;

/// Full snapshot of one persisted repository row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: RepositoryId,

    pub creator_id: PrincipalId,
    /// Unix epoch seconds.
    pub created_ts: i64,
    pub updater_id: PrincipalId,
    /// Unix epoch seconds, refreshed by every patch.
    pub updated_ts: i64,

    pub vcs_id: VcsId,
    pub project_id: ProjectId,
    /// Repository display name, e.g. `repo-a`.
    pub name: String,
    /// Canonical path inside the VCS, e.g. `org/repo-a`.
    pub full_path: String,
    #[serde(rename = "webURL")]
    pub web_url: String,
    /// Directory inside the repository that holds tracked files.
    pub base_directory: String,
    /// Branch name (or glob) whose pushes are observed.
    pub branch_filter: String,
    /// Repository id in the external VCS.
    pub external_id: String,
    /// Webhook id registered in the external VCS.
    pub webhook_id: String,
}

/// Request model for linking a new repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCreate {
    /// Written to both `creator_id` and `updater_id`.
    pub creator_id: PrincipalId,
    pub vcs_id: VcsId,
    pub project_id: ProjectId,
    pub name: String,
    pub full_path: String,
    #[serde(rename = "webURL")]
    pub web_url: String,
    pub base_directory: String,
    pub branch_filter: String,
    pub external_id: String,
    pub webhook_id: String,
}

impl RepositoryCreate {
    /// Validates request-level invariants before any SQL is issued.
    ///
    /// `base_directory` and `branch_filter` may be empty: an empty base
    /// directory means the repository root and an empty filter matches every
    /// branch.
    pub fn validate(&self) -> Result<(), RepositoryValidationError> {
        for (field, value) in [
            ("creator_id", self.creator_id),
            ("vcs_id", self.vcs_id),
            ("project_id", self.project_id),
        ] {
            if value <= 0 {
                return Err(RepositoryValidationError::NonPositiveId { field, value });
            }
        }

        for (field, value) in [
            ("name", &self.name),
            ("full_path", &self.full_path),
            ("web_url", &self.web_url),
            ("external_id", &self.external_id),
            ("webhook_id", &self.webhook_id),
        ] {
            if value.trim().is_empty() {
                return Err(RepositoryValidationError::BlankField(field));
            }
        }

        Ok(())
    }
}

/// Conjunctive lookup predicates; `None` fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFind {
    pub id: Option<RepositoryId>,
    pub project_id: Option<ProjectId>,
    pub vcs_id: Option<VcsId>,
}

impl RepositoryFind {
    /// Lookup by primary key.
    pub fn by_id(id: RepositoryId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Lookup by owning project.
    pub fn by_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Lookup by VCS link.
    pub fn by_vcs(vcs_id: VcsId) -> Self {
        Self {
            vcs_id: Some(vcs_id),
            ..Self::default()
        }
    }

    /// Returns whether no predicate is set (full scan).
    pub fn is_unfiltered(&self) -> bool {
        self.id.is_none() && self.project_id.is_none() && self.vcs_id.is_none()
    }
}

impl Display for RepositoryFind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_unfiltered() {
            return write!(f, "{{}}");
        }

        let parts = [
            ("id", self.id),
            ("project_id", self.project_id),
            ("vcs_id", self.vcs_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| format!("{name}={value}")))
        .collect::<Vec<_>>();
        write!(f, "{{{}}}", parts.join(" "))
    }
}

/// Partial update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPatch {
    pub id: RepositoryId,
    /// Always written.
    pub updater_id: PrincipalId,
    pub base_directory: Option<String>,
    pub branch_filter: Option<String>,
}

impl RepositoryPatch {
    /// Creates a patch that only records the updater.
    pub fn new(id: RepositoryId, updater_id: PrincipalId) -> Self {
        Self {
            id,
            updater_id,
            base_directory: None,
            branch_filter: None,
        }
    }

    pub fn with_base_directory(mut self, base_directory: impl Into<String>) -> Self {
        self.base_directory = Some(base_directory.into());
        self
    }

    pub fn with_branch_filter(mut self, branch_filter: impl Into<String>) -> Self {
        self.branch_filter = Some(branch_filter.into());
        self
    }
}

/// Hard delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDelete {
    pub id: RepositoryId,
}

/// Validation failures raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryValidationError {
    /// A required text field is empty after trimming.
    BlankField(&'static str),
    /// A foreign id is zero or negative.
    NonPositiveId { field: &'static str, value: i64 },
}

impl Display for RepositoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NonPositiveId { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
        }
    }
}

impl Error for RepositoryValidationError {}
