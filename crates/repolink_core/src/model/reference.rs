//! Rows a repository link points at: principals, VCS links and projects.
//!
//! # Invariants
//! - `principal.email` and `project.key` are unique.
//! - Reference rows are only ever inserted here; the gateway never mutates them.

use crate::model::repository::{PrincipalId, ProjectId, VcsId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Persisted actor usable as `creator_id` / `updater_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: PrincipalId,
    pub created_ts: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalCreate {
    pub name: String,
    pub email: String,
}

/// Hosting flavour of a VCS link. Stored as its upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VcsType {
    GitlabSelfHost,
    GithubCom,
}

impl VcsType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitlabSelfHost => "GITLAB_SELF_HOST",
            Self::GithubCom => "GITHUB_COM",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GITLAB_SELF_HOST" => Some(Self::GitlabSelfHost),
            "GITHUB_COM" => Some(Self::GithubCom),
            _ => None,
        }
    }
}

/// Persisted external VCS link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vcs {
    pub id: VcsId,
    pub created_ts: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub vcs_type: VcsType,
    pub instance_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsCreate {
    pub name: String,
    pub vcs_type: VcsType,
    pub instance_url: String,
    pub api_url: String,
}

/// Persisted project; owns at most one repository link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub created_ts: i64,
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    pub key: String,
}

impl PrincipalCreate {
    pub fn validate(&self) -> Result<(), ReferenceValidationError> {
        require_text(&[("name", &self.name), ("email", &self.email)])
    }
}

impl VcsCreate {
    pub fn validate(&self) -> Result<(), ReferenceValidationError> {
        require_text(&[
            ("name", &self.name),
            ("instance_url", &self.instance_url),
            ("api_url", &self.api_url),
        ])
    }
}

impl ProjectCreate {
    pub fn validate(&self) -> Result<(), ReferenceValidationError> {
        require_text(&[("name", &self.name), ("key", &self.key)])
    }
}

fn require_text(fields: &[(&'static str, &String)]) -> Result<(), ReferenceValidationError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(ReferenceValidationError::BlankField(*field)),
        None => Ok(()),
    }
}

/// Validation failures raised before a reference row is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceValidationError {
    BlankField(&'static str),
}

impl Display for ReferenceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
        }
    }
}

impl Error for ReferenceValidationError {}

#[cfg(test)]
mod tests {
    use super::{PrincipalCreate, ProjectCreate, ReferenceValidationError, VcsType};

    #[test]
    fn vcs_type_parses_only_stored_names() {
        for vcs_type in [VcsType::GitlabSelfHost, VcsType::GithubCom] {
            assert_eq!(VcsType::parse(vcs_type.as_str()), Some(vcs_type));
        }
        assert_eq!(VcsType::parse("BITBUCKET"), None);
    }

    #[test]
    fn blank_fields_are_rejected_in_declaration_order() {
        let principal = PrincipalCreate {
            name: " ".to_string(),
            email: String::new(),
        };
        assert_eq!(
            principal.validate(),
            Err(ReferenceValidationError::BlankField("name"))
        );

        let project = ProjectCreate {
            name: "Project A".to_string(),
            key: "PA".to_string(),
        };
        assert_eq!(project.validate(), Ok(()));
    }
}
