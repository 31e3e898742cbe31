//! Registration of principals, VCS links and projects.
//!
//! These rows are foreign-key targets of `repo`; without them no repository
//! link can be created on a fresh database.

use crate::model::reference::{
    Principal, PrincipalCreate, Project, ProjectCreate, Vcs, VcsCreate, VcsType,
};
use crate::repo::error::RepoResult;
use log::debug;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// SQLite-backed writer for reference rows.
pub struct SqliteReferenceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReferenceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn create_principal(&self, create: &PrincipalCreate) -> RepoResult<Principal> {
        create.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let principal = tx.query_row(
            "INSERT INTO principal (name, email)
             VALUES (?1, ?2)
             RETURNING id, created_ts, name, email;",
            params![create.name, create.email],
            |row| {
                Ok(Principal {
                    id: row.get(0)?,
                    created_ts: row.get(1)?,
                    name: row.get(2)?,
                    email: row.get(3)?,
                })
            },
        )?;
        tx.commit()?;

        debug!(
            "event=principal_create module=repo status=ok id={}",
            principal.id
        );
        Ok(principal)
    }

    pub fn create_vcs(&self, create: &VcsCreate) -> RepoResult<Vcs> {
        create.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let vcs = tx.query_row(
            "INSERT INTO vcs (name, type, instance_url, api_url)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, created_ts, name, type, instance_url, api_url;",
            params![
                create.name,
                create.vcs_type.as_str(),
                create.instance_url,
                create.api_url
            ],
            parse_vcs_row,
        )?;
        tx.commit()?;

        debug!(
            "event=vcs_create module=repo status=ok id={} type={}",
            vcs.id,
            vcs.vcs_type.as_str()
        );
        Ok(vcs)
    }

    pub fn create_project(&self, create: &ProjectCreate) -> RepoResult<Project> {
        create.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let project = tx.query_row(
            "INSERT INTO project (name, key)
             VALUES (?1, ?2)
             RETURNING id, created_ts, name, key;",
            params![create.name, create.key],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    created_ts: row.get(1)?,
                    name: row.get(2)?,
                    key: row.get(3)?,
                })
            },
        )?;
        tx.commit()?;

        debug!("event=project_create module=repo status=ok id={}", project.id);
        Ok(project)
    }
}

fn parse_vcs_row(row: &Row<'_>) -> rusqlite::Result<Vcs> {
    let raw_type: String = row.get(3)?;
    let vcs_type = VcsType::parse(&raw_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown vcs type `{raw_type}`").into(),
        )
    })?;

    Ok(Vcs {
        id: row.get(0)?,
        created_ts: row.get(1)?,
        name: row.get(2)?,
        vcs_type,
        instance_url: row.get(4)?,
        api_url: row.get(5)?,
    })
}
