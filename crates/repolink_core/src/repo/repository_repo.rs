//! Repository link store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide transactional create/find/patch/delete over the `repo` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every operation runs in its own transaction; early returns drop the
//!   transaction, which rolls it back.
//! - SELECT and RETURNING share `REPOSITORY_COLUMNS`, so decode always sees
//!   the same column set.
//! - Mutations return the row state produced by the mutating statement itself
//!   (`RETURNING`), never a second read.

use crate::db::migrations::latest_version;
use crate::model::repository::{
    Repository, RepositoryCreate, RepositoryDelete, RepositoryFind, RepositoryPatch,
};
use crate::repo::clause::{bind_values, SetClause, WhereClause};
use crate::repo::error::{RepoError, RepoResult};
use log::{debug, warn};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const REPOSITORY_COLUMNS: &str = "id,
    creator_id,
    created_ts,
    updater_id,
    updated_ts,
    vcs_id,
    project_id,
    name,
    full_path,
    web_url,
    base_directory,
    branch_filter,
    external_id,
    webhook_id";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "creator_id",
    "created_ts",
    "updater_id",
    "updated_ts",
    "vcs_id",
    "project_id",
    "name",
    "full_path",
    "web_url",
    "base_directory",
    "branch_filter",
    "external_id",
    "webhook_id",
];

/// Store interface for repository link CRUD operations.
pub trait RepositoryStore {
    /// Inserts one row and returns it as persisted.
    fn create_repository(&self, create: &RepositoryCreate) -> RepoResult<Repository>;
    /// Lists rows matching every supplied predicate. Never `NotFound`.
    fn find_repository_list(&self, find: &RepositoryFind) -> RepoResult<Vec<Repository>>;
    /// Returns the first row matching `find`, or `NotFound`.
    ///
    /// More than one match is tolerated: the first row is returned and a
    /// warning is logged.
    fn find_repository(&self, find: &RepositoryFind) -> RepoResult<Repository>;
    /// Applies a partial update and returns the new row state.
    fn patch_repository(&self, patch: &RepositoryPatch) -> RepoResult<Repository>;
    /// Permanently deletes one row.
    fn delete_repository(&self, delete: &RepositoryDelete) -> RepoResult<()>;
}

/// SQLite-backed repository link store.
pub struct SqliteRepositoryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositoryStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin_read(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Deferred,
        )?)
    }

    fn begin_write(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl RepositoryStore for SqliteRepositoryStore<'_> {
    fn create_repository(&self, create: &RepositoryCreate) -> RepoResult<Repository> {
        create.validate()?;

        let tx = self.begin_write()?;
        let repository = tx.query_row(
            &format!(
                "INSERT INTO repo (
                    creator_id,
                    updater_id,
                    vcs_id,
                    project_id,
                    name,
                    full_path,
                    web_url,
                    base_directory,
                    branch_filter,
                    external_id,
                    webhook_id
                ) VALUES (?1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                RETURNING {REPOSITORY_COLUMNS};"
            ),
            params![
                create.creator_id,
                create.vcs_id,
                create.project_id,
                create.name,
                create.full_path,
                create.web_url,
                create.base_directory,
                create.branch_filter,
                create.external_id,
                create.webhook_id,
            ],
            parse_repository_row,
        )?;
        tx.commit()?;

        debug!(
            "event=repo_create module=repo status=ok id={} project_id={} vcs_id={}",
            repository.id, repository.project_id, repository.vcs_id
        );
        Ok(repository)
    }

    fn find_repository_list(&self, find: &RepositoryFind) -> RepoResult<Vec<Repository>> {
        let tx = self.begin_read()?;
        find_repository_list_in_tx(&tx, find)
    }

    fn find_repository(&self, find: &RepositoryFind) -> RepoResult<Repository> {
        let tx = self.begin_read()?;
        let list = find_repository_list_in_tx(&tx, find)?;

        if list.len() > 1 {
            warn!(
                "event=repo_find module=repo status=warn matched={} expected=1 find={}",
                list.len(),
                find
            );
        }

        list.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(find.clone()))
    }

    fn patch_repository(&self, patch: &RepositoryPatch) -> RepoResult<Repository> {
        let set = SetClause::new()
            .set("updater_id", patch.updater_id)
            .set_expr("updated_ts", "(strftime('%s', 'now'))")
            .set_opt("base_directory", patch.base_directory.clone())
            .set_opt("branch_filter", patch.branch_filter.clone());
        let filter = WhereClause::new().eq("id", patch.id);

        let tx = self.begin_write()?;
        let repository = tx
            .query_row(
                &format!(
                    "UPDATE repo
                     SET {}
                     WHERE {}
                     RETURNING {REPOSITORY_COLUMNS};",
                    set.render(),
                    filter.render()
                ),
                params_from_iter(bind_values(&set, &filter)),
                parse_repository_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::NotFound(RepositoryFind::by_id(patch.id)))?;
        tx.commit()?;

        debug!(
            "event=repo_patch module=repo status=ok id={} updater_id={} base_directory_set={} branch_filter_set={}",
            repository.id,
            repository.updater_id,
            patch.base_directory.is_some(),
            patch.branch_filter.is_some()
        );
        Ok(repository)
    }

    fn delete_repository(&self, delete: &RepositoryDelete) -> RepoResult<()> {
        let tx = self.begin_write()?;
        let changed = tx.execute("DELETE FROM repo WHERE id = ?1;", [delete.id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RepositoryFind::by_id(delete.id)));
        }
        tx.commit()?;

        debug!(
            "event=repo_delete module=repo status=ok id={} affected={}",
            delete.id, changed
        );
        Ok(())
    }
}

fn find_repository_list_in_tx(
    tx: &Transaction<'_>,
    find: &RepositoryFind,
) -> RepoResult<Vec<Repository>> {
    let filter = WhereClause::new()
        .eq_opt("id", find.id)
        .eq_opt("project_id", find.project_id)
        .eq_opt("vcs_id", find.vcs_id);

    let mut stmt = tx.prepare(&format!(
        "SELECT {REPOSITORY_COLUMNS}
         FROM repo
         WHERE {}
         ORDER BY id ASC;",
        filter.render()
    ))?;
    let mut rows = stmt.query(params_from_iter(filter.values()))?;

    let mut list = Vec::new();
    while let Some(row) = rows.next()? {
        list.push(parse_repository_row(row)?);
    }
    Ok(list)
}

fn parse_repository_row(row: &Row<'_>) -> rusqlite::Result<Repository> {
    Ok(Repository {
        id: row.get("id")?,
        creator_id: row.get("creator_id")?,
        created_ts: row.get("created_ts")?,
        updater_id: row.get("updater_id")?,
        updated_ts: row.get("updated_ts")?,
        vcs_id: row.get("vcs_id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        full_path: row.get("full_path")?,
        web_url: row.get("web_url")?,
        base_directory: row.get("base_directory")?,
        branch_filter: row.get("branch_filter")?,
        external_id: row.get("external_id")?,
        webhook_id: row.get("webhook_id")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "repo")? {
        return Err(RepoError::MissingRequiredTable("repo"));
    }

    for &column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "repo", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "repo",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
