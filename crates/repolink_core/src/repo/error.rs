//! Repository store errors and storage error classification.
//!
//! # Responsibility
//! - Define the semantic error surface of the persistence gateway.
//! - Map low-level SQLite failures to domain error kinds in one place.
//!
//! # Invariants
//! - Every `rusqlite::Error` reaching a caller went through
//!   `classify_sqlite_error` exactly once (via `From`).
//! - `NotFound` always carries the predicate that matched nothing.

use crate::db::DbError;
use crate::model::reference::ReferenceValidationError;
use crate::model::repository::{RepositoryFind, RepositoryValidationError};
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse error classification for callers that translate store failures
/// into user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No row matched a point lookup, patch or delete.
    NotFound,
    /// A uniqueness constraint rejected the write.
    Conflict,
    /// Request or referential validation failed.
    Invalid,
    /// Transaction, driver, schema or decode failure.
    Internal,
}

/// Error for repository persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Request rejected before any SQL was issued.
    Validation(RepositoryValidationError),
    /// Principal, VCS or project request rejected before any SQL was issued.
    InvalidReference(ReferenceValidationError),
    /// No row matched the predicate.
    NotFound(RepositoryFind),
    /// UNIQUE or PRIMARY KEY violation.
    Conflict(String),
    /// FOREIGN KEY, NOT NULL or CHECK violation.
    Constraint(String),
    /// Transport/bootstrap failure.
    Db(DbError),
    /// Persisted row cannot be decoded into a `Repository`.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) | Self::InvalidReference(_) | Self::Constraint(_) => {
                ErrorKind::Invalid
            }
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid repository: {err}"),
            Self::InvalidReference(err) => write!(f, "invalid reference row: {err}"),
            Self::NotFound(find) => write!(f, "repository not found: {find}"),
            Self::Conflict(message) => write!(f, "repository conflict: {message}"),
            Self::Constraint(message) => {
                write!(f, "repository constraint violated: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted repository data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidReference(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepositoryValidationError> for RepoError {
    fn from(value: RepositoryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReferenceValidationError> for RepoError {
    fn from(value: ReferenceValidationError) -> Self {
        Self::InvalidReference(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => classify_sqlite_error(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        classify_sqlite_error(value)
    }
}

/// Maps a driver error to the store's error surface.
///
/// Constraint failures are split by extended result code and row decode
/// failures become `InvalidData`; everything else is kept as an opaque `Db`
/// error.
pub fn classify_sqlite_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            let detail = message
                .clone()
                .unwrap_or_else(|| failure.to_string());
            return match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    RepoError::Conflict(detail)
                }
                _ => RepoError::Constraint(detail),
            };
        }
    }

    match err {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => RepoError::InvalidData(err.to_string()),
        other => RepoError::Db(DbError::Sqlite(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_sqlite_error, ErrorKind, RepoError};
    use crate::model::repository::RepositoryFind;
    use rusqlite::Connection;

    fn failing_insert(conn: &Connection, sql: &str) -> RepoError {
        let err = conn.execute(sql, []).unwrap_err();
        classify_sqlite_error(err)
    }

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (
                 id INTEGER PRIMARY KEY,
                 parent_id INTEGER NOT NULL REFERENCES parent (id),
                 code TEXT NOT NULL UNIQUE,
                 size INTEGER NOT NULL CHECK (size > 0)
             );
             INSERT INTO parent (id) VALUES (1);
             INSERT INTO child (id, parent_id, code, size) VALUES (1, 1, 'a', 1);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn unique_and_primary_key_violations_are_conflicts() {
        let conn = scratch();
        let unique = failing_insert(
            &conn,
            "INSERT INTO child (id, parent_id, code, size) VALUES (2, 1, 'a', 1)",
        );
        assert!(matches!(unique, RepoError::Conflict(ref msg) if msg.contains("child.code")));
        assert_eq!(unique.kind(), ErrorKind::Conflict);

        let primary = failing_insert(
            &conn,
            "INSERT INTO child (id, parent_id, code, size) VALUES (1, 1, 'b', 1)",
        );
        assert_eq!(primary.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn referential_and_check_violations_are_invalid() {
        let conn = scratch();
        let foreign = failing_insert(
            &conn,
            "INSERT INTO child (id, parent_id, code, size) VALUES (3, 99, 'c', 1)",
        );
        assert!(matches!(foreign, RepoError::Constraint(_)));
        assert_eq!(foreign.kind(), ErrorKind::Invalid);

        let check = failing_insert(
            &conn,
            "INSERT INTO child (id, parent_id, code, size) VALUES (4, 1, 'd', 0)",
        );
        assert_eq!(check.kind(), ErrorKind::Invalid);

        let not_null = failing_insert(
            &conn,
            "INSERT INTO child (id, parent_id, code, size) VALUES (5, 1, NULL, 1)",
        );
        assert_eq!(not_null.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn other_driver_errors_are_internal() {
        let conn = scratch();
        let err = failing_insert(&conn, "INSERT INTO missing_table (id) VALUES (1)");
        assert!(matches!(err, RepoError::Db(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn decode_failures_are_invalid_data() {
        let conn = scratch();
        let err = conn
            .query_row("SELECT code FROM child WHERE id = 1", [], |row| {
                row.get::<_, i64>(0)
            })
            .unwrap_err();
        let err = classify_sqlite_error(err);
        assert!(matches!(err, RepoError::InvalidData(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn not_found_message_carries_predicate() {
        let err = RepoError::NotFound(RepositoryFind::by_id(9));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "repository not found: {id=9}");
    }
}
