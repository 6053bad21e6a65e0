//! Record store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for employees/equipment.
//! - Isolate SQLite query details from service orchestration.
//! - Translate store constraint failures into typed outcomes.
//!
//! # Invariants
//! - Repository writes run validation before any SQL mutation.
//! - Every multi-statement write runs inside one immediate transaction.
//! - The store is the only arbiter of `email`/`number` uniqueness.

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rusqlite::{ffi, Connection};
use uuid::Uuid;

use crate::db::DbError;
use crate::model::employee::EmployeeId;
use crate::model::validation::ValidationErrors;

pub mod employee_repo;
pub mod equipment_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record family named by `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Employee,
    Equipment,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Employee => write!(f, "employee"),
            Self::Equipment => write!(f, "equipment"),
        }
    }
}

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Write rejected before reaching the store.
    Validation(ValidationErrors),
    /// Unique constraint violation; the write was rolled back.
    Conflict { field: &'static str, value: String },
    /// Referenced identifier does not resolve.
    NotFound { kind: RecordKind, id: Uuid },
    /// Employee removal attempted while equipment still references it.
    ReferentialIntegrity {
        employee_id: EmployeeId,
        dependents: usize,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
    Db(DbError),
}

impl RepoError {
    pub fn employee_not_found(id: EmployeeId) -> Self {
        Self::NotFound {
            kind: RecordKind::Employee,
            id,
        }
    }

    pub fn equipment_not_found(id: Uuid) -> Self {
        Self::NotFound {
            kind: RecordKind::Equipment,
            id,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { field, value } => {
                write!(f, "{field} `{value}` is already in use")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::ReferentialIntegrity {
                employee_id,
                dependents,
            } => write!(
                f,
                "employee {employee_id} still has {dependents} assigned equipment record(s)"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Constraint family reported by a failed SQLite write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConstraintViolation {
    /// Unique or primary key failure on `table.column`.
    Unique(String),
    ForeignKey,
}

/// Classifies a write failure using SQLite extended result codes.
pub(crate) fn constraint_violation(err: &rusqlite::Error) -> Option<ConstraintViolation> {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return None;
    };

    match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            // Message shape: "UNIQUE constraint failed: equipment.number"
            let target = message
                .as_deref()
                .and_then(|text| text.rsplit(": ").next())
                .unwrap_or_default()
                .trim()
                .to_string();
            Some(ConstraintViolation::Unique(target))
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintViolation::ForeignKey),
        _ => None,
    }
}

pub(crate) fn timestamp_to_db(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn timestamp_from_db(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
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
