//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep API/CLI layers decoupled from storage details.
//! - Emit one structured log event per mutation.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::export::ExportError;
use crate::repo::RepoError;

pub mod employee_service;
pub mod equipment_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for inventory use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence-layer outcome (validation, conflict, not found, ...).
    Repo(RepoError),
    /// Rendering of an export failed.
    Export(ExportError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl ServiceError {
    /// Returns the repository error when this failure came from the store.
    pub fn as_repo(&self) -> Option<&RepoError> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ExportError> for ServiceError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}
