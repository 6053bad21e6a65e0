//! Employee domain model.
//!
//! # Responsibility
//! - Define the plain record for people that equipment can be assigned to.
//!
//! # Invariants
//! - `id` is assigned once at construction and never changes.
//! - `email` is unique across employees; the store enforces it at write time.
//! - The equipment back-reference is derived by query, never stored here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{FieldError, ValidationErrors};

/// Stable identifier for employees.
pub type EmployeeId = Uuid;

/// Person that equipment can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Calendar hire date. Must not be later than today.
    pub hired_at: NaiveDate,
}

impl Employee {
    /// Creates an employee with a generated stable ID.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        hired_at: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            hired_at,
        }
    }

    /// Creates an employee with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: EmployeeId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        hired_at: NaiveDate,
    ) -> Result<Self, ValidationErrors> {
        if id.is_nil() {
            return Err(ValidationErrors::single(FieldError::new(
                "id",
                "L'identifiant ne peut pas être nul.",
            )));
        }
        let mut employee = Self::new(first_name, last_name, email, hired_at);
        employee.id = id;
        Ok(employee)
    }

    /// Display label used by listings and CSV export.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
