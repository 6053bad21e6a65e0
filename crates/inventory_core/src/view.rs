//! Read and write projections for external callers.
//!
//! # Responsibility
//! - Choose which fields are exposed when reading equipment/employees.
//! - Choose which fields are accepted when writing them.
//!
//! # Invariants
//! - Write payloads never carry timestamps or lifecycle state.
//! - Timestamps render as `YYYY-MM-DD HH:MM:SS` (UTC) or `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::employee::{Employee, EmployeeId};
use crate::model::equipment::Equipment;
use crate::model::validation::{FieldError, ValidationErrors};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Equipment joined with its assigned employee, as listed for display/export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentEntry {
    pub equipment: Equipment,
    pub employee: Option<Employee>,
}

/// Employee fields exposed when nested in an equipment read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Employee> for EmployeeView {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.to_string(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
        }
    }
}

/// Equipment read projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentView {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub number: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
    pub employee: Option<EmployeeView>,
}

impl From<&EquipmentEntry> for EquipmentView {
    fn from(entry: &EquipmentEntry) -> Self {
        let equipment = &entry.equipment;
        Self {
            id: equipment.id.to_string(),
            name: equipment.name.clone(),
            category: equipment.category.clone(),
            number: equipment.number.clone(),
            description: equipment.description.clone(),
            created_at: format_timestamp(equipment.created_at),
            updated_at: equipment.updated_at.map(format_timestamp),
            deleted_at: equipment.deleted_at().map(format_timestamp),
            employee: entry.employee.as_ref().map(EmployeeView::from),
        }
    }
}

/// Employee read projection for employee listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetailView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub hired_at: String,
}

impl From<&Employee> for EmployeeDetailView {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.to_string(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            hired_at: employee.hired_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Reference to an existing employee inside a write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EmployeeRef {
    pub id: EmployeeId,
}

/// Accepted fields when creating or editing equipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub employee: Option<EmployeeRef>,
}

impl EquipmentPayload {
    /// Builds new active equipment. The employee reference is resolved by the
    /// caller, so only its id is copied here.
    pub fn into_equipment(self) -> Equipment {
        let mut equipment = Equipment::new(String::new());
        self.apply_to(&mut equipment);
        equipment
    }

    /// Overwrites the writable fields of `equipment`.
    pub fn apply_to(self, equipment: &mut Equipment) {
        equipment.name = normalize_optional(self.name);
        equipment.category = normalize_optional(self.category);
        equipment.number = trimmed(self.number);
        equipment.set_description(self.description);
        equipment.employee_id = self.employee.map(|reference| reference.id);
    }
}

/// Accepted fields when creating or editing an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hired_at: Option<NaiveDate>,
}

impl EmployeePayload {
    /// Builds a new employee; a missing hire date is a validation error.
    pub fn into_employee(self) -> Result<Employee, ValidationErrors> {
        let hired_at = self.hired_at.ok_or_else(missing_hire_date)?;
        Ok(Employee::new(
            trimmed(self.first_name),
            trimmed(self.last_name),
            trimmed(self.email),
            hired_at,
        ))
    }

    /// Overwrites the writable fields of `employee`, keeping its id.
    pub fn apply_to(self, employee: &mut Employee) -> Result<(), ValidationErrors> {
        let hired_at = self.hired_at.ok_or_else(missing_hire_date)?;
        employee.first_name = trimmed(self.first_name);
        employee.last_name = trimmed(self.last_name);
        employee.email = trimmed(self.email);
        employee.hired_at = hired_at;
        Ok(())
    }
}

/// Formats a timestamp the way listings and exports render it.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Renders a UUID in canonical hyphenated form.
pub fn format_id(id: Uuid) -> String {
    id.hyphenated().to_string()
}

fn missing_hire_date() -> ValidationErrors {
    ValidationErrors::single(FieldError::new(
        "hiredAt",
        "La date d'embauche est obligatoire.",
    ))
}

/// Absent and `null` text fields become empty so validation reports them.
fn trimmed(value: Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
