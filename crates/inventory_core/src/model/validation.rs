//! Field validation for employee and equipment records.
//!
//! # Responsibility
//! - Check write-time invariants separately from storage and serialization.
//! - Report every failing field at once as `field -> message` pairs.
//!
//! # Invariants
//! - Validation is pure; uniqueness is left to the store.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::employee::Employee;
use super::equipment::Equipment;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("valid email regex")
});

/// One failing field and its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Ordered set of field errors for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns whether `field` has at least one error.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Projects errors to `field -> message`; the first message per field wins.
    pub fn field_messages(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field)
                .or_insert_with(|| error.message.clone());
        }
        map
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl Error for ValidationErrors {}

/// Validates an employee against `today` for the hire-date bound.
pub fn validate_employee(employee: &Employee, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if employee.first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", "Le prénom est obligatoire."));
    }
    if employee.last_name.trim().is_empty() {
        errors.push(FieldError::new(
            "lastName",
            "Le nom de famille est obligatoire.",
        ));
    }

    let email = employee.email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "L'email est obligatoire."));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new(
            "email",
            "Le format de l'email est invalide.",
        ));
    }

    if employee.hired_at > today {
        errors.push(FieldError::new(
            "hiredAt",
            "La date d'embauche ne peut pas être dans le futur.",
        ));
    }

    errors.into_result()
}

/// Validates equipment fields that do not depend on other rows.
pub fn validate_equipment(equipment: &Equipment) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if equipment.number.trim().is_empty() {
        errors.push(FieldError::new(
            "number",
            "Le numéro d'équipement est obligatoire.",
        ));
    }
    if equipment.id.is_nil() {
        errors.push(FieldError::new("id", "L'identifiant ne peut pas être nul."));
    }

    errors.into_result()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
