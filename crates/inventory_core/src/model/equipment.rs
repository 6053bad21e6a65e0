//! Equipment domain model and soft-delete lifecycle.
//!
//! # Responsibility
//! - Define the plain record for tracked office equipment.
//! - Own the `Active <-> Deleted` lifecycle transitions.
//!
//! # Invariants
//! - `number` is unique among all equipment, deleted rows included.
//! - `created_at` is set once by the constructor.
//! - `LifecycleState::Deleted` rows are hidden from default listings but stay
//!   addressable by id.
//! - Lifecycle and assignment mutations refresh `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::current_timestamp;
use super::employee::EmployeeId;

/// Stable identifier for equipment.
pub type EquipmentId = Uuid;

/// Soft-delete state of an equipment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LifecycleState {
    /// Visible in default listings.
    #[default]
    Active,
    /// Tombstoned at `at`; restorable.
    Deleted { at: DateTime<Utc> },
}

impl LifecycleState {
    /// Nullable timestamp projection used by storage and exports.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(*at),
        }
    }

    /// Rebuilds the state from its nullable timestamp projection.
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => Self::Deleted { at },
            None => Self::Active,
        }
    }
}

/// Tracked office equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: Option<String>,
    /// Free-form facet used by list filters.
    pub category: Option<String>,
    /// Business identifier, unique across all equipment.
    pub number: String,
    /// Never null; absent input is stored as the empty string.
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub state: LifecycleState,
    /// Nullable owning reference to the assigned employee.
    pub employee_id: Option<EmployeeId>,
}

impl Equipment {
    /// Creates active, unassigned equipment with a generated stable ID.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            category: None,
            number: number.into(),
            description: String::new(),
            created_at: current_timestamp(),
            updated_at: None,
            state: LifecycleState::Active,
            employee_id: None,
        }
    }

    /// Sets the description, mapping `None` to the empty string.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description.unwrap_or_default();
    }

    /// Deletion timestamp, `None` while active.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.state.deleted_at()
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.state, LifecycleState::Deleted { .. })
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted()
    }

    /// Moves to `Deleted` at the current time.
    ///
    /// Calling it on an already deleted record overwrites the timestamp.
    pub fn soft_delete(&mut self) {
        let now = current_timestamp();
        self.state = LifecycleState::Deleted { at: now };
        self.updated_at = Some(now);
    }

    /// Moves back to `Active`. No-op on the lifecycle when already active.
    pub fn restore(&mut self) {
        self.state = LifecycleState::Active;
        self.touch();
    }

    /// Points the owning reference at `employee_id`, replacing any prior one.
    pub fn assign_to(&mut self, employee_id: EmployeeId) {
        self.employee_id = Some(employee_id);
        self.touch();
    }

    pub fn unassign(&mut self) {
        self.employee_id = None;
        self.touch();
    }

    /// Refreshes `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = Some(current_timestamp());
    }
}
