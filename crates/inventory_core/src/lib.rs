//! Core domain logic for the equipment inventory.
//! This crate is the single source of truth for record invariants.

pub mod db;
pub mod export;
pub mod fixtures;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use export::{export_csv, export_json, ExportError, ExportFormat, UNASSIGNED_LABEL};
pub use fixtures::{load_fixtures, FixtureSummary};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::employee::{Employee, EmployeeId};
pub use model::equipment::{Equipment, EquipmentId, LifecycleState};
pub use model::validation::{FieldError, ValidationErrors};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::equipment_repo::{EquipmentFilter, EquipmentRepository, SqliteEquipmentRepository};
pub use repo::{RecordKind, RepoError, RepoResult};
pub use service::employee_service::{EmployeeRemoval, EmployeeService};
pub use service::equipment_service::{EquipmentService, ExportDocument};
pub use service::{ServiceError, ServiceResult};
pub use view::{
    EmployeeDetailView, EmployeePayload, EmployeeView, EquipmentEntry, EquipmentPayload,
    EquipmentView,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
