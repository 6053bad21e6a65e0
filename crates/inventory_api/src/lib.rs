//! Inventory JSON API crate.

pub mod api;

pub use api::{
    employee_create, employee_index, employee_remove, employee_update, equipment_assign,
    equipment_categories, equipment_create, equipment_delete, equipment_export, equipment_index,
    equipment_restore, equipment_show, equipment_unassign, equipment_update, ApiResponse,
    ExportResponse,
};
