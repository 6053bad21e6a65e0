//! Equipment use-case service.
//!
//! # Responsibility
//! - Provide create/edit/list/lifecycle/assignment entry points for callers.
//! - Produce CSV/JSON exports of a filtered active listing.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Exports render exactly the rows `list_active_entries` returns.

use log::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::export::ExportFormat;
use crate::model::employee::EmployeeId;
use crate::model::equipment::{Equipment, EquipmentId};
use crate::repo::equipment_repo::{EquipmentFilter, EquipmentRepository};
use crate::repo::RepoError;
use crate::view::{EquipmentEntry, EquipmentPayload};

/// Rendered export ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub format: ExportFormat,
    pub record_count: usize,
    pub bytes: Vec<u8>,
}

/// Equipment service facade over repository implementations.
pub struct EquipmentService<R: EquipmentRepository> {
    repo: R,
}

impl<R: EquipmentRepository> EquipmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists new equipment and returns it joined with its employee.
    pub fn create_equipment(&self, equipment: &Equipment) -> ServiceResult<EquipmentEntry> {
        let id = self.repo.create_equipment(equipment).map_err(|err| {
            warn!("event=equipment_create module=service status=error error={err}");
            err
        })?;
        info!("event=equipment_create module=service status=ok equipment_id={id}");
        self.read_back(id, "created equipment not found in read-back")
    }

    /// Creates equipment from a write payload.
    pub fn create_from_payload(&self, payload: EquipmentPayload) -> ServiceResult<EquipmentEntry> {
        self.create_equipment(&payload.into_equipment())
    }

    /// Overwrites the writable fields of existing equipment.
    ///
    /// Lifecycle state and `created_at` are left untouched.
    pub fn update_from_payload(
        &self,
        id: EquipmentId,
        payload: EquipmentPayload,
    ) -> ServiceResult<EquipmentEntry> {
        let mut equipment = self
            .repo
            .get_equipment(id)?
            .ok_or_else(|| RepoError::equipment_not_found(id))?;
        payload.apply_to(&mut equipment);
        self.repo.update_equipment(&equipment)?;
        info!("event=equipment_update module=service status=ok equipment_id={id}");
        self.read_back(id, "updated equipment not found in read-back")
    }

    /// Gets one record by id, deleted rows included.
    pub fn get_equipment(&self, id: EquipmentId) -> ServiceResult<Option<EquipmentEntry>> {
        Ok(self.repo.get_equipment_entry(id)?)
    }

    pub fn list_active(&self, filter: &EquipmentFilter) -> ServiceResult<Vec<Equipment>> {
        Ok(self.repo.list_active(filter)?)
    }

    pub fn list_active_entries(
        &self,
        filter: &EquipmentFilter,
    ) -> ServiceResult<Vec<EquipmentEntry>> {
        Ok(self.repo.list_active_entries(filter)?)
    }

    pub fn unique_categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.repo.unique_categories()?)
    }

    /// Active equipment currently assigned to `employee_id`.
    pub fn equipment_for_employee(&self, employee_id: EmployeeId) -> ServiceResult<Vec<Equipment>> {
        Ok(self.repo.list_active(&EquipmentFilter::by_employee(employee_id))?)
    }

    pub fn soft_delete(&self, id: EquipmentId) -> ServiceResult<Equipment> {
        let equipment = self.repo.soft_delete_equipment(id)?;
        info!("event=equipment_soft_delete module=service status=ok equipment_id={id}");
        Ok(equipment)
    }

    pub fn restore(&self, id: EquipmentId) -> ServiceResult<Equipment> {
        let equipment = self.repo.restore_equipment(id)?;
        info!("event=equipment_restore module=service status=ok equipment_id={id}");
        Ok(equipment)
    }

    /// Assigns equipment to an employee, replacing any prior assignment.
    pub fn assign(&self, id: EquipmentId, employee_id: EmployeeId) -> ServiceResult<Equipment> {
        let equipment = self.repo.assign_equipment(id, employee_id)?;
        info!(
            "event=equipment_assign module=service status=ok equipment_id={id} employee_id={employee_id}"
        );
        Ok(equipment)
    }

    pub fn unassign(&self, id: EquipmentId) -> ServiceResult<Equipment> {
        let equipment = self.repo.unassign_equipment(id)?;
        info!("event=equipment_unassign module=service status=ok equipment_id={id}");
        Ok(equipment)
    }

    /// Exports the active listing selected by `filter`.
    pub fn export(
        &self,
        format: ExportFormat,
        filter: &EquipmentFilter,
    ) -> ServiceResult<ExportDocument> {
        let entries = self.repo.list_active_entries(filter)?;
        let bytes = format.render(&entries)?;
        info!(
            "event=equipment_export module=service status=ok format={:?} record_count={} bytes={}",
            format,
            entries.len(),
            bytes.len()
        );
        Ok(ExportDocument {
            format,
            record_count: entries.len(),
            bytes,
        })
    }

    fn read_back(&self, id: EquipmentId, details: &'static str) -> ServiceResult<EquipmentEntry> {
        self.repo
            .get_equipment_entry(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
