//! Employee use-case service.
//!
//! # Responsibility
//! - Provide create/edit/get/list entry points for employees.
//! - Expose removal only through the guarded unassign-then-delete procedure.

use log::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::model::employee::{Employee, EmployeeId};
use crate::repo::employee_repo::EmployeeRepository;
use crate::repo::RepoError;
use crate::view::EmployeePayload;

/// Outcome of a guarded employee removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeRemoval {
    pub employee_id: EmployeeId,
    /// Equipment rows whose assignment was cleared, deleted rows included.
    pub unassigned_count: usize,
}

/// Employee service facade over repository implementations.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_employee(&self, employee: &Employee) -> ServiceResult<Employee> {
        let id = self.repo.create_employee(employee).map_err(|err| {
            warn!("event=employee_create module=service status=error error={err}");
            err
        })?;
        info!("event=employee_create module=service status=ok employee_id={id}");
        self.repo
            .get_employee(id)?
            .ok_or(ServiceError::InconsistentState(
                "created employee not found in read-back",
            ))
    }

    pub fn create_from_payload(&self, payload: EmployeePayload) -> ServiceResult<Employee> {
        let employee = payload.into_employee().map_err(RepoError::from)?;
        self.create_employee(&employee)
    }

    pub fn update_from_payload(
        &self,
        id: EmployeeId,
        payload: EmployeePayload,
    ) -> ServiceResult<Employee> {
        let mut employee = self
            .repo
            .get_employee(id)?
            .ok_or_else(|| RepoError::employee_not_found(id))?;
        payload.apply_to(&mut employee).map_err(RepoError::from)?;
        self.repo.update_employee(&employee)?;
        info!("event=employee_update module=service status=ok employee_id={id}");
        Ok(employee)
    }

    pub fn get_employee(&self, id: EmployeeId) -> ServiceResult<Option<Employee>> {
        Ok(self.repo.get_employee(id)?)
    }

    pub fn list_employees(&self) -> ServiceResult<Vec<Employee>> {
        Ok(self.repo.list_employees()?)
    }

    /// Unassigns every dependent equipment row and deletes the employee as
    /// one atomic operation.
    pub fn remove_employee(&self, id: EmployeeId) -> ServiceResult<EmployeeRemoval> {
        let unassigned_count = self.repo.remove_employee_unassigning(id)?;
        info!(
            "event=employee_remove module=service status=ok employee_id={id} unassigned_count={unassigned_count}"
        );
        Ok(EmployeeRemoval {
            employee_id: id,
            unassigned_count,
        })
    }
}
