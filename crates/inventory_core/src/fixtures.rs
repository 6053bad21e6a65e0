//! Demo data for local databases.
//!
//! Seeds five employees and five equipment items, alternating between the
//! `Ordinateur` and `Téléphone` categories and assigned round-robin.

use chrono::{Months, Utc};
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

use crate::model::employee::{Employee, EmployeeId};
use crate::model::equipment::{Equipment, EquipmentId};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::equipment_repo::{EquipmentRepository, SqliteEquipmentRepository};
use crate::repo::RepoResult;

const FIXTURE_EMPLOYEES: usize = 5;
const FIXTURE_EQUIPMENT: usize = 5;

/// Ids created by `load_fixtures`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSummary {
    pub employee_ids: Vec<EmployeeId>,
    pub equipment_ids: Vec<EquipmentId>,
}

/// Inserts the demo employees and equipment.
///
/// Fails with `Conflict` when run twice on the same store, since fixture
/// employee emails are fixed.
pub fn load_fixtures(conn: &Connection) -> RepoResult<FixtureSummary> {
    let employees = SqliteEmployeeRepository::try_new(conn)?;
    let equipment_repo = SqliteEquipmentRepository::try_new(conn)?;
    let today = Utc::now().date_naive();
    let mut summary = FixtureSummary::default();

    for i in 0..FIXTURE_EMPLOYEES {
        let years_back = u32::try_from(i + 1).unwrap_or(1);
        let hired_at = today
            .checked_sub_months(Months::new(12 * years_back))
            .unwrap_or(today);
        let employee = Employee::new(
            format!("Employe{i}"),
            format!("Nom{i}"),
            format!("employe{i}@example.com"),
            hired_at,
        );
        summary.employee_ids.push(employees.create_employee(&employee)?);
    }

    for i in 0..FIXTURE_EQUIPMENT {
        let mut equipment = Equipment::new(format!("SN-{}", Uuid::new_v4()));
        equipment.name = Some(format!("Article {i}"));
        equipment.category = Some(if i % 2 == 0 { "Ordinateur" } else { "Téléphone" }.to_string());
        equipment.description = format!("Description de l'article {i}");
        equipment.employee_id = summary
            .employee_ids
            .get(i % summary.employee_ids.len().max(1))
            .copied();
        summary
            .equipment_ids
            .push(equipment_repo.create_equipment(&equipment)?);
    }

    info!(
        "event=fixtures_load module=fixtures status=ok employee_count={} equipment_count={}",
        summary.employee_ids.len(),
        summary.equipment_ids.len()
    );
    Ok(summary)
}
