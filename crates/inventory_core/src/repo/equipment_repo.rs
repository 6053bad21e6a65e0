//! Equipment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `equipment` table.
//! - Build the soft-delete-aware, filterable active listing.
//! - Apply lifecycle and assignment transitions atomically.
//!
//! # Invariants
//! - Active listings always apply `deleted_at IS NULL` before any filter.
//! - Supplied filters combine with AND.
//! - Active listings are ordered by `created_at ASC, id ASC`.
//! - `created_at` is written once on insert; updates never rewrite it.
//! - Every update refreshes `updated_at`.
//! - `number` is stored trimmed and is unique ignoring ASCII case, deleted
//!   rows included.

use chrono::{Days, NaiveDate};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

use super::employee_repo::{employee_exists, parse_employee_row};
use super::{
    constraint_violation, ensure_tables, parse_uuid, timestamp_from_db, timestamp_to_db,
    ConstraintViolation, RepoError, RepoResult,
};
use crate::model::current_timestamp;
use crate::model::employee::EmployeeId;
use crate::model::equipment::{Equipment, EquipmentId, LifecycleState};
use crate::model::validation::validate_equipment;
use crate::view::EquipmentEntry;

const EQUIPMENT_COLUMNS: &str = "e.id AS id,
    e.employee_id AS employee_id,
    e.name AS name,
    e.category AS category,
    e.number AS number,
    e.description AS description,
    e.created_at AS created_at,
    e.updated_at AS updated_at,
    e.deleted_at AS deleted_at";

const EMPLOYEE_JOIN_COLUMNS: &str = "emp.id AS emp_id,
    emp.first_name AS emp_first_name,
    emp.last_name AS emp_last_name,
    emp.email AS emp_email,
    emp.hired_at AS emp_hired_at";

/// Optional narrowing applied on top of the active-only baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentFilter {
    /// Exact category match. Blank values are treated as absent.
    pub category: Option<String>,
    /// Restricts to equipment assigned to this employee.
    pub employee_id: Option<EmployeeId>,
    /// Inclusive lower bound on `created_at`, from 00:00:00 UTC of that day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `created_at`, through the end of that day (UTC).
    pub date_to: Option<NaiveDate>,
}

impl EquipmentFilter {
    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn by_employee(employee_id: EmployeeId) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Self::default()
        }
    }
}

/// Repository interface for equipment records.
pub trait EquipmentRepository {
    fn create_equipment(&self, equipment: &Equipment) -> RepoResult<EquipmentId>;
    /// Persists writable fields. Lifecycle state and `created_at` are not
    /// written here; use `soft_delete_equipment`/`restore_equipment`.
    fn update_equipment(&self, equipment: &Equipment) -> RepoResult<()>;
    /// Gets one record by id, deleted rows included.
    fn get_equipment(&self, id: EquipmentId) -> RepoResult<Option<Equipment>>;
    /// Gets one record joined with its employee, deleted rows included.
    fn get_equipment_entry(&self, id: EquipmentId) -> RepoResult<Option<EquipmentEntry>>;
    fn find_equipment_by_number(&self, number: &str) -> RepoResult<Option<Equipment>>;
    /// Lists non-deleted equipment narrowed by `filter`.
    fn list_active(&self, filter: &EquipmentFilter) -> RepoResult<Vec<Equipment>>;
    /// Same rows as `list_active`, joined with the assigned employee.
    fn list_active_entries(&self, filter: &EquipmentFilter) -> RepoResult<Vec<EquipmentEntry>>;
    /// Distinct non-null categories of active equipment, ascending.
    fn unique_categories(&self) -> RepoResult<Vec<String>>;
    fn soft_delete_equipment(&self, id: EquipmentId) -> RepoResult<Equipment>;
    fn restore_equipment(&self, id: EquipmentId) -> RepoResult<Equipment>;
    fn assign_equipment(&self, id: EquipmentId, employee_id: EmployeeId) -> RepoResult<Equipment>;
    fn unassign_equipment(&self, id: EquipmentId) -> RepoResult<Equipment>;
}

/// SQLite-backed equipment repository.
pub struct SqliteEquipmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEquipmentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["employee", "equipment"])?;
        Ok(Self { conn })
    }

    /// Loads, mutates and rewrites one record inside an immediate transaction.
    fn mutate_in_tx(
        &self,
        id: EquipmentId,
        mutate: impl FnOnce(&Transaction<'_>, &mut Equipment) -> RepoResult<()>,
    ) -> RepoResult<Equipment> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut equipment =
            load_equipment(&tx, id)?.ok_or_else(|| RepoError::equipment_not_found(id))?;

        mutate(&tx, &mut equipment)?;

        tx.execute(
            "UPDATE equipment
             SET
                employee_id = ?1,
                updated_at = ?2,
                deleted_at = ?3
             WHERE id = ?4;",
            params![
                equipment.employee_id.map(|employee_id| employee_id.to_string()),
                equipment.updated_at.map(timestamp_to_db),
                equipment.deleted_at().map(timestamp_to_db),
                equipment.id.to_string(),
            ],
        )?;
        tx.commit()?;

        Ok(equipment)
    }
}

impl EquipmentRepository for SqliteEquipmentRepository<'_> {
    fn create_equipment(&self, equipment: &Equipment) -> RepoResult<EquipmentId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        // An unresolvable employee reference is reported ahead of field errors.
        ensure_employee_reference(&tx, equipment.employee_id)?;
        validate_equipment(equipment)?;

        tx.execute(
            "INSERT INTO equipment (
                id,
                employee_id,
                name,
                category,
                number,
                description,
                created_at,
                updated_at,
                deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                equipment.id.to_string(),
                equipment.employee_id.map(|employee_id| employee_id.to_string()),
                equipment.name.as_deref(),
                equipment.category.as_deref(),
                equipment.number.trim(),
                equipment.description.as_str(),
                timestamp_to_db(equipment.created_at),
                equipment.updated_at.map(timestamp_to_db),
                equipment.deleted_at().map(timestamp_to_db),
            ],
        )
        .map_err(|err| map_equipment_write_error(err, equipment))?;
        tx.commit()?;

        Ok(equipment.id)
    }

    fn update_equipment(&self, equipment: &Equipment) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        // An unresolvable employee reference is reported ahead of field errors.
        ensure_employee_reference(&tx, equipment.employee_id)?;
        validate_equipment(equipment)?;

        let changed = tx
            .execute(
                "UPDATE equipment
                 SET
                    employee_id = ?1,
                    name = ?2,
                    category = ?3,
                    number = ?4,
                    description = ?5,
                    updated_at = ?6
                 WHERE id = ?7;",
                params![
                    equipment.employee_id.map(|employee_id| employee_id.to_string()),
                    equipment.name.as_deref(),
                    equipment.category.as_deref(),
                    equipment.number.trim(),
                    equipment.description.as_str(),
                    timestamp_to_db(current_timestamp()),
                    equipment.id.to_string(),
                ],
            )
            .map_err(|err| map_equipment_write_error(err, equipment))?;

        if changed == 0 {
            return Err(RepoError::equipment_not_found(equipment.id));
        }
        tx.commit()?;

        Ok(())
    }

    fn get_equipment(&self, id: EquipmentId) -> RepoResult<Option<Equipment>> {
        load_equipment(self.conn, id)
    }

    fn get_equipment_entry(&self, id: EquipmentId) -> RepoResult<Option<EquipmentEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EQUIPMENT_COLUMNS}, {EMPLOYEE_JOIN_COLUMNS}
             FROM equipment e
             LEFT JOIN employee emp ON emp.id = e.employee_id
             WHERE e.id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn find_equipment_by_number(&self, number: &str) -> RepoResult<Option<Equipment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment e WHERE e.number = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([number.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_equipment_row(row)?));
        }
        Ok(None)
    }

    fn list_active(&self, filter: &EquipmentFilter) -> RepoResult<Vec<Equipment>> {
        let (sql, bind_values) = active_query(
            &format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment e"),
            filter,
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_equipment_row(row)?);
        }
        Ok(items)
    }

    fn list_active_entries(&self, filter: &EquipmentFilter) -> RepoResult<Vec<EquipmentEntry>> {
        let (sql, bind_values) = active_query(
            &format!(
                "SELECT {EQUIPMENT_COLUMNS}, {EMPLOYEE_JOIN_COLUMNS}
                 FROM equipment e
                 LEFT JOIN employee emp ON emp.id = e.employee_id"
            ),
            filter,
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn unique_categories(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category
             FROM equipment
             WHERE deleted_at IS NULL
               AND category IS NOT NULL
             ORDER BY category ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(row.get("category")?);
        }
        Ok(categories)
    }

    fn soft_delete_equipment(&self, id: EquipmentId) -> RepoResult<Equipment> {
        self.mutate_in_tx(id, |_, equipment| {
            equipment.soft_delete();
            Ok(())
        })
    }

    fn restore_equipment(&self, id: EquipmentId) -> RepoResult<Equipment> {
        self.mutate_in_tx(id, |_, equipment| {
            equipment.restore();
            Ok(())
        })
    }

    fn assign_equipment(&self, id: EquipmentId, employee_id: EmployeeId) -> RepoResult<Equipment> {
        self.mutate_in_tx(id, |tx, equipment| {
            ensure_employee_reference(tx, Some(employee_id))?;
            equipment.assign_to(employee_id);
            Ok(())
        })
    }

    fn unassign_equipment(&self, id: EquipmentId) -> RepoResult<Equipment> {
        self.mutate_in_tx(id, |_, equipment| {
            equipment.unassign();
            Ok(())
        })
    }
}

/// Builds the active-only query: baseline predicate, AND-ed filters, fixed order.
fn active_query(select_sql: &str, filter: &EquipmentFilter) -> (String, Vec<Value>) {
    let mut sql = format!("{select_sql} WHERE e.deleted_at IS NULL");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(category) = filter
        .category
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        sql.push_str(" AND e.category = ?");
        bind_values.push(Value::Text(category.to_string()));
    }

    if let Some(employee_id) = filter.employee_id {
        sql.push_str(" AND e.employee_id = ?");
        bind_values.push(Value::Text(employee_id.to_string()));
    }

    if let Some(from_ms) = filter.date_from.and_then(day_start_ms) {
        sql.push_str(" AND e.created_at >= ?");
        bind_values.push(Value::Integer(from_ms));
    }

    if let Some(to_ms) = filter.date_to.and_then(day_end_ms) {
        sql.push_str(" AND e.created_at <= ?");
        bind_values.push(Value::Integer(to_ms));
    }

    sql.push_str(" ORDER BY e.created_at ASC, e.id ASC;");
    (sql, bind_values)
}

fn day_start_ms(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc().timestamp_millis())
}

fn day_end_ms(date: NaiveDate) -> Option<i64> {
    match date.checked_add_days(Days::new(1)) {
        Some(next_day) => day_start_ms(next_day).map(|start| start - 1),
        // Last representable day: no upper bound left to apply.
        None => Some(i64::MAX),
    }
}

fn load_equipment(conn: &Connection, id: EquipmentId) -> RepoResult<Option<Equipment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EQUIPMENT_COLUMNS} FROM equipment e WHERE e.id = ?1;"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_equipment_row(row)?));
    }
    Ok(None)
}

fn ensure_employee_reference(conn: &Connection, employee_id: Option<EmployeeId>) -> RepoResult<()> {
    match employee_id {
        Some(id) if !employee_exists(conn, id)? => Err(RepoError::employee_not_found(id)),
        _ => Ok(()),
    }
}

fn parse_equipment_row(row: &Row<'_>) -> RepoResult<Equipment> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "equipment.id")?;

    let employee_id = match row.get::<_, Option<String>>("employee_id")? {
        Some(value) => Some(parse_uuid(&value, "equipment.employee_id")?),
        None => None,
    };

    let created_at = timestamp_from_db(row.get("created_at")?, "equipment.created_at")?;
    let updated_at = match row.get::<_, Option<i64>>("updated_at")? {
        Some(value) => Some(timestamp_from_db(value, "equipment.updated_at")?),
        None => None,
    };
    let deleted_at = match row.get::<_, Option<i64>>("deleted_at")? {
        Some(value) => Some(timestamp_from_db(value, "equipment.deleted_at")?),
        None => None,
    };

    let equipment = Equipment {
        id,
        name: row.get("name")?,
        category: row.get("category")?,
        number: row.get("number")?,
        description: row.get("description")?,
        created_at,
        updated_at,
        state: LifecycleState::from_deleted_at(deleted_at),
        employee_id,
    };
    validate_equipment(&equipment).map_err(|err| {
        RepoError::InvalidData(format!("equipment {id} fails validation: {err}"))
    })?;
    Ok(equipment)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<EquipmentEntry> {
    let equipment = parse_equipment_row(row)?;
    let employee = match row.get::<_, Option<String>>("emp_id")? {
        Some(_) => Some(parse_employee_row(row, "emp_")?),
        None => None,
    };
    Ok(EquipmentEntry {
        equipment,
        employee,
    })
}

fn map_equipment_write_error(err: rusqlite::Error, equipment: &Equipment) -> RepoError {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique(target)) if target == "equipment.number" => {
            RepoError::Conflict {
                field: "number",
                value: equipment.number.trim().to_string(),
            }
        }
        Some(ConstraintViolation::Unique(target)) if target == "equipment.id" => {
            RepoError::Conflict {
                field: "id",
                value: equipment.id.to_string(),
            }
        }
        Some(ConstraintViolation::ForeignKey) => match equipment.employee_id {
            Some(employee_id) => RepoError::employee_not_found(employee_id),
            None => err.into(),
        },
        _ => err.into(),
    }
}
