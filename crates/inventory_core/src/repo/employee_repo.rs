//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `employee` table.
//! - Own the guarded removal procedure that unassigns dependents first.
//!
//! # Invariants
//! - `email` is stored trimmed; uniqueness ignores ASCII case and is
//!   surfaced as `Conflict`.
//! - A removed employee is never referenced by any equipment row.

use chrono::{NaiveDate, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

use super::{
    constraint_violation, ensure_tables, parse_uuid, timestamp_to_db, ConstraintViolation,
    RepoError, RepoResult,
};
use crate::model::current_timestamp;
use crate::model::employee::{Employee, EmployeeId};
use crate::model::validation::validate_employee;

const HIRED_AT_FORMAT: &str = "%Y-%m-%d";

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    hired_at
FROM employee";

/// Repository interface for employee records.
pub trait EmployeeRepository {
    fn create_employee(&self, employee: &Employee) -> RepoResult<EmployeeId>;
    fn update_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn find_employee_by_email(&self, email: &str) -> RepoResult<Option<Employee>>;
    /// Lists employees ordered by last name, first name, then id.
    fn list_employees(&self) -> RepoResult<Vec<Employee>>;
    /// Deletes an employee that no equipment references.
    ///
    /// Fails with `ReferentialIntegrity` while dependents remain.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
    /// Unassigns every dependent equipment row and deletes the employee in
    /// one transaction. Returns the number of unassigned rows.
    fn remove_employee_unassigning(&self, id: EmployeeId) -> RepoResult<usize>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["employee", "equipment"])?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &Employee) -> RepoResult<EmployeeId> {
        validate_employee(employee, today())?;

        self.conn
            .execute(
                "INSERT INTO employee (id, first_name, last_name, email, hired_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    employee.id.to_string(),
                    employee.first_name.as_str(),
                    employee.last_name.as_str(),
                    employee.email.trim(),
                    employee.hired_at.format(HIRED_AT_FORMAT).to_string(),
                ],
            )
            .map_err(|err| map_employee_write_error(err, employee))?;

        Ok(employee.id)
    }

    fn update_employee(&self, employee: &Employee) -> RepoResult<()> {
        validate_employee(employee, today())?;

        let changed = self
            .conn
            .execute(
                "UPDATE employee
                 SET
                    first_name = ?1,
                    last_name = ?2,
                    email = ?3,
                    hired_at = ?4
                 WHERE id = ?5;",
                params![
                    employee.first_name.as_str(),
                    employee.last_name.as_str(),
                    employee.email.trim(),
                    employee.hired_at.format(HIRED_AT_FORMAT).to_string(),
                    employee.id.to_string(),
                ],
            )
            .map_err(|err| map_employee_write_error(err, employee))?;

        if changed == 0 {
            return Err(RepoError::employee_not_found(employee.id));
        }

        Ok(())
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row, "")?));
        }
        Ok(None)
    }

    fn find_employee_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"
        ))?;
        let mut rows = stmt.query([email.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row, "")?));
        }
        Ok(None)
    }

    fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} ORDER BY last_name ASC, first_name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row, "")?);
        }
        Ok(employees)
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let result = self
            .conn
            .execute("DELETE FROM employee WHERE id = ?1;", [id.to_string()]);

        match result {
            Ok(0) => Err(RepoError::employee_not_found(id)),
            Ok(_) => Ok(()),
            Err(err) if constraint_violation(&err) == Some(ConstraintViolation::ForeignKey) => {
                Err(RepoError::ReferentialIntegrity {
                    employee_id: id,
                    dependents: count_dependents(self.conn, id)?,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn remove_employee_unassigning(&self, id: EmployeeId) -> RepoResult<usize> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM employee WHERE id = ?1;",
                [id_text.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(RepoError::employee_not_found(id));
        }

        let unassigned = tx.execute(
            "UPDATE equipment
             SET
                employee_id = NULL,
                updated_at = ?1
             WHERE employee_id = ?2;",
            params![timestamp_to_db(current_timestamp()), id_text.as_str()],
        )?;
        tx.execute("DELETE FROM employee WHERE id = ?1;", [id_text.as_str()])?;
        tx.commit()?;

        info!(
            "event=employee_remove module=repo status=ok unassigned_count={}",
            unassigned
        );
        Ok(unassigned)
    }
}

/// Parses employee columns, optionally prefixed (e.g. `emp_` in joins).
pub(crate) fn parse_employee_row(row: &Row<'_>, prefix: &str) -> RepoResult<Employee> {
    let id_text: String = row.get(format!("{prefix}id").as_str())?;
    let id = parse_uuid(&id_text, "employee.id")?;

    let hired_text: String = row.get(format!("{prefix}hired_at").as_str())?;
    let hired_at = NaiveDate::parse_from_str(&hired_text, HIRED_AT_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{hired_text}` in employee.hired_at"
        ))
    })?;

    Ok(Employee {
        id,
        first_name: row.get(format!("{prefix}first_name").as_str())?,
        last_name: row.get(format!("{prefix}last_name").as_str())?,
        email: row.get(format!("{prefix}email").as_str())?,
        hired_at,
    })
}

pub(crate) fn employee_exists(conn: &Connection, id: EmployeeId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM employee WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn count_dependents(conn: &Connection, id: EmployeeId) -> RepoResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM equipment WHERE employee_id = ?1;",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn map_employee_write_error(err: rusqlite::Error, employee: &Employee) -> RepoError {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique(target)) if target == "employee.email" => {
            RepoError::Conflict {
                field: "email",
                value: employee.email.trim().to_string(),
            }
        }
        Some(ConstraintViolation::Unique(target)) if target == "employee.id" => {
            RepoError::Conflict {
                field: "id",
                value: employee.id.to_string(),
            }
        }
        _ => err.into(),
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
