//! JSON use-case API over the inventory core.
//!
//! # Responsibility
//! - Expose stable, use-case-level entry points returning a status code and
//!   a JSON body.
//! - Map core error outcomes onto status codes in one place.
//!
//! # Invariants
//! - Exported functions never panic; every failure becomes a response.
//! - Bodies are `serde_json::Value` using the camelCase read projections.
//! - Transport (HTTP server, routing) stays outside this crate.

use inventory_core::{
    EmployeeDetailView, EmployeePayload, EmployeeService, EquipmentEntry, EquipmentFilter,
    EquipmentPayload, EquipmentService, EquipmentView, ExportFormat, RecordKind, RepoError,
    ServiceError, SqliteEmployeeRepository, SqliteEquipmentRepository,
};
use log::{error, info, warn};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_UNPROCESSABLE_ENTITY: u16 = 422;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

const JSON_CONTENT_TYPE: &str = "application/json";
const EMPLOYEE_NOT_RESOLVED: &str = "Employé non trouvé pour l'ID fourni.";
const EQUIPMENT_NOT_FOUND: &str = "Équipement introuvable.";
const EMPLOYEE_NOT_FOUND: &str = "Employé introuvable.";
const UNSUPPORTED_FORMAT: &str = "Format non supporté";

/// Status code and JSON body returned by every API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn message(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "message": message.into() }))
    }

    /// Content type of `body` once serialized.
    pub fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Download produced by `equipment_export`.
///
/// On failure `body` holds a JSON `{"message": ...}` document and
/// `file_name` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub file_name: Option<&'static str>,
    pub body: Vec<u8>,
}

/// Lists active equipment narrowed by `filter`, joined with employees.
pub fn equipment_index(conn: &Connection, filter: &EquipmentFilter) -> ApiResponse {
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };
    match service.list_active_entries(filter) {
        Ok(entries) => {
            let views = entries.iter().map(EquipmentView::from).collect::<Vec<_>>();
            json_response(STATUS_OK, &views)
        }
        Err(err) => error_response("equipment_index", err),
    }
}

/// Distinct categories of active equipment, ascending.
pub fn equipment_categories(conn: &Connection) -> ApiResponse {
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };
    match service.unique_categories() {
        Ok(categories) => json_response(STATUS_OK, &categories),
        Err(err) => error_response("equipment_categories", err),
    }
}

/// Creates equipment from a JSON write payload.
///
/// - `201` with the read projection on success.
/// - `400` with `{"errors": {field: message}}` on malformed JSON or invalid fields.
/// - `422` when `employee.id` does not resolve to an employee.
/// - `409` when `number` is already used, deleted records included.
pub fn equipment_create(conn: &Connection, body: &str) -> ApiResponse {
    let payload = match serde_json::from_str::<EquipmentPayload>(body) {
        Ok(payload) => payload,
        Err(err) => return malformed_body(&err),
    };
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };

    equipment_write_response(
        "equipment_create",
        STATUS_CREATED,
        service.create_from_payload(payload),
    )
}

/// One equipment record by id, soft-deleted records included (`200`/`404`).
pub fn equipment_show(conn: &Connection, equipment_id: &str) -> ApiResponse {
    let Some(equipment_id) = parse_id(equipment_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND);
    };
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };
    match service.get_equipment(equipment_id) {
        Ok(Some(entry)) => json_response(STATUS_OK, &EquipmentView::from(&entry)),
        Ok(None) => ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND),
        Err(err) => error_response("equipment_show", err),
    }
}

/// Overwrites the writable fields of existing equipment.
///
/// Same outcomes as `equipment_create`, answering `200` on success and `404`
/// for an unknown equipment id. Lifecycle fields in the body are ignored.
pub fn equipment_update(conn: &Connection, equipment_id: &str, body: &str) -> ApiResponse {
    let Some(equipment_id) = parse_id(equipment_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND);
    };
    let payload = match serde_json::from_str::<EquipmentPayload>(body) {
        Ok(payload) => payload,
        Err(err) => return malformed_body(&err),
    };
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };

    equipment_write_response(
        "equipment_update",
        STATUS_OK,
        service.update_from_payload(equipment_id, payload),
    )
}

/// Renders the active listing selected by `filter` as `format` (`csv`|`json`).
///
/// Unknown formats answer `404`.
pub fn equipment_export(
    conn: &Connection,
    format: &str,
    filter: &EquipmentFilter,
) -> ExportResponse {
    let format = match format.trim().parse::<ExportFormat>() {
        Ok(format) => format,
        Err(err) => {
            info!("event=api_equipment_export module=api status=rejected error={err}");
            return export_failure(ApiResponse::message(STATUS_NOT_FOUND, UNSUPPORTED_FORMAT));
        }
    };
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return export_failure(response),
    };

    match service.export(format, filter) {
        Ok(document) => ExportResponse {
            status: STATUS_OK,
            content_type: format.content_type(),
            file_name: Some(format.file_name()),
            body: document.bytes,
        },
        Err(err) => export_failure(error_response("equipment_export", err)),
    }
}

pub fn equipment_assign(conn: &Connection, equipment_id: &str, employee_id: &str) -> ApiResponse {
    let Some(equipment_id) = parse_id(equipment_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND);
    };
    let Some(employee_id) = parse_id(employee_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EMPLOYEE_NOT_FOUND);
    };
    equipment_mutation(conn, "equipment_assign", equipment_id, |service, id| {
        service.assign(id, employee_id)
    })
}

pub fn equipment_unassign(conn: &Connection, equipment_id: &str) -> ApiResponse {
    let Some(equipment_id) = parse_id(equipment_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND);
    };
    equipment_mutation(conn, "equipment_unassign", equipment_id, |service, id| {
        service.unassign(id)
    })
}

/// Soft-deletes equipment; it disappears from listings but keeps its number.
pub fn equipment_delete(conn: &Connection, equipment_id: &str) -> ApiResponse {
    let Some(equipment_id) = parse_id(equipment_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND);
    };
    equipment_mutation(conn, "equipment_delete", equipment_id, |service, id| {
        service.soft_delete(id)
    })
}

pub fn equipment_restore(conn: &Connection, equipment_id: &str) -> ApiResponse {
    let Some(equipment_id) = parse_id(equipment_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND);
    };
    equipment_mutation(conn, "equipment_restore", equipment_id, |service, id| {
        service.restore(id)
    })
}

/// Lists employees ordered by last name then first name.
pub fn employee_index(conn: &Connection) -> ApiResponse {
    let service = match employee_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };
    match service.list_employees() {
        Ok(employees) => {
            let views = employees
                .iter()
                .map(EmployeeDetailView::from)
                .collect::<Vec<_>>();
            json_response(STATUS_OK, &views)
        }
        Err(err) => error_response("employee_index", err),
    }
}

/// Creates an employee from a JSON write payload (`201`/`400`/`409`).
pub fn employee_create(conn: &Connection, body: &str) -> ApiResponse {
    let payload = match serde_json::from_str::<EmployeePayload>(body) {
        Ok(payload) => payload,
        Err(err) => return malformed_body(&err),
    };
    let service = match employee_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.create_from_payload(payload) {
        Ok(employee) => json_response(STATUS_CREATED, &EmployeeDetailView::from(&employee)),
        Err(err) => error_response("employee_create", err),
    }
}

/// Overwrites an employee's fields, keeping its id (`200`/`400`/`404`/`409`).
pub fn employee_update(conn: &Connection, employee_id: &str, body: &str) -> ApiResponse {
    let Some(employee_id) = parse_id(employee_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EMPLOYEE_NOT_FOUND);
    };
    let payload = match serde_json::from_str::<EmployeePayload>(body) {
        Ok(payload) => payload,
        Err(err) => return malformed_body(&err),
    };
    let service = match employee_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.update_from_payload(employee_id, payload) {
        Ok(employee) => json_response(STATUS_OK, &EmployeeDetailView::from(&employee)),
        Err(err) => error_response("employee_update", err),
    }
}

/// Removes an employee after unassigning all of their equipment.
pub fn employee_remove(conn: &Connection, employee_id: &str) -> ApiResponse {
    let Some(employee_id) = parse_id(employee_id) else {
        return ApiResponse::message(STATUS_NOT_FOUND, EMPLOYEE_NOT_FOUND);
    };
    let service = match employee_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };

    match service.remove_employee(employee_id) {
        Ok(removal) => ApiResponse::new(
            STATUS_OK,
            json!({
                "id": removal.employee_id.to_string(),
                "unassignedCount": removal.unassigned_count,
            }),
        ),
        Err(err) => error_response("employee_remove", err),
    }
}

fn equipment_mutation(
    conn: &Connection,
    operation: &'static str,
    equipment_id: Uuid,
    mutate: impl FnOnce(
        &EquipmentService<SqliteEquipmentRepository<'_>>,
        Uuid,
    ) -> inventory_core::ServiceResult<inventory_core::Equipment>,
) -> ApiResponse {
    let service = match equipment_service(conn) {
        Ok(service) => service,
        Err(response) => return response,
    };
    if let Err(err) = mutate(&service, equipment_id) {
        return error_response(operation, err);
    }
    match service.get_equipment(equipment_id) {
        Ok(Some(entry)) => json_response(STATUS_OK, &EquipmentView::from(&entry)),
        Ok(None) => ApiResponse::message(STATUS_NOT_FOUND, EQUIPMENT_NOT_FOUND),
        Err(err) => error_response(operation, err),
    }
}

fn equipment_write_response(
    operation: &'static str,
    success_status: u16,
    result: inventory_core::ServiceResult<EquipmentEntry>,
) -> ApiResponse {
    match result {
        Ok(entry) => json_response(success_status, &EquipmentView::from(&entry)),
        Err(ServiceError::Repo(RepoError::NotFound {
            kind: RecordKind::Employee,
            id,
        })) => {
            info!("event=api_{operation} module=api status=rejected employee_id={id}");
            ApiResponse::message(STATUS_UNPROCESSABLE_ENTITY, EMPLOYEE_NOT_RESOLVED)
        }
        Err(err) => error_response(operation, err),
    }
}

fn equipment_service(
    conn: &Connection,
) -> Result<EquipmentService<SqliteEquipmentRepository<'_>>, ApiResponse> {
    SqliteEquipmentRepository::try_new(conn)
        .map(EquipmentService::new)
        .map_err(|err| error_response("equipment_repo_init", ServiceError::Repo(err)))
}

fn employee_service(
    conn: &Connection,
) -> Result<EmployeeService<SqliteEmployeeRepository<'_>>, ApiResponse> {
    SqliteEmployeeRepository::try_new(conn)
        .map(EmployeeService::new)
        .map_err(|err| error_response("employee_repo_init", ServiceError::Repo(err)))
}

fn parse_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

fn json_response<T: Serialize>(status: u16, value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(body) => ApiResponse::new(status, body),
        Err(err) => {
            error!("event=api_serialize module=api status=error error={err}");
            ApiResponse::message(STATUS_INTERNAL_ERROR, "serialization failed")
        }
    }
}

fn malformed_body(err: &serde_json::Error) -> ApiResponse {
    info!(
        "event=api_decode module=api status=rejected line={} column={}",
        err.line(),
        err.column()
    );
    ApiResponse::new(
        STATUS_BAD_REQUEST,
        json!({ "errors": { "body": format!("JSON invalide: {err}") } }),
    )
}

fn export_failure(response: ApiResponse) -> ExportResponse {
    ExportResponse {
        status: response.status,
        content_type: JSON_CONTENT_TYPE,
        file_name: None,
        body: response.body.to_string().into_bytes(),
    }
}

fn conflict_message(field: &str) -> &'static str {
    match field {
        "number" => "Ce numéro d'équipement est déjà utilisé.",
        "email" => "Cet email est déjà utilisé.",
        _ => "Cette valeur est déjà utilisée.",
    }
}

fn error_response(operation: &'static str, err: ServiceError) -> ApiResponse {
    match err {
        ServiceError::Repo(RepoError::Validation(errors)) => {
            info!(
                "event=api_{operation} module=api status=rejected error_count={}",
                errors.errors().len()
            );
            ApiResponse::new(
                STATUS_BAD_REQUEST,
                json!({ "errors": errors.field_messages() }),
            )
        }
        ServiceError::Repo(RepoError::Conflict { field, value }) => {
            info!("event=api_{operation} module=api status=conflict field={field} value={value}");
            ApiResponse::new(
                STATUS_CONFLICT,
                json!({ "errors": { field: conflict_message(field) } }),
            )
        }
        ServiceError::Repo(RepoError::NotFound { kind, id }) => {
            info!("event=api_{operation} module=api status=not_found kind={kind} id={id}");
            let message = match kind {
                RecordKind::Employee => EMPLOYEE_NOT_FOUND,
                RecordKind::Equipment => EQUIPMENT_NOT_FOUND,
            };
            ApiResponse::message(STATUS_NOT_FOUND, message)
        }
        ServiceError::Repo(RepoError::ReferentialIntegrity {
            employee_id,
            dependents,
        }) => {
            warn!(
                "event=api_{operation} module=api status=conflict employee_id={employee_id} dependents={dependents}"
            );
            ApiResponse::message(
                STATUS_CONFLICT,
                format!("L'employé possède encore {dependents} équipement(s) assigné(s)."),
            )
        }
        other => {
            error!("event=api_{operation} module=api status=error error={other}");
            ApiResponse::message(STATUS_INTERNAL_ERROR, other.to_string())
        }
    }
}
