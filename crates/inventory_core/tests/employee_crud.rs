use chrono::{Days, NaiveDate, Utc};
use inventory_core::db::open_db_in_memory;
use inventory_core::{
    Employee, EmployeePayload, EmployeeRepository, EmployeeService, RecordKind, RepoError,
    SqliteEmployeeRepository,
};
use uuid::Uuid;

fn hired() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 9, 1).unwrap()
}

#[test]
fn create_get_and_find_by_email() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let employee = Employee::new("Claire", "Durand", "claire.durand@example.com", hired());
    let id = repo.create_employee(&employee).unwrap();
    assert_eq!(id, employee.id);

    assert_eq!(repo.get_employee(id).unwrap(), Some(employee.clone()));
    assert_eq!(
        repo.find_employee_by_email("claire.durand@example.com")
            .unwrap(),
        Some(employee)
    );
    assert_eq!(repo.find_employee_by_email("nobody@example.com").unwrap(), None);
}

#[test]
fn duplicate_email_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    repo.create_employee(&Employee::new("A", "One", "same@example.com", hired()))
        .unwrap();
    let err = repo
        .create_employee(&Employee::new("B", "Two", "same@example.com", hired()))
        .unwrap_err();

    match err {
        RepoError::Conflict { field, value } => {
            assert_eq!(field, "email");
            assert_eq!(value, "same@example.com");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.list_employees().unwrap().len(), 1);
}

#[test]
fn email_uniqueness_ignores_case_and_padding() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let original = Employee::new("A", "One", "a@b.com", hired());
    repo.create_employee(&original).unwrap();

    for candidate in [" a@b.com ", "A@B.com", "  A@b.COM"] {
        let err = repo
            .create_employee(&Employee::new("B", "Two", candidate, hired()))
            .unwrap_err();
        match err {
            RepoError::Conflict { field, value } => {
                assert_eq!(field, "email");
                assert_eq!(value, candidate.trim());
            }
            other => panic!("unexpected error for {candidate:?}: {other}"),
        }
    }

    assert_eq!(repo.list_employees().unwrap().len(), 1);
    let found = repo.find_employee_by_email(" A@B.COM ").unwrap().unwrap();
    assert_eq!(found.id, original.id);
}

#[test]
fn stored_email_is_trimmed_on_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let mut employee = Employee::new("Claire", "Durand", "  claire@example.com ", hired());
    repo.create_employee(&employee).unwrap();
    assert_eq!(
        repo.get_employee(employee.id).unwrap().unwrap().email,
        "claire@example.com"
    );

    employee.email = "\tclaire.durand@example.com  ".to_string();
    repo.update_employee(&employee).unwrap();
    assert_eq!(
        repo.get_employee(employee.id).unwrap().unwrap().email,
        "claire.durand@example.com"
    );
}

#[test]
fn update_to_case_variant_of_taken_email_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    repo.create_employee(&Employee::new("A", "One", "taken@example.com", hired()))
        .unwrap();
    let mut other = Employee::new("B", "Two", "other@example.com", hired());
    repo.create_employee(&other).unwrap();

    other.email = "TAKEN@example.com".to_string();
    let err = repo.update_employee(&other).unwrap_err();
    assert!(matches!(err, RepoError::Conflict { field: "email", .. }));
    assert_eq!(
        repo.get_employee(other.id).unwrap().unwrap().email,
        "other@example.com"
    );
}

#[test]
fn invalid_fields_are_reported_together() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let future = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(30))
        .unwrap();
    let err = repo
        .create_employee(&Employee::new("", "Durand", "not-an-email", future))
        .unwrap_err();

    let RepoError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.has_field("firstName"));
    assert!(errors.has_field("email"));
    assert!(errors.has_field("hiredAt"));
    assert!(!errors.has_field("lastName"));
}

#[test]
fn list_orders_by_last_then_first_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    for (first, last, email) in [
        ("Zoé", "Bernard", "zoe@example.com"),
        ("Adam", "Petit", "adam@example.com"),
        ("Anne", "Bernard", "anne@example.com"),
    ] {
        repo.create_employee(&Employee::new(first, last, email, hired()))
            .unwrap();
    }

    let names = repo
        .list_employees()
        .unwrap()
        .iter()
        .map(Employee::full_name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Anne Bernard", "Zoé Bernard", "Adam Petit"]);
}

#[test]
fn update_unknown_employee_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let err = repo
        .update_employee(&Employee::new("X", "Y", "x@example.com", hired()))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: RecordKind::Employee, .. }
    ));
}

#[test]
fn service_payload_create_and_edit_keep_id() {
    let conn = open_db_in_memory().unwrap();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&conn).unwrap());

    let payload: EmployeePayload = serde_json::from_str(
        r#"{"firstName":"Jean","lastName":"Dupont","email":"jean@example.com","hiredAt":"2023-02-01"}"#,
    )
    .unwrap();
    let created = service.create_from_payload(payload).unwrap();
    assert_eq!(created.full_name(), "Jean Dupont");

    let edit: EmployeePayload = serde_json::from_str(
        r#"{"firstName":"Jean","lastName":"Dupont","email":"j.dupont@example.com","hiredAt":"2023-02-01"}"#,
    )
    .unwrap();
    let edited = service.update_from_payload(created.id, edit).unwrap();
    assert_eq!(edited.id, created.id);
    assert_eq!(edited.email, "j.dupont@example.com");

    let listed = service.list_employees().unwrap();
    assert_eq!(listed, vec![edited]);
}

#[test]
fn service_payload_without_hire_date_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&conn).unwrap());

    let payload: EmployeePayload =
        serde_json::from_str(r#"{"firstName":"Jean","lastName":"Dupont","email":"jean@example.com"}"#)
            .unwrap();
    let err = service.create_from_payload(payload).unwrap_err();
    match err.as_repo() {
        Some(RepoError::Validation(errors)) => assert!(errors.has_field("hiredAt")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(service.get_employee(Uuid::new_v4()).unwrap().is_none());
}
