use inventory_core::db::open_db_in_memory;
use inventory_core::{
    Equipment, EquipmentFilter, EquipmentPayload, EquipmentRepository, EquipmentService,
    RecordKind, RepoError, ServiceError, SqliteEquipmentRepository,
};
use uuid::Uuid;

#[test]
fn create_and_read_back_round_trips_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let mut equipment = Equipment::new("SN-100");
    equipment.name = Some("Laptop".to_string());
    equipment.category = Some("Ordinateur".to_string());
    equipment.description = "Dell XPS".to_string();
    repo.create_equipment(&equipment).unwrap();

    let loaded = repo.get_equipment(equipment.id).unwrap().unwrap();
    assert_eq!(loaded, equipment);
    assert!(loaded.is_active());
}

#[test]
fn create_rejects_missing_number_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let err = repo.create_equipment(&Equipment::new("   ")).unwrap_err();
    match err {
        RepoError::Validation(errors) => assert!(errors.has_field("number")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(repo.list_active(&EquipmentFilter::default()).unwrap().is_empty());
}

#[test]
fn duplicate_number_conflicts_even_against_deleted_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let first = Equipment::new("SN-DUP");
    repo.create_equipment(&first).unwrap();
    repo.soft_delete_equipment(first.id).unwrap();

    let err = repo.create_equipment(&Equipment::new("SN-DUP")).unwrap_err();
    match err {
        RepoError::Conflict { field, value } => {
            assert_eq!(field, "number");
            assert_eq!(value, "SN-DUP");
        }
        other => panic!("unexpected error: {other}"),
    }

    let stored = repo.find_equipment_by_number("SN-DUP").unwrap().unwrap();
    assert_eq!(stored.id, first.id);
    assert!(stored.is_deleted());
}

#[test]
fn number_uniqueness_ignores_case_and_padding() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let first = Equipment::new("sn-case");
    repo.create_equipment(&first).unwrap();

    for candidate in ["SN-CASE", " sn-case ", "Sn-Case  "] {
        let err = repo.create_equipment(&Equipment::new(candidate)).unwrap_err();
        match err {
            RepoError::Conflict { field, value } => {
                assert_eq!(field, "number");
                assert_eq!(value, candidate.trim());
            }
            other => panic!("unexpected error for {candidate:?}: {other}"),
        }
    }

    let stored = repo.find_equipment_by_number(" SN-CASE").unwrap().unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(repo.list_active(&EquipmentFilter::default()).unwrap().len(), 1);
}

#[test]
fn stored_number_is_trimmed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let equipment = Equipment::new("  SN-PAD ");
    repo.create_equipment(&equipment).unwrap();
    assert_eq!(
        repo.get_equipment(equipment.id).unwrap().unwrap().number,
        "SN-PAD"
    );
}

#[test]
fn create_with_unknown_employee_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let mut equipment = Equipment::new("SN-ORPHAN");
    let ghost = Uuid::new_v4();
    equipment.employee_id = Some(ghost);

    let err = repo.create_equipment(&equipment).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: RecordKind::Employee, id } if id == ghost
    ));
    assert!(repo.get_equipment(equipment.id).unwrap().is_none());
}

#[test]
fn unknown_employee_outranks_missing_number() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let mut equipment = Equipment::new("");
    let ghost = Uuid::new_v4();
    equipment.employee_id = Some(ghost);

    let err = repo.create_equipment(&equipment).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: RecordKind::Employee, id } if id == ghost
    ));
}

#[test]
fn soft_delete_hides_record_and_restore_brings_it_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let equipment = Equipment::new("SN-LC");
    repo.create_equipment(&equipment).unwrap();

    let deleted = repo.soft_delete_equipment(equipment.id).unwrap();
    assert!(deleted.is_deleted());
    assert!(repo.list_active(&EquipmentFilter::default()).unwrap().is_empty());

    let still_there = repo.get_equipment(equipment.id).unwrap().unwrap();
    assert_eq!(still_there.deleted_at(), deleted.deleted_at());

    let restored = repo.restore_equipment(equipment.id).unwrap();
    assert!(restored.is_active());
    assert_eq!(restored.created_at, equipment.created_at);
    let listed = repo.list_active(&EquipmentFilter::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, equipment.id);
}

#[test]
fn lifecycle_operations_on_unknown_id_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    for result in [
        repo.soft_delete_equipment(missing),
        repo.restore_equipment(missing),
        repo.unassign_equipment(missing),
    ] {
        assert!(matches!(
            result,
            Err(RepoError::NotFound { kind: RecordKind::Equipment, .. })
        ));
    }
}

#[test]
fn update_refreshes_updated_at_and_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let equipment = Equipment::new("SN-UPD");
    repo.create_equipment(&equipment).unwrap();

    let mut edited = equipment.clone();
    edited.name = Some("Renamed".to_string());
    edited.created_at = chrono::DateTime::from_timestamp_millis(0).unwrap();
    repo.update_equipment(&edited).unwrap();

    let loaded = repo.get_equipment(equipment.id).unwrap().unwrap();
    assert_eq!(loaded.name.as_deref(), Some("Renamed"));
    assert_eq!(loaded.created_at, equipment.created_at);
    assert!(loaded.updated_at.is_some());
}

#[test]
fn update_does_not_touch_lifecycle_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let equipment = Equipment::new("SN-STATE");
    repo.create_equipment(&equipment).unwrap();
    let deleted = repo.soft_delete_equipment(equipment.id).unwrap();

    let mut edited = deleted.clone();
    edited.restore();
    edited.description = "edited while deleted".to_string();
    repo.update_equipment(&edited).unwrap();

    let loaded = repo.get_equipment(equipment.id).unwrap().unwrap();
    assert!(loaded.is_deleted());
    assert_eq!(loaded.description, "edited while deleted");
}

#[test]
fn update_to_taken_number_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    repo.create_equipment(&Equipment::new("SN-A")).unwrap();
    let mut second = Equipment::new("SN-B");
    repo.create_equipment(&second).unwrap();

    second.number = "SN-A".to_string();
    let err = repo.update_equipment(&second).unwrap_err();
    assert!(matches!(err, RepoError::Conflict { field: "number", .. }));
}

#[test]
fn service_payload_create_and_edit_flow() {
    let conn = open_db_in_memory().unwrap();
    let service = EquipmentService::new(SqliteEquipmentRepository::try_new(&conn).unwrap());

    let payload: EquipmentPayload = serde_json::from_str(
        r#"{"name":"Laptop","category":"Ordinateur","number":" SN-PAY ","description":null}"#,
    )
    .unwrap();
    let created = service.create_from_payload(payload).unwrap();
    assert_eq!(created.equipment.number, "SN-PAY");
    assert_eq!(created.equipment.description, "");
    assert_eq!(created.employee, None);

    let edit: EquipmentPayload =
        serde_json::from_str(r#"{"name":"Laptop Pro","number":"SN-PAY"}"#).unwrap();
    let edited = service
        .update_from_payload(created.equipment.id, edit)
        .unwrap();
    assert_eq!(edited.equipment.name.as_deref(), Some("Laptop Pro"));
    assert_eq!(edited.equipment.category, None);
    assert_eq!(edited.equipment.created_at, created.equipment.created_at);
}

#[test]
fn service_update_of_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = EquipmentService::new(SqliteEquipmentRepository::try_new(&conn).unwrap());

    let payload = EquipmentPayload {
        number: Some("SN-X".to_string()),
        ..EquipmentPayload::default()
    };
    let err = service
        .update_from_payload(Uuid::new_v4(), payload)
        .unwrap_err();
    assert!(matches!(
        err.as_repo(),
        Some(RepoError::NotFound { kind: RecordKind::Equipment, .. })
    ));
    assert!(matches!(err, ServiceError::Repo(_)));
}
