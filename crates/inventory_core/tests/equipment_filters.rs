use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use inventory_core::db::open_db_in_memory;
use inventory_core::{
    Employee, EmployeeRepository, Equipment, EquipmentFilter, EquipmentRepository,
    SqliteEmployeeRepository, SqliteEquipmentRepository,
};
use rusqlite::Connection;

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn seed_employee(conn: &Connection, first: &str, email: &str) -> Employee {
    let repo = SqliteEmployeeRepository::try_new(conn).unwrap();
    let employee = Employee::new(first, "Martin", email, date(2021, 3, 1));
    repo.create_employee(&employee).unwrap();
    employee
}

fn seed_equipment(
    repo: &SqliteEquipmentRepository<'_>,
    number: &str,
    category: Option<&str>,
    created_at: DateTime<Utc>,
    employee: Option<&Employee>,
) -> Equipment {
    let mut equipment = Equipment::new(number);
    equipment.name = Some(format!("Article {number}"));
    equipment.category = category.map(str::to_string);
    equipment.created_at = created_at;
    equipment.employee_id = employee.map(|employee| employee.id);
    repo.create_equipment(&equipment).unwrap();
    equipment
}

fn numbers(items: &[Equipment]) -> Vec<&str> {
    items.iter().map(|item| item.number.as_str()).collect()
}

#[test]
fn list_active_never_returns_deleted_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    let kept = seed_equipment(&repo, "SN-KEEP", Some("Ordinateur"), at(2025, 1, 1, 9), None);
    let gone = seed_equipment(&repo, "SN-GONE", Some("Ordinateur"), at(2025, 1, 2, 9), None);
    repo.soft_delete_equipment(gone.id).unwrap();

    let all = repo.list_active(&EquipmentFilter::default()).unwrap();
    assert_eq!(numbers(&all), vec!["SN-KEEP"]);

    let by_category = repo
        .list_active(&EquipmentFilter::by_category("Ordinateur"))
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, kept.id);
}

#[test]
fn list_active_orders_by_creation_time() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-C", None, at(2025, 3, 1, 9), None);
    seed_equipment(&repo, "SN-A", None, at(2025, 1, 1, 9), None);
    seed_equipment(&repo, "SN-B", None, at(2025, 2, 1, 9), None);

    let listed = repo.list_active(&EquipmentFilter::default()).unwrap();
    assert_eq!(numbers(&listed), vec!["SN-A", "SN-B", "SN-C"]);
}

#[test]
fn filters_combine_with_and() {
    let conn = open_db_in_memory().unwrap();
    let e1 = seed_employee(&conn, "Alice", "alice@example.com");
    let e2 = seed_employee(&conn, "Bruno", "bruno@example.com");
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-A", Some("Ordinateur"), at(2025, 1, 1, 10), Some(&e1));
    seed_equipment(&repo, "SN-B", Some("Ordinateur"), at(2025, 1, 5, 10), Some(&e2));

    let filter = EquipmentFilter {
        category: Some("Ordinateur".to_string()),
        employee_id: Some(e2.id),
        date_from: Some(date(2025, 1, 3)),
        date_to: None,
    };
    let listed = repo.list_active(&filter).unwrap();
    assert_eq!(numbers(&listed), vec!["SN-B"]);

    let none = EquipmentFilter {
        employee_id: Some(e1.id),
        date_from: Some(date(2025, 1, 3)),
        ..EquipmentFilter::default()
    };
    assert!(repo.list_active(&none).unwrap().is_empty());
}

#[test]
fn date_bounds_include_whole_days() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-EARLY", None, at(2025, 1, 1, 0), None);
    seed_equipment(&repo, "SN-LATE", None, Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap(), None);
    seed_equipment(&repo, "SN-NEXT", None, at(2025, 1, 2, 0), None);

    let single_day = EquipmentFilter {
        date_from: Some(date(2025, 1, 1)),
        date_to: Some(date(2025, 1, 1)),
        ..EquipmentFilter::default()
    };
    let listed = repo.list_active(&single_day).unwrap();
    assert_eq!(numbers(&listed), vec!["SN-EARLY", "SN-LATE"]);

    let from_next = EquipmentFilter {
        date_from: Some(date(2025, 1, 2)),
        ..EquipmentFilter::default()
    };
    assert_eq!(numbers(&repo.list_active(&from_next).unwrap()), vec!["SN-NEXT"]);
}

#[test]
fn blank_category_filter_is_ignored() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-1", Some("Ordinateur"), at(2025, 1, 1, 9), None);
    seed_equipment(&repo, "SN-2", None, at(2025, 1, 2, 9), None);

    let listed = repo
        .list_active(&EquipmentFilter::by_category("   "))
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[test]
fn employee_filter_returns_only_assigned_equipment() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_employee(&conn, "Alice", "alice@example.com");
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-MINE", None, at(2025, 1, 1, 9), Some(&alice));
    seed_equipment(&repo, "SN-FREE", None, at(2025, 1, 2, 9), None);

    let listed = repo.list_active(&EquipmentFilter::by_employee(alice.id)).unwrap();
    assert_eq!(numbers(&listed), vec!["SN-MINE"]);
}

#[test]
fn entries_join_assigned_employee() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_employee(&conn, "Alice", "alice@example.com");
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-1", None, at(2025, 1, 1, 9), Some(&alice));
    seed_equipment(&repo, "SN-2", None, at(2025, 1, 2, 9), None);

    let entries = repo.list_active_entries(&EquipmentFilter::default()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].employee.as_ref(), Some(&alice));
    assert_eq!(entries[1].employee, None);
}

#[test]
fn unique_categories_are_distinct_sorted_and_active_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();

    seed_equipment(&repo, "SN-1", Some("Téléphone"), at(2025, 1, 1, 9), None);
    seed_equipment(&repo, "SN-2", Some("Ordinateur"), at(2025, 1, 2, 9), None);
    seed_equipment(&repo, "SN-3", Some("Ordinateur"), at(2025, 1, 3, 9), None);
    seed_equipment(&repo, "SN-4", None, at(2025, 1, 4, 9), None);
    let hidden = seed_equipment(&repo, "SN-5", Some("Imprimante"), at(2025, 1, 5, 9), None);
    repo.soft_delete_equipment(hidden.id).unwrap();

    let categories = repo.unique_categories().unwrap();
    assert_eq!(categories, vec!["Ordinateur".to_string(), "Téléphone".to_string()]);
    assert!(categories.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn unique_categories_on_empty_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEquipmentRepository::try_new(&conn).unwrap();
    assert!(repo.unique_categories().unwrap().is_empty());
}
