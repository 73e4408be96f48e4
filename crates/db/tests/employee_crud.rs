//! Integration tests for the employee, computer, and department repositories.
//!
//! Exercises the repository layer against a real database:
//! - Joined listing and detail lookups
//! - Full-replace updates
//! - Hard deletes
//! - Computer availability options and assignment locking
//! - Unique and foreign key constraints

use bangazon_db::models::computer::CreateComputer;
use bangazon_db::models::department::CreateDepartment;
use bangazon_db::models::employee::EmployeeInput;
use bangazon_db::repositories::{ComputerRepo, DepartmentRepo, EmployeeRepo};
use chrono::Utc;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn department(pool: &PgPool, name: &str) -> i64 {
    DepartmentRepo::create(
        pool,
        &CreateDepartment {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn computer(pool: &PgPool, model: &str, decommissioned: bool) -> i64 {
    ComputerRepo::create(
        pool,
        &CreateComputer {
            model: model.to_string(),
            decommission_date: decommissioned.then(Utc::now),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_employee(first: &str, department_id: i64, computer_id: Option<i64>) -> EmployeeInput {
    EmployeeInput {
        first_name: first.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{}@bangazon.test", first.to_lowercase()),
        department_id,
        computer_id,
    }
}

// ---------------------------------------------------------------------------
// Test: create and joined reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_without_computer(pool: PgPool) {
    let dept = department(&pool, "Sales").await;

    let employee = EmployeeRepo::create(&pool, &new_employee("Ann", dept, None))
        .await
        .unwrap();
    assert_eq!(employee.first_name, "Ann");
    assert_eq!(employee.department_id, dept);
    assert!(employee.computer_id.is_none());

    let detail = EmployeeRepo::find_detail_by_id(&pool, employee.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.department.name, "Sales");
    assert!(detail.computer.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_joins_related_rows(pool: PgPool) {
    let dept = department(&pool, "Engineering").await;
    let pc = computer(&pool, "MacBook Pro", false).await;

    EmployeeRepo::create(&pool, &new_employee("Bo", dept, Some(pc)))
        .await
        .unwrap();
    EmployeeRepo::create(&pool, &new_employee("Cy", dept, None))
        .await
        .unwrap();

    let employees = EmployeeRepo::list(&pool).await.unwrap();
    let count = EmployeeRepo::count(&pool).await.unwrap();
    assert_eq!(employees.len() as i64, count);
    assert_eq!(employees.len(), 2);

    let bo = employees.iter().find(|e| e.first_name == "Bo").unwrap();
    assert_eq!(bo.department.name, "Engineering");
    assert_eq!(bo.computer.as_ref().unwrap().model, "MacBook Pro");

    let cy = employees.iter().find(|e| e.first_name == "Cy").unwrap();
    assert!(cy.computer.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_employee_returns_none(pool: PgPool) {
    assert!(EmployeeRepo::find_by_id(&pool, 999_999).await.unwrap().is_none());
    assert!(EmployeeRepo::find_detail_by_id(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: full replace
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_overwrites_every_field(pool: PgPool) {
    let sales = department(&pool, "Sales").await;
    let support = department(&pool, "Support").await;
    let pc = computer(&pool, "Dell XPS", false).await;

    let employee = EmployeeRepo::create(&pool, &new_employee("Dee", sales, Some(pc)))
        .await
        .unwrap();

    let replacement = EmployeeInput {
        first_name: "Delia".to_string(),
        last_name: "Renamed".to_string(),
        email: "delia@bangazon.test".to_string(),
        department_id: support,
        computer_id: None,
    };
    let updated = EmployeeRepo::replace(&pool, employee.id, &replacement)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.first_name, "Delia");
    assert_eq!(updated.last_name, "Renamed");
    assert_eq!(updated.email, "delia@bangazon.test");
    assert_eq!(updated.department_id, support);
    assert!(updated.computer_id.is_none(), "omitted computer must be cleared");
    assert!(updated.updated_at >= employee.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_missing_employee_returns_none(pool: PgPool) {
    let dept = department(&pool, "Sales").await;
    let result = EmployeeRepo::replace(&pool, 999_999, &new_employee("Nobody", dept, None))
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_exactly_one(pool: PgPool) {
    let dept = department(&pool, "Sales").await;
    let keep = EmployeeRepo::create(&pool, &new_employee("Keep", dept, None))
        .await
        .unwrap();
    let gone = EmployeeRepo::create(&pool, &new_employee("Gone", dept, None))
        .await
        .unwrap();

    assert!(EmployeeRepo::delete(&pool, gone.id).await.unwrap());
    assert!(!EmployeeRepo::delete(&pool, gone.id).await.unwrap());

    let ids: Vec<i64> = EmployeeRepo::list(&pool)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![keep.id]);
}

// ---------------------------------------------------------------------------
// Test: option lists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_available_options_exclude_assigned_and_decommissioned(pool: PgPool) {
    let dept = department(&pool, "Sales").await;
    let free = computer(&pool, "Free", false).await;
    let taken = computer(&pool, "Taken", false).await;
    let retired = computer(&pool, "Retired", true).await;

    EmployeeRepo::create(&pool, &new_employee("Holder", dept, Some(taken)))
        .await
        .unwrap();

    let values: Vec<i64> = ComputerRepo::list_available_options(&pool)
        .await
        .unwrap()
        .iter()
        .map(|o| o.value)
        .collect();
    assert_eq!(values, vec![free]);
    assert!(!values.contains(&taken));
    assert!(!values.contains(&retired));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_edit_options_include_held_computer(pool: PgPool) {
    let dept = department(&pool, "Sales").await;
    let free = computer(&pool, "A Free", false).await;
    let mine = computer(&pool, "B Mine", false).await;
    let theirs = computer(&pool, "C Theirs", false).await;

    let me = EmployeeRepo::create(&pool, &new_employee("Me", dept, Some(mine)))
        .await
        .unwrap();
    EmployeeRepo::create(&pool, &new_employee("Them", dept, Some(theirs)))
        .await
        .unwrap();

    let options = ComputerRepo::list_options_for_employee(&pool, me.id)
        .await
        .unwrap();
    let values: Vec<i64> = options.iter().map(|o| o.value).collect();
    assert_eq!(values, vec![free, mine]);
    assert_eq!(options[1].text, "B Mine");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_department_options_cover_all_departments(pool: PgPool) {
    let b = department(&pool, "Billing").await;
    let a = department(&pool, "Accounting").await;

    let options = DepartmentRepo::list_options(&pool).await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].text, "Accounting");
    assert_eq!(options[0].value, a);
    assert_eq!(options[1].value, b);
}

// ---------------------------------------------------------------------------
// Test: assignment state and constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_assignment_reports_holder(pool: PgPool) {
    let dept = department(&pool, "Sales").await;
    let pc = computer(&pool, "Surface", false).await;
    let holder = EmployeeRepo::create(&pool, &new_employee("Holder", dept, Some(pc)))
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let state = ComputerRepo::lock_assignment(&mut *tx, pc)
        .await
        .unwrap()
        .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(state.computer_id, pc);
    assert_eq!(state.assigned_employee_id, Some(holder.id));
    assert!(state.decommission_date.is_none());
    assert!(!state.is_available());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_assignment_missing_computer(pool: PgPool) {
    let state = ComputerRepo::lock_assignment(&pool, 999_999).await.unwrap();
    assert!(state.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_computer_assignment_violates_unique(pool: PgPool) {
    let dept = department(&pool, "Sales").await;
    let pc = computer(&pool, "Shared", false).await;

    EmployeeRepo::create(&pool, &new_employee("First", dept, Some(pc)))
        .await
        .unwrap();
    let err = EmployeeRepo::create(&pool, &new_employee("Second", dept, Some(pc)))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_employees_computer_id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_department_violates_foreign_key(pool: PgPool) {
    let err = EmployeeRepo::create(&pool, &new_employee("Orphan", 999_999, None))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.code().as_deref(), Some("23503"));
    assert_eq!(db_err.constraint(), Some("fk_employees_department_id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_transaction_persists_nothing(pool: PgPool) {
    let dept = department(&pool, "Sales").await;

    {
        let mut tx = pool.begin().await.unwrap();
        EmployeeRepo::create(&mut *tx, &new_employee("Ghost", dept, None))
            .await
            .unwrap();
        // Dropped without commit.
    }

    assert_eq!(EmployeeRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_rows_by_id(pool: PgPool) {
    let dept = department(&pool, "Support").await;
    let retired = computer(&pool, "Old Desktop", true).await;

    let found = DepartmentRepo::find_by_id(&pool, dept).await.unwrap().unwrap();
    assert_eq!(found.name, "Support");

    let found = ComputerRepo::find_by_id(&pool, retired).await.unwrap().unwrap();
    assert_eq!(found.model, "Old Desktop");
    assert!(found.decommission_date.is_some());

    assert!(DepartmentRepo::find_by_id(&pool, 999_999).await.unwrap().is_none());
    assert!(ComputerRepo::find_by_id(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_for_update_inside_transaction(pool: PgPool) {
    let dept = department(&pool, "Support").await;
    let id = EmployeeRepo::create(&pool, &new_employee("Lou", dept, None))
        .await
        .unwrap()
        .id;

    let mut tx = pool.begin().await.unwrap();
    let locked = EmployeeRepo::find_for_update(&mut *tx, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(locked.first_name, "Lou");
    assert!(EmployeeRepo::find_for_update(&mut *tx, 999_999)
        .await
        .unwrap()
        .is_none());
    tx.rollback().await.unwrap();
}
