//! Repository for the `employees` table.

use bangazon_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::employee::{Employee, EmployeeDetail, EmployeeDetailRow, EmployeeInput};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, first_name, last_name, email, computer_id, department_id, created_at, updated_at";

/// Employee columns plus the joined department and computer columns.
const DETAIL_SELECT: &str = "SELECT e.id, e.first_name, e.last_name, e.email, e.computer_id, \
    e.department_id, e.created_at, e.updated_at, \
    d.name AS department_name, \
    c.model AS computer_model, c.decommission_date AS computer_decommission_date \
    FROM employees e \
    JOIN departments d ON d.id = e.department_id \
    LEFT JOIN computers c ON c.id = e.computer_id";

/// Provides CRUD operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee, returning the created row.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &EmployeeInput,
    ) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees (first_name, last_name, email, department_id, computer_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(input.department_id)
            .bind(input.computer_id)
            .fetch_one(executor)
            .await
    }

    /// Find an employee row by ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an employee row by ID and lock it until the surrounding
    /// transaction ends.
    pub async fn find_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an employee by ID with its department and computer joined.
    pub async fn find_detail_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EmployeeDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE e.id = $1");
        let row = sqlx::query_as::<_, EmployeeDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(EmployeeDetail::from))
    }

    /// List every employee with department and computer joined, ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<EmployeeDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} ORDER BY e.id");
        let rows = sqlx::query_as::<_, EmployeeDetailRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(EmployeeDetail::from).collect())
    }

    /// Replace every writable field of an employee.
    ///
    /// Unlike a patch, `None` in `input.computer_id` clears the assignment.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn replace(
        executor: impl PgExecutor<'_>,
        id: DbId,
        input: &EmployeeInput,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET
                first_name = $2,
                last_name = $3,
                email = $4,
                department_id = $5,
                computer_id = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(input.department_id)
            .bind(input.computer_id)
            .fetch_optional(executor)
            .await
    }

    /// Permanently delete an employee by ID. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all employee rows.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
