//! Repository for the `departments` table.

use bangazon_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::department::{CreateDepartment, Department};
use crate::models::select_option::SelectOption;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides lookups for departments.
pub struct DepartmentRepo;

impl DepartmentRepo {
    /// Insert a new department, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDepartment,
    ) -> Result<Department, sqlx::Error> {
        let query = format!("INSERT INTO departments (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Department>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a department by ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a department by ID and hold a key-share lock on it until the
    /// surrounding transaction ends, so it cannot be deleted underneath a
    /// pending employee write.
    pub async fn find_for_key_share(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1 FOR KEY SHARE");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Every department as a dropdown option (`text = name`, `value = id`).
    pub async fn list_options(pool: &PgPool) -> Result<Vec<SelectOption>, sqlx::Error> {
        sqlx::query_as::<_, SelectOption>(
            "SELECT name AS text, id AS value FROM departments ORDER BY name, id",
        )
        .fetch_all(pool)
        .await
    }
}
