//! Repository for the `computers` table.

use bangazon_core::assignment::ComputerAssignment;
use bangazon_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::computer::{Computer, ComputerAssignmentRow, CreateComputer};
use crate::models::select_option::SelectOption;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, model, decommission_date, created_at, updated_at";

/// Provides lookups and assignment-state queries for computers.
pub struct ComputerRepo;

impl ComputerRepo {
    /// Insert a new computer, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComputer) -> Result<Computer, sqlx::Error> {
        let query = format!(
            "INSERT INTO computers (model, decommission_date)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Computer>(&query)
            .bind(&input.model)
            .bind(input.decommission_date)
            .fetch_one(pool)
            .await
    }

    /// Find a computer by ID.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Computer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM computers WHERE id = $1");
        sqlx::query_as::<_, Computer>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Computers that can be handed to a new employee: in service and not
    /// held by anyone.
    pub async fn list_available_options(pool: &PgPool) -> Result<Vec<SelectOption>, sqlx::Error> {
        sqlx::query_as::<_, SelectOption>(
            "SELECT c.model AS text, c.id AS value
             FROM computers c
             WHERE c.decommission_date IS NULL
               AND NOT EXISTS (SELECT 1 FROM employees e WHERE e.computer_id = c.id)
             ORDER BY c.model, c.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Options for editing `employee_id`: every available computer plus the
    /// one the employee already holds (even if it has been decommissioned).
    pub async fn list_options_for_employee(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<Vec<SelectOption>, sqlx::Error> {
        sqlx::query_as::<_, SelectOption>(
            "SELECT c.model AS text, c.id AS value
             FROM computers c
             LEFT JOIN employees e ON e.computer_id = c.id
             WHERE (c.decommission_date IS NULL AND e.id IS NULL)
                OR e.id = $1
             ORDER BY c.model, c.id",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await
    }

    /// Load a computer's assignment state and lock the computer row until the
    /// surrounding transaction ends.
    ///
    /// Concurrent writers assigning the same computer serialize on this lock.
    /// After waiting, Postgres re-reads only the computer row, so a holder
    /// committed in the meantime can be missing from the result. The
    /// `uq_employees_computer_id` constraint is what finally rejects it.
    pub async fn lock_assignment(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<ComputerAssignment>, sqlx::Error> {
        let row = sqlx::query_as::<_, ComputerAssignmentRow>(
            "SELECT c.id AS computer_id, c.decommission_date, e.id AS assigned_employee_id
             FROM computers c
             LEFT JOIN employees e ON e.computer_id = c.id
             WHERE c.id = $1
             FOR UPDATE OF c",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(ComputerAssignment::from))
    }
}
