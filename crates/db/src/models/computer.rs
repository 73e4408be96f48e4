//! Computer entity model and DTOs.

use bangazon_core::assignment::ComputerAssignment;
use bangazon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A computer row from the `computers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Computer {
    pub id: DbId,
    pub model: String,
    pub decommission_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new computer. Omit `decommission_date` for an
/// in-service machine.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComputer {
    pub model: String,
    pub decommission_date: Option<Timestamp>,
}

/// A computer joined with the employee currently holding it.
#[derive(Debug, Clone, FromRow)]
pub struct ComputerAssignmentRow {
    pub computer_id: DbId,
    pub decommission_date: Option<Timestamp>,
    pub assigned_employee_id: Option<DbId>,
}

impl From<ComputerAssignmentRow> for ComputerAssignment {
    fn from(row: ComputerAssignmentRow) -> Self {
        ComputerAssignment {
            computer_id: row.computer_id,
            decommission_date: row.decommission_date,
            assigned_employee_id: row.assigned_employee_id,
        }
    }
}
