//! Employee entity model, joined read model, and DTOs.

use bangazon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An employee row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub computer_id: Option<DbId>,
    pub department_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for writing an employee.
///
/// Used for both inserts and updates. Updates are full replaces: a `None`
/// `computer_id` clears the assignment rather than keeping the old one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: DbId,
    pub computer_id: Option<DbId>,
}

impl From<&Employee> for EmployeeInput {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            department_id: employee.department_id,
            computer_id: employee.computer_id,
        }
    }
}

/// The department an employee belongs to, as embedded in [`EmployeeDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentSummary {
    pub id: DbId,
    pub name: String,
}

/// The computer an employee holds, as embedded in [`EmployeeDetail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputerSummary {
    pub id: DbId,
    pub model: String,
    pub decommission_date: Option<Timestamp>,
}

/// An employee with its department and computer eagerly joined.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDetail {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub computer_id: Option<DbId>,
    pub department_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub department: DepartmentSummary,
    pub computer: Option<ComputerSummary>,
}

/// Flat row produced by the employee/department/computer join.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeDetailRow {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub computer_id: Option<DbId>,
    pub department_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub department_name: String,
    pub computer_model: Option<String>,
    pub computer_decommission_date: Option<Timestamp>,
}

impl From<EmployeeDetailRow> for EmployeeDetail {
    fn from(row: EmployeeDetailRow) -> Self {
        // computer_model is NOT NULL in the table, so it is only absent when
        // the LEFT JOIN found nothing.
        let computer = match (row.computer_id, row.computer_model) {
            (Some(id), Some(model)) => Some(ComputerSummary {
                id,
                model,
                decommission_date: row.computer_decommission_date,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            computer_id: row.computer_id,
            department_id: row.department_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            department: DepartmentSummary {
                id: row.department_id,
                name: row.department_name,
            },
            computer,
        }
    }
}
