//! Computer-to-employee assignment rule.
//!
//! A computer may be held by at most one employee, and decommissioned
//! computers cannot be handed out. The repository layer loads the current
//! state of the computer (under a row lock) and asks [`ensure_assignable`]
//! whether the write may proceed.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Snapshot of a computer's assignment state at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerAssignment {
    pub computer_id: DbId,
    /// `None` means the computer is still in service.
    pub decommission_date: Option<Timestamp>,
    /// The employee currently holding the computer, if any.
    pub assigned_employee_id: Option<DbId>,
}

impl ComputerAssignment {
    /// True when the computer can be offered to an employee who does not
    /// already hold it.
    pub fn is_available(&self) -> bool {
        self.decommission_date.is_none() && self.assigned_employee_id.is_none()
    }

    /// True when `employee_id` is the current holder.
    pub fn is_held_by(&self, employee_id: Option<DbId>) -> bool {
        employee_id.is_some() && self.assigned_employee_id == employee_id
    }
}

/// Check that `computer` may be assigned to `employee_id`.
///
/// `employee_id` is `None` for an employee that does not exist yet (create).
/// Re-saving an employee with the computer they already hold always passes,
/// even if that computer has since been decommissioned.
pub fn ensure_assignable(
    computer: &ComputerAssignment,
    employee_id: Option<DbId>,
) -> Result<(), CoreError> {
    if computer.is_held_by(employee_id) {
        return Ok(());
    }

    if computer.decommission_date.is_some() {
        return Err(CoreError::Validation(format!(
            "Computer {} is decommissioned and cannot be assigned",
            computer.computer_id
        )));
    }

    if let Some(holder) = computer.assigned_employee_id {
        return Err(CoreError::Conflict(format!(
            "Computer {} is already assigned to employee {holder}",
            computer.computer_id
        )));
    }

    Ok(())
}
