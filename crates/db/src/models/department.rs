//! Department entity model and DTOs.

use bangazon_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A department row from the `departments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new department.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
}
