//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` input DTO for inserts (and, for employees, full replaces)

pub mod computer;
pub mod department;
pub mod employee;
pub mod select_option;
