//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Read-only
//! listings take `&PgPool`; methods that participate in a write transaction
//! take any Postgres executor so callers can pass `&mut *tx`.

pub mod computer_repo;
pub mod department_repo;
pub mod employee_repo;

pub use computer_repo::ComputerRepo;
pub use department_repo::DepartmentRepo;
pub use employee_repo::EmployeeRepo;
