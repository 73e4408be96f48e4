//! Domain types and rules for the Bangazon employees service.
//!
//! This crate has no I/O: it holds the shared id/timestamp aliases, the
//! domain error type, the computer-assignment rule, and anti-forgery token
//! signing so both the repository and HTTP layers can use them.

pub mod anti_forgery;
pub mod assignment;
pub mod error;
pub mod types;
