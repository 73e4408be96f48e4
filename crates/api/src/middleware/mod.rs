//! Request middleware.
//!
//! - [`anti_forgery::require_anti_forgery_token`] -- Rejects unsafe-method
//!   requests that do not carry a valid anti-forgery token.

pub mod anti_forgery;
