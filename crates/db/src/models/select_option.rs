//! Dropdown option pairs.

use bangazon_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// One `<option>` of a select list: the label shown to the user and the id
/// submitted back.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct SelectOption {
    pub text: String,
    pub value: DbId,
}
