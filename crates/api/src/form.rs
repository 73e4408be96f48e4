//! Form-encoded request bodies.

use std::fmt;
use std::str::FromStr;

use bangazon_core::types::DbId;
use bangazon_db::models::employee::EmployeeInput;
use serde::{de, Deserialize, Deserializer};

/// Fields posted by the employee create and edit forms.
///
/// An unselected computer dropdown posts `computer_id=`, which is read as
/// "no computer".
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: DbId,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub computer_id: Option<DbId>,
}

impl From<EmployeeForm> for EmployeeInput {
    fn from(form: EmployeeForm) -> Self {
        Self {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            department_id: form.department_id,
            computer_id: form.computer_id,
        }
    }
}

/// Deserialize an optional value, treating a missing field or an empty
/// string as `None`.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}
