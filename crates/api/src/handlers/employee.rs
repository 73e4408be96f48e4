//! Handlers for the `/Employees` resource.
//!
//! GET endpoints return view models in the `{ "data": ... }` envelope; form
//! views also set the anti-forgery cookie their token is bound to. POST
//! endpoints redirect to the list on success; on failure they return the
//! classified error together with the form re-bound to the submitted values.

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use bangazon_core::assignment;
use bangazon_core::error::CoreError;
use bangazon_core::types::DbId;
use bangazon_db::models::employee::{Employee, EmployeeDetail, EmployeeInput};
use bangazon_db::models::select_option::SelectOption;
use bangazon_db::repositories::{ComputerRepo, DepartmentRepo, EmployeeRepo};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult, FormFailure};
use crate::form::EmployeeForm;
use crate::middleware::anti_forgery::AntiForgeryCookie;
use crate::response::DataResponse;
use crate::state::AppState;

/// Where successful writes send the client.
pub const LIST_PATH: &str = "/Employees";

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// The create/edit form: current field values plus the dropdown options.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeFormView {
    /// `None` on the create form.
    pub employee_id: Option<DbId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<DbId>,
    pub computer_id: Option<DbId>,
    pub computer_options: Vec<SelectOption>,
    pub department_options: Vec<SelectOption>,
    pub anti_forgery_token: String,
}

/// The delete confirmation page.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteView {
    pub employee: EmployeeDetail,
    pub anti_forgery_token: String,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /Employees
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EmployeeDetail>>>> {
    let employees = EmployeeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: employees }))
}

/// GET /Employees/Details/{id}
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EmployeeDetail>>> {
    let employee = find_detail(&state.pool, id).await?;
    Ok(Json(DataResponse { data: employee }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// GET /Employees/Create
pub async fn create_form(
    State(state): State<AppState>,
    cookie: AntiForgeryCookie,
) -> AppResult<(AntiForgeryCookie, Json<DataResponse<EmployeeFormView>>)> {
    let view = build_form(&state, &cookie, None, None).await?;
    Ok((cookie, Json(DataResponse { data: view })))
}

/// POST /Employees/Create
pub async fn create(
    State(state): State<AppState>,
    cookie: AntiForgeryCookie,
    Form(form): Form<EmployeeForm>,
) -> Result<Redirect, FormFailure<EmployeeFormView>> {
    let input = EmployeeInput::from(form);

    match insert_employee(&state.pool, &input).await {
        Ok(employee) => {
            tracing::info!(
                employee_id = employee.id,
                department_id = employee.department_id,
                computer_id = ?employee.computer_id,
                "Employee created"
            );
            Ok(Redirect::to(LIST_PATH))
        }
        Err(error) => {
            tracing::warn!(error = %error, "Employee create rejected");
            Err(form_failure(&state, &cookie, None, &input, error).await)
        }
    }
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// GET /Employees/Edit/{id}
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    cookie: AntiForgeryCookie,
) -> AppResult<(AntiForgeryCookie, Json<DataResponse<EmployeeFormView>>)> {
    let employee = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;

    let input = EmployeeInput::from(&employee);
    let view = build_form(&state, &cookie, Some(id), Some(&input)).await?;
    Ok((cookie, Json(DataResponse { data: view })))
}

/// POST /Employees/Edit/{id}
///
/// Full replace: every writable field takes the submitted value, so an
/// omitted computer clears the assignment.
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    cookie: AntiForgeryCookie,
    Form(form): Form<EmployeeForm>,
) -> Result<Redirect, FormFailure<EmployeeFormView>> {
    let input = EmployeeInput::from(form);

    match replace_employee(&state.pool, id, &input).await {
        Ok(employee) => {
            tracing::info!(
                employee_id = employee.id,
                department_id = employee.department_id,
                computer_id = ?employee.computer_id,
                "Employee updated"
            );
            Ok(Redirect::to(LIST_PATH))
        }
        Err(error) => {
            tracing::warn!(employee_id = id, error = %error, "Employee update rejected");
            Err(form_failure(&state, &cookie, Some(id), &input, error).await)
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// GET /Employees/Delete/{id}
pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    cookie: AntiForgeryCookie,
) -> AppResult<(AntiForgeryCookie, Json<DataResponse<DeleteView>>)> {
    let employee = find_detail(&state.pool, id).await?;
    let anti_forgery_token = cookie.token(&state.anti_forgery);
    Ok((
        cookie,
        Json(DataResponse {
            data: DeleteView {
                employee,
                anti_forgery_token,
            },
        }),
    ))
}

/// POST /Employees/Delete/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Redirect> {
    let deleted = EmployeeRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(not_found(id));
    }

    tracing::info!(employee_id = id, "Employee deleted");
    Ok(Redirect::to(LIST_PATH))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Employee",
        id,
    })
}

async fn find_detail(pool: &PgPool, id: DbId) -> AppResult<EmployeeDetail> {
    EmployeeRepo::find_detail_by_id(pool, id)
        .await?
        .ok_or(not_found(id))
}

/// Build the form view for `employee_id` (or the create form when `None`),
/// pre-filled with `values` when given.
async fn build_form(
    state: &AppState,
    cookie: &AntiForgeryCookie,
    employee_id: Option<DbId>,
    values: Option<&EmployeeInput>,
) -> AppResult<EmployeeFormView> {
    let computer_options = match employee_id {
        Some(id) => ComputerRepo::list_options_for_employee(&state.pool, id).await?,
        None => ComputerRepo::list_available_options(&state.pool).await?,
    };
    let department_options = DepartmentRepo::list_options(&state.pool).await?;

    Ok(EmployeeFormView {
        employee_id,
        first_name: values.map(|v| v.first_name.clone()).unwrap_or_default(),
        last_name: values.map(|v| v.last_name.clone()).unwrap_or_default(),
        email: values.map(|v| v.email.clone()).unwrap_or_default(),
        department_id: values.map(|v| v.department_id),
        computer_id: values.and_then(|v| v.computer_id),
        computer_options,
        department_options,
        anti_forgery_token: cookie.token(&state.anti_forgery),
    })
}

/// Wrap a write error with the form re-bound to the submitted values.
async fn form_failure(
    state: &AppState,
    cookie: &AntiForgeryCookie,
    employee_id: Option<DbId>,
    input: &EmployeeInput,
    error: AppError,
) -> FormFailure<EmployeeFormView> {
    let form = match build_form(state, cookie, employee_id, Some(input)).await {
        Ok(view) => Some(view),
        Err(rebuild_err) => {
            tracing::error!(error = %rebuild_err, "Failed to rebuild employee form");
            None
        }
    };
    FormFailure { error, form }
}

/// Insert a new employee after checking its references, in one transaction.
async fn insert_employee(pool: &PgPool, input: &EmployeeInput) -> AppResult<Employee> {
    let mut tx = pool.begin().await?;

    check_references(&mut *tx, input, None).await?;
    let employee = EmployeeRepo::create(&mut *tx, input).await?;

    tx.commit().await?;
    Ok(employee)
}

/// Replace an existing employee after checking its references, in one
/// transaction. Dropping `tx` on any error rolls back.
async fn replace_employee(pool: &PgPool, id: DbId, input: &EmployeeInput) -> AppResult<Employee> {
    let mut tx = pool.begin().await?;

    EmployeeRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or(not_found(id))?;
    check_references(&mut *tx, input, Some(id)).await?;
    let employee = EmployeeRepo::replace(&mut *tx, id, input)
        .await?
        .ok_or(not_found(id))?;

    tx.commit().await?;
    Ok(employee)
}

/// Verify the department exists and the computer (if any) may be assigned to
/// `employee_id`. Both rows stay locked until the transaction ends.
async fn check_references(
    conn: &mut PgConnection,
    input: &EmployeeInput,
    employee_id: Option<DbId>,
) -> AppResult<()> {
    DepartmentRepo::find_for_key_share(&mut *conn, input.department_id)
        .await?
        .ok_or_else(|| {
            CoreError::Validation(format!("Department {} does not exist", input.department_id))
        })?;

    if let Some(computer_id) = input.computer_id {
        let computer = ComputerRepo::lock_assignment(&mut *conn, computer_id)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!("Computer {computer_id} does not exist"))
            })?;
        assignment::ensure_assignable(&computer, employee_id)?;
    }

    Ok(())
}
