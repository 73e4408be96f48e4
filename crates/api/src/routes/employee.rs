//! Route definitions for the `/Employees` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::employee;
use crate::state::AppState;

/// Employee routes, mounted at the root.
///
/// ```text
/// GET    /Employees                -> list
/// GET    /Employees/Index          -> list
/// GET    /Employees/Details/{id}   -> details
/// GET    /Employees/Create         -> create_form
/// POST   /Employees/Create         -> create
/// GET    /Employees/Edit/{id}      -> edit_form
/// POST   /Employees/Edit/{id}      -> edit
/// GET    /Employees/Delete/{id}    -> delete_form
/// POST   /Employees/Delete/{id}    -> delete
/// ```
///
/// POST routes require an anti-forgery token; the layer is applied in
/// [`crate::router::build_app_router`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/Employees", get(employee::list))
        .route("/Employees/Index", get(employee::list))
        .route("/Employees/Details/{id}", get(employee::details))
        .route(
            "/Employees/Create",
            get(employee::create_form).post(employee::create),
        )
        .route(
            "/Employees/Edit/{id}",
            get(employee::edit_form).post(employee::edit),
        )
        .route(
            "/Employees/Delete/{id}",
            get(employee::delete_form).post(employee::delete),
        )
}
