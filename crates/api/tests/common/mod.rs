#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response};
use axum::Router;
use bangazon_api::config::ServerConfig;
use bangazon_api::middleware::anti_forgery::{
    AntiForgeryConfig, COOKIE_NAME, TOKEN_FIELD, TOKEN_HEADER,
};
use bangazon_api::router::build_app_router;
use bangazon_api::state::AppState;
use bangazon_core::anti_forgery::{self, AntiForgeryKey};
use bangazon_db::models::computer::CreateComputer;
use bangazon_db::models::department::CreateDepartment;
use bangazon_db::models::employee::EmployeeInput;
use bangazon_db::repositories::{ComputerRepo, DepartmentRepo, EmployeeRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Secret shared by the test app and [`test_key`].
pub const TEST_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        anti_forgery: AntiForgeryConfig {
            secret: TEST_SECRET.to_string(),
            token_ttl_mins: 120,
        },
    }
}

/// A key that signs tokens the test app accepts.
pub fn test_key() -> AntiForgeryKey {
    test_config().anti_forgery.key()
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// GET with the anti-forgery cookie set to `nonce`.
pub async fn get_with_cookie(app: Router, uri: &str, nonce: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(COOKIE, format!("{COOKIE_NAME}={nonce}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a form body as a client holding a fresh anti-forgery cookie, with a
/// matching token in the `__RequestVerificationToken` field.
pub async fn post_form(app: Router, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let nonce = anti_forgery::new_nonce();
    let token = test_key().issue(&nonce);
    let mut fields: Vec<(&str, &str)> = fields.to_vec();
    fields.push((TOKEN_FIELD, &token));
    post_form_raw(app, uri, &encode_form(&fields), None, Some(&nonce)).await
}

/// POST a pre-encoded form body, optionally sending a token header and the
/// anti-forgery cookie.
pub async fn post_form_raw(
    app: Router,
    uri: &str,
    body: &str,
    header_token: Option<&str>,
    cookie_nonce: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = header_token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    if let Some(nonce) = cookie_nonce {
        builder = builder.header(COOKIE, format!("{COOKIE_NAME}={nonce}"));
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Join `key=value` pairs. Test values stay within URL-safe characters.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The anti-forgery nonce a response sets via `Set-Cookie`, if any.
pub fn set_cookie_nonce(response: &Response<Body>) -> Option<String> {
    let prefix = format!("{COOKIE_NAME}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn seed_department(pool: &PgPool, name: &str) -> i64 {
    DepartmentRepo::create(
        pool,
        &CreateDepartment {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_computer(pool: &PgPool, model: &str, decommissioned: bool) -> i64 {
    ComputerRepo::create(
        pool,
        &CreateComputer {
            model: model.to_string(),
            decommission_date: decommissioned.then(chrono::Utc::now),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_employee(
    pool: &PgPool,
    first_name: &str,
    department_id: i64,
    computer_id: Option<i64>,
) -> i64 {
    EmployeeRepo::create(
        pool,
        &EmployeeInput {
            first_name: first_name.to_string(),
            last_name: "Seeded".to_string(),
            email: format!("{}@bangazon.test", first_name.to_lowercase()),
            department_id,
            computer_id,
        },
    )
    .await
    .unwrap()
    .id
}
