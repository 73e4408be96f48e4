//! Anti-forgery token enforcement for form posts.
//!
//! Form views set the [`COOKIE_NAME`] cookie (see [`AntiForgeryCookie`]) and
//! embed a token issued for the cookie's nonce. A POST must send the cookie
//! back together with a matching token, either in the
//! `RequestVerificationToken` header or in the `__RequestVerificationToken`
//! form field.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{Form, FromRequest, FromRequestParts, Request, State};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponseParts, Response, ResponseParts};
use bangazon_core::anti_forgery::{self, AntiForgeryKey, DEFAULT_TOKEN_TTL_MINS};
use bangazon_core::error::CoreError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the token for script-driven submissions.
pub const TOKEN_HEADER: HeaderName = HeaderName::from_static("requestverificationtoken");

/// Form field carrying the token for plain HTML form posts.
pub const TOKEN_FIELD: &str = "__RequestVerificationToken";

/// Cookie holding the client's anti-forgery nonce.
pub const COOKIE_NAME: &str = "bangazon.antiforgery";

/// Largest form body buffered while looking for the token field.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Configuration for anti-forgery token signing.
#[derive(Debug, Clone)]
pub struct AntiForgeryConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in minutes (default: 120).
    pub token_ttl_mins: i64,
}

impl AntiForgeryConfig {
    /// Load anti-forgery configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `ANTI_FORGERY_SECRET`    | **yes**  | --      |
    /// | `ANTI_FORGERY_TTL_MINS`  | no       | `120`   |
    ///
    /// # Panics
    ///
    /// Panics if `ANTI_FORGERY_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("ANTI_FORGERY_SECRET")
            .expect("ANTI_FORGERY_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "ANTI_FORGERY_SECRET must not be empty");

        let token_ttl_mins: i64 = std::env::var("ANTI_FORGERY_TTL_MINS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_MINS);

        Self {
            secret,
            token_ttl_mins,
        }
    }

    /// Build the signing key described by this configuration.
    pub fn key(&self) -> AntiForgeryKey {
        AntiForgeryKey::new(&self.secret, chrono::Duration::minutes(self.token_ttl_mins))
    }
}

/// The client's anti-forgery nonce, read from [`COOKIE_NAME`] or freshly
/// generated when the request carries none.
///
/// Returned as a response part, it sets the cookie only when the nonce is
/// new, so a client keeps one nonce across forms:
///
/// ```ignore
/// async fn form(cookie: AntiForgeryCookie, State(state): State<AppState>) -> impl IntoResponse {
///     let token = cookie.token(&state.anti_forgery);
///     (cookie, Json(token))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AntiForgeryCookie {
    pub nonce: String,
    /// `true` when the nonce was generated for this response.
    pub fresh: bool,
}

impl AntiForgeryCookie {
    /// Issue a form token bound to this client's nonce.
    pub fn token(&self, key: &AntiForgeryKey) -> String {
        key.issue(&self.nonce)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AntiForgeryCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(match cookie_nonce(&parts.headers) {
            Some(nonce) => Self {
                nonce,
                fresh: false,
            },
            None => Self {
                nonce: anti_forgery::new_nonce(),
                fresh: true,
            },
        })
    }
}

impl IntoResponseParts for AntiForgeryCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.fresh {
            let cookie = format!("{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Strict", self.nonce);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                res.headers_mut().append(SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}

#[derive(Deserialize)]
struct TokenField {
    #[serde(rename = "__RequestVerificationToken")]
    token: Option<String>,
}

/// Middleware: verify the anti-forgery token on every non-safe request.
///
/// GET/HEAD/OPTIONS pass straight through. For other methods the header is
/// checked first; failing that, the body is buffered, searched for the form
/// field, and handed on intact to the handler. The token must name the nonce
/// in the client's cookie.
pub async fn require_anti_forgery_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if request.method().is_safe() {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();

    let (token, body) = match header_token(&parts.headers) {
        Some(token) => (Some(token), body),
        None => {
            let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
                .await
                .map_err(|_| AppError::BadRequest("Form body too large".into()))?;
            let token = form_token(&parts.headers, &bytes).await;
            (token, Body::from(bytes))
        }
    };

    let cookie = cookie_nonce(&parts.headers);
    if let Err(err) = state
        .anti_forgery
        .verify(token.as_deref().unwrap_or_default(), cookie.as_deref())
    {
        tracing::warn!(
            method = %parts.method,
            uri = %parts.uri,
            reason = %err,
            "Rejected request without valid anti-forgery token"
        );
        return Err(AppError::Core(CoreError::Forbidden(err.to_string())));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The nonce from the [`COOKIE_NAME`] cookie, if present and well formed.
fn cookie_nonce(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.trim())
        .filter(|value| anti_forgery::is_nonce(value))
        .map(str::to_string)
}

/// Pull the token field out of a buffered `application/x-www-form-urlencoded`
/// body. Any other content type yields `None`.
async fn form_token(headers: &HeaderMap, bytes: &Bytes) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.clone();
    let request = Request::builder()
        .method(Method::POST)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes.clone()))
        .ok()?;

    let Form(field) = Form::<TokenField>::from_request(request, &()).await.ok()?;
    field.token
}
