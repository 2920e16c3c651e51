//! Authentication handlers: account registration, login and logout.
//!
//! Handlers follow the thin-layer pattern: they validate inputs, delegate
//! to services, and return responses.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Response},
};

use crate::{
    error::{Error, Result},
    models::users::{LoginUser, RegisterUser},
    services::{
        cookies::{CookieConfig, build_access_token_cookie, build_clear_cookie},
        users,
    },
    state::AppState,
};

/// Custom response type that attaches a Set-Cookie header to a JSON body
pub struct CookieResponse {
    json_body: serde_json::Value,
    cookie: String,
}

impl IntoResponse for CookieResponse {
    fn into_response(self) -> Response {
        let mut response = Json(self.json_body).into_response();
        if let Ok(cookie) = HeaderValue::from_str(&self.cookie) {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        response
    }
}

fn cookie_config(state: &AppState) -> CookieConfig {
    CookieConfig {
        secure: state.config.auth.secure_cookies,
        max_age_seconds: state.config.auth.access_token_minutes * 60,
        ..CookieConfig::default()
    }
}

/// POST /auth/register/
///
/// Registers a new account with username, email and password.
///
/// # HTTP Status Codes
/// - `200 OK`: User registered successfully
/// - `400 BAD_REQUEST`: Validation error
/// - `409 CONFLICT`: Username or email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await.map_err(|e| {
        Error::Internal(format!("Failed to acquire database connection: {}", e))
    })?;

    let user = users::register_user(&mut conn, request).await?;

    Ok(Json(serde_json::json!({
        "user": user
    })))
}

/// GET /login/
///
/// Describes the credential payload the POST handler expects.
pub async fn login_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "fields": {
            "identifier": "Email or Username",
            "password": "Password",
        }
    }))
}

/// POST /login/
///
/// Authenticates a user by username or email.
///
/// On success the JSON body carries the user and access token, and the
/// token is also set as an `access_token` cookie for browser clients.
/// Every failure is answered with the same generic message, whether the
/// account is unknown or the password wrong.
///
/// # HTTP Status Codes
/// - `200 OK`: Authentication successful
/// - `401 UNAUTHORIZED`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginUser>,
) -> Result<CookieResponse> {
    let mut conn = state.pool.acquire().await.map_err(|e| {
        Error::Internal(format!("Failed to acquire database connection: {}", e))
    })?;

    let login_result = users::login_user(&mut conn, request, &state.config.auth).await?;

    let cookie = build_access_token_cookie(&login_result.access_token, &cookie_config(&state));

    Ok(CookieResponse {
        json_body: serde_json::json!({
            "user": login_result.user,
            "access_token": login_result.access_token,
            "access_token_expires_at": login_result.access_token_expires_at,
        }),
        cookie,
    })
}

/// POST /logout/
///
/// Clears the access token cookie. Tokens are stateless, so there is
/// nothing to revoke server-side.
pub async fn logout(State(state): State<AppState>) -> CookieResponse {
    CookieResponse {
        json_body: serde_json::json!({
            "message": "Logged out"
        }),
        cookie: build_clear_cookie(&cookie_config(&state)),
    }
}
