//! JWT authentication middleware
//!
//! This module provides middleware for validating access tokens and adding
//! the authenticated user to request extensions.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::users::User,
    queries,
    services::cookies::{ACCESS_TOKEN_COOKIE, authenticate_jwt_token_multi_source, extract_cookie_value},
    state::AppState,
};

/// Authenticated user extracted from the access token
///
/// This struct is added to request extensions by the auth middleware
/// after successful validation.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// User's email address
    pub email: String,
    /// User's full name (optional)
    pub full_name: Option<String>,
    /// Whether the user holds superuser rights
    pub is_superuser: bool,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_superuser: user.is_superuser,
        }
    }
}

/// Authentication middleware for protected routes
///
/// Validates the JWT from the Authorization header (API clients) or the
/// `access_token` cookie (browser clients), resolves the account, and adds
/// an [`AuthenticatedUser`] to the request extensions. Requests without a
/// valid token are answered with 401.
///
/// Apply to protected routes using `route_layer()`:
///
/// ```ignore
/// Router::new()
///     .route("/dashboard/", get(dashboard))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
    let cookie_header = headers.get("cookie").and_then(|h| h.to_str().ok());
    let access_token = cookie_header.and_then(|h| extract_cookie_value(h, ACCESS_TOKEN_COOKIE));

    let user_id = authenticate_jwt_token_multi_source(
        auth_header,
        access_token.as_deref(),
        state.config.auth.jwt_secret.expose_secret(),
    )?;

    let mut conn = state.pool.acquire().await?;
    let user = queries::users::get_user_by_id(&mut conn, user_id)
        .await?
        .ok_or_else(|| Error::Authentication("User not found".to_string()))?;

    request.extensions_mut().insert(AuthenticatedUser::from(user));
    Ok(next.run(request).await)
}
