//! Dashboard aggregate handler.

use axum::{Json, extract::{Extension, State}};

use crate::{
    error::Result,
    middleware::auth::AuthenticatedUser,
    models::requests::DashboardResponse,
    services::workshops,
    state::AppState,
};

use super::workshops::acquire_db_connection;

/// GET /dashboard/
///
/// Aggregates over the workshop dataset (auth required):
/// year-wise counts, totals, top states/categories, and the acting user's
/// 20 most recent workshops (all workshops for superusers).
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardResponse>> {
    let mut conn = acquire_db_connection(&state, "dashboard").await?;

    let result = workshops::dashboard(&mut conn, auth_user.id, auth_user.is_superuser).await?;

    Ok(Json(result))
}
