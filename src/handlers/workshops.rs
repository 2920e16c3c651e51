//! Workshop CRUD handlers
//!
//! This module provides HTTP handlers for the workshop listing, detail,
//! create and edit routes. Handlers follow the thin-layer pattern: they
//! validate inputs, delegate to services, and return responses.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    middleware::{auth::AuthenticatedUser, workshop_access::WorkshopAccess},
    models::{
        requests::{ListQuery, WorkshopDetailResponse, WorkshopForm, WorkshopListResponse},
        workshops::Workshop,
    },
    queries,
    services::workshops,
    state::AppState,
};

// ============================================================================
// LISTING & DETAIL
// ============================================================================

/// GET /workshops/
///
/// Filtered, paginated listing.
///
/// # Query Parameters
/// - `tab`: live | completed | upcoming (default upcoming)
/// - `topic`: substring match on title or topic
/// - `location`: substring match on city, institute or state
/// - `mode`: physical | online (other values ignored)
/// - `start` / `end`: date-range bounds on start_date / end_date
/// - `page`: 1-based page number, 10 records per page
pub async fn list_workshops(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WorkshopListResponse>> {
    let mut conn = acquire_db_connection(&state, "list_workshops").await?;

    let result = workshops::list_workshops(&mut conn, &query).await?;

    Ok(Json(result))
}

/// GET /workshops/{id}/
///
/// Workshop detail with its photo and document sets.
pub async fn get_workshop(
    State(state): State<AppState>,
    Path(workshop_id): Path<Uuid>,
) -> Result<Json<WorkshopDetailResponse>> {
    let mut conn = acquire_db_connection(&state, "get_workshop").await?;

    let result = workshops::get_workshop_detail(&mut conn, workshop_id).await?;

    Ok(Json(result))
}

// ============================================================================
// CREATE
// ============================================================================

/// GET /workshops/new/
///
/// Field defaults and enum choices for the create form.
pub async fn new_workshop_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "defaults": {
            "status": "upcoming",
            "participants_count": 0,
        },
        "modes": ["physical", "online"],
        "statuses": ["upcoming", "live", "completed"],
    }))
}

/// POST /workshops/new/
///
/// Creates a workshop with the authenticated user as coordinator.
///
/// # HTTP Status Codes
/// - `200 OK`: Workshop created successfully
/// - `400 BAD_REQUEST`: Validation error
/// - `401 UNAUTHORIZED`: Missing or invalid token
pub async fn create_workshop(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(form): Json<WorkshopForm>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "create_workshop",
        user_id = %auth_user.id,
        title = %form.title,
        "Creating workshop",
    );

    let mut conn = acquire_db_connection(&state, "create_workshop").await?;

    let workshop = workshops::create_workshop(
        &mut conn,
        &state.storage,
        auth_user.id,
        &auth_user.email,
        form,
    )
    .await
    .inspect_err(|e| log_handler_error("create_workshop", e))?;

    Ok(Json(serde_json::json!({
        "workshop": workshop,
        "message": "Workshop created successfully",
    })))
}

// ============================================================================
// EDIT
// ============================================================================

/// GET /workshops/{id}/edit/
///
/// The editable record, for pre-filling the edit form.
/// Requires coordinator or superuser (enforced by middleware).
pub async fn edit_workshop_form(
    State(state): State<AppState>,
    Extension(access): Extension<WorkshopAccess>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "edit_workshop_form").await?;

    let workshop = load_workshop(&mut conn, access.workshop_id).await?;

    Ok(Json(serde_json::json!({
        "workshop": workshop,
    })))
}

/// POST /workshops/{id}/edit/
///
/// Updates a workshop. Requires coordinator or superuser (enforced by
/// middleware).
///
/// # HTTP Status Codes
/// - `200 OK`: Workshop updated successfully
/// - `400 BAD_REQUEST`: Validation error
/// - `403 FORBIDDEN`: Acting user is neither coordinator nor superuser
/// - `404 NOT_FOUND`: Workshop not found
pub async fn update_workshop(
    State(state): State<AppState>,
    Extension(access): Extension<WorkshopAccess>,
    Json(form): Json<WorkshopForm>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "update_workshop",
        workshop_id = %access.workshop_id,
        user_id = %access.user_id,
        "Updating workshop",
    );

    let mut conn = acquire_db_connection(&state, "update_workshop").await?;

    let current = load_workshop(&mut conn, access.workshop_id).await?;
    let workshop = workshops::update_workshop(&mut conn, &state.storage, current, form)
        .await
        .inspect_err(|e| log_handler_error("update_workshop", e))?;

    Ok(Json(serde_json::json!({
        "workshop": workshop,
        "message": "Workshop updated successfully",
    })))
}

// ============================================================================
// HELPERS
// ============================================================================

pub(crate) async fn acquire_db_connection(
    state: &AppState,
    operation: &str,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
    state.pool.acquire().await.map_err(|e| {
        Error::Internal(format!(
            "Failed to acquire database connection for {}: {}",
            operation, e
        ))
    })
}

pub(crate) async fn load_workshop(
    conn: &mut crate::database::DbConn,
    workshop_id: Uuid,
) -> Result<Workshop> {
    queries::workshops::get_workshop_by_id(conn, workshop_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Workshop {workshop_id} not found")))
}

pub(crate) fn log_handler_error(operation: &str, error: &Error) {
    tracing::error!(operation = operation, error = %error, "Handler operation failed");
}
