//! Photo and document management handlers for a workshop.

use axum::{Json, extract::{Extension, State}};

use crate::{
    error::Result,
    middleware::workshop_access::WorkshopAccess,
    models::requests::ManageUploadsForm,
    queries::attachments,
    services::uploads,
    state::AppState,
};

use super::workshops::{acquire_db_connection, load_workshop, log_handler_error};

/// GET /workshops/{id}/uploads/
///
/// Current photo and document sets, for pre-filling the uploads form.
/// Requires coordinator or superuser (enforced by middleware).
pub async fn get_uploads(
    State(state): State<AppState>,
    Extension(access): Extension<WorkshopAccess>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "get_uploads").await?;

    let photos = attachments::list_photos(&mut conn, access.workshop_id).await?;
    let documents = attachments::list_documents(&mut conn, access.workshop_id).await?;

    Ok(Json(serde_json::json!({
        "photos": photos,
        "documents": documents,
    })))
}

/// POST /workshops/{id}/uploads/
///
/// Applies a batch of photo/document adds, updates and removals. The batch
/// is all-or-nothing: every entry is validated first and any failure leaves
/// the workshop untouched. Requires coordinator or superuser (enforced by
/// middleware).
///
/// # HTTP Status Codes
/// - `200 OK`: Files updated successfully
/// - `400 BAD_REQUEST`: Validation error (per-entry field map)
/// - `403 FORBIDDEN`: Acting user is neither coordinator nor superuser
/// - `404 NOT_FOUND`: Workshop not found
pub async fn manage_uploads(
    State(state): State<AppState>,
    Extension(access): Extension<WorkshopAccess>,
    Json(form): Json<ManageUploadsForm>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "manage_uploads",
        workshop_id = %access.workshop_id,
        user_id = %access.user_id,
        photos = form.photos.len(),
        documents = form.documents.len(),
        "Managing workshop uploads",
    );

    let mut conn = acquire_db_connection(&state, "manage_uploads").await?;

    let workshop = load_workshop(&mut conn, access.workshop_id).await?;
    let (photos, documents) = uploads::manage_uploads(&mut conn, &state.storage, &workshop, form)
        .await
        .inspect_err(|e| log_handler_error("manage_uploads", e))?;

    Ok(Json(serde_json::json!({
        "photos": photos,
        "documents": documents,
        "message": "Files updated successfully",
    })))
}
