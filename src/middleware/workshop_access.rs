//! Workshop access control middleware
//!
//! This module provides middleware for restricting edit and upload routes
//! to a workshop's coordinator or a superuser.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    queries::workshops,
    services::workshops::can_manage,
    state::AppState,
};

/// Workshop access context added to request extensions
///
/// Added by [`workshop_access_middleware`] once the acting user has been
/// confirmed as the workshop's coordinator or a superuser.
#[derive(Debug, Clone)]
pub struct WorkshopAccess {
    /// The workshop being accessed
    pub workshop_id: Uuid,
    /// The authenticated user's ID
    pub user_id: Uuid,
    /// Whether the acting user is a superuser
    pub is_superuser: bool,
}

/// Middleware guarding workshop mutation routes
///
/// Runs after [`crate::middleware::auth::auth_middleware`]:
/// 1. Extracts the workshop id from the URL path
/// 2. Rejects unknown workshops with 404
/// 3. Rejects users who are neither coordinator nor superuser with 403
/// 4. Adds [`WorkshopAccess`] to the request extensions
pub async fn workshop_access_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let workshop_id = extract_workshop_id(&request)?;

    let auth_user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| Error::Authentication("User not authenticated".to_string()))?
        .clone();

    let mut conn = state.pool.acquire().await?;
    let workshop = workshops::get_workshop_by_id(&mut conn, workshop_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Workshop {workshop_id} not found")))?;

    if !can_manage(auth_user.id, auth_user.is_superuser, &workshop) {
        return Err(Error::Forbidden(
            "Only the coordinator or a superuser may modify this workshop".to_string(),
        ));
    }

    request.extensions_mut().insert(WorkshopAccess {
        workshop_id,
        user_id: auth_user.id,
        is_superuser: auth_user.is_superuser,
    });

    Ok(next.run(request).await)
}

/// Extract the workshop id from the request path
///
/// Supports paths like:
/// - /workshops/{id}/edit/
/// - /workshops/{id}/uploads/
fn extract_workshop_id<B>(request: &Request<B>) -> Result<Uuid> {
    let path = request.uri().path();
    let segments: Vec<&str> = path.split('/').collect();

    let workshop_id_str = segments
        .iter()
        .position(|&s| s == "workshops")
        .and_then(|pos| segments.get(pos + 1))
        .ok_or_else(|| Error::field("workshop_id", "Workshop ID not found in path"))?;

    Uuid::parse_str(workshop_id_str)
        .map_err(|_| Error::field("workshop_id", "Invalid workshop ID format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_workshop_id_from_path() {
        let request = Request::builder()
            .uri("/workshops/01890a5d-ac96-774b-b0ce-b3f4e7c2a9f1/edit/")
            .body(())
            .unwrap();

        let workshop_id = extract_workshop_id(&request).unwrap();
        assert_eq!(
            workshop_id.to_string(),
            "01890a5d-ac96-774b-b0ce-b3f4e7c2a9f1"
        );
    }

    #[test]
    fn test_extract_workshop_id_missing() {
        let request = Request::builder().uri("/dashboard/").body(()).unwrap();
        assert!(extract_workshop_id(&request).is_err());
    }

    #[test]
    fn test_extract_workshop_id_invalid_uuid() {
        let request = Request::builder()
            .uri("/workshops/not-a-uuid/edit/")
            .body(())
            .unwrap();
        assert!(extract_workshop_id(&request).is_err());
    }
}
