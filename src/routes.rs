//! Route table assembly.
//!
//! Public routes are registered directly; authenticated routes sit behind
//! the JWT middleware, and workshop mutation routes additionally behind
//! the coordinator/superuser access middleware.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{
        auth::{login, login_form, logout, register},
        dashboard::dashboard,
        export::{export_excel, export_pdf},
        health::health_check,
        home::home,
        uploads::{get_uploads, manage_uploads},
        workshops::{
            create_workshop, edit_workshop_form, get_workshop, list_workshops, new_workshop_form,
            update_workshop,
        },
    },
    middleware::{auth::auth_middleware, workshop_access::workshop_access_middleware},
    state::AppState,
};

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    // Coordinator-or-superuser routes: auth runs first, then the workshop
    // access check (the last route_layer added is the outermost).
    let coordinator_routes = Router::new()
        .route(
            "/workshops/{id}/edit/",
            get(edit_workshop_form).post(update_workshop),
        )
        .route(
            "/workshops/{id}/uploads/",
            get(get_uploads).post(manage_uploads),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            workshop_access_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let authenticated_routes = Router::new()
        .route(
            "/workshops/new/",
            get(new_workshop_form).post(create_workshop),
        )
        .route("/dashboard/", get(dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(home))
        .route("/healthz", get(health_check))
        .route("/auth/register/", post(register))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", post(logout))
        .route("/workshops/", get(list_workshops))
        .route("/workshops/{id}/", get(get_workshop))
        .route("/export/excel/", get(export_excel))
        .route("/export/pdf/", get(export_pdf))
        .merge(authenticated_routes)
        .merge(coordinator_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
