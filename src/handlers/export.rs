//! Export download handlers.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};

use crate::{
    error::Result,
    queries::workshops,
    services::export,
    state::AppState,
};

use super::workshops::acquire_db_connection;

/// GET /export/excel/
///
/// Downloads the full workshop dataset as a spreadsheet, one row per
/// workshop, most recent start date first.
pub async fn export_excel(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let mut conn = acquire_db_connection(&state, "export_excel").await?;

    let rows = workshops::export_rows(&mut conn, None).await?;
    let body = export::render_spreadsheet(&rows)?;

    tracing::info!(operation = "export_excel", rows = rows.len(), "Rendered spreadsheet export");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"workshops.csv\""),
        ],
        body,
    ))
}

/// GET /export/pdf/
///
/// Downloads the PDF summary of the 100 most recent workshops.
pub async fn export_pdf(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let mut conn = acquire_db_connection(&state, "export_pdf").await?;

    let rows = workshops::export_rows(&mut conn, Some(export::PDF_SUMMARY_LIMIT as i64)).await?;
    let body = export::render_summary_pdf(&rows);

    tracing::info!(operation = "export_pdf", rows = rows.len(), "Rendered PDF export");

    Ok((
        [
            (CONTENT_TYPE, "application/pdf"),
            (CONTENT_DISPOSITION, "attachment; filename=\"workshops.pdf\""),
        ],
        body,
    ))
}
