use axum::Json;

/// GET /
///
/// Service banner with pointers to the main endpoints.
pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "workshophub",
        "endpoints": {
            "workshops": "/workshops/",
            "dashboard": "/dashboard/",
            "export_excel": "/export/excel/",
            "export_pdf": "/export/pdf/",
        }
    }))
}
