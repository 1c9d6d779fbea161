use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    /// Table that uploaded rows are inserted into
    pub import_table: String,
    /// Form field the upload endpoint reads the workbook from
    pub upload_field: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store connectivity and import target", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = if state.import_service.store().ping().await.is_ok() {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: db_status.to_string(),
        import_table: state.config.import_table.clone(),
        upload_field: state.config.upload_field_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
