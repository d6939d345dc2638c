//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub appointment_count: i64,
    pub server_time: String,
    pub version: &'static str,
}

/// `GET /api/health` — connection check.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let appointment_count = {
        let conn = ctx.db.lock()?;
        repository::count_appointments(&conn)?
    };

    Ok(Json(HealthResponse {
        status: "ok",
        appointment_count,
        server_time: chrono::Utc::now().to_rfc3339(),
        version: crate::config::APP_VERSION,
    }))
}
