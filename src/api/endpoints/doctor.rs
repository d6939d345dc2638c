//! Doctor surface: scheduled-only views and the Prescribe transition.

use axum::extract::{Path, Query, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::lifecycle;
use crate::models::{Appointment, Role};
use crate::queries;

use super::admin::parse_appointment_id;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/doctor/appointments/assigned` — scheduled appointments.
pub async fn assigned(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Doctor)?;

    let appointments = queries::doctor_assigned(&ctx.db)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/doctor/appointments/assigned/today` — today's schedule.
pub async fn assigned_today(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Doctor)?;

    let appointments = queries::doctor_assigned_today(&ctx.db)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// `GET /api/doctor/appointments/search?name=` — scheduled-only search.
pub async fn search(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Doctor)?;

    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Name parameter is required".into()))?;

    let appointments = queries::doctor_search(&ctx.db, &name)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct PrescribeRequest {
    pub prescription: String,
}

#[derive(Serialize)]
pub struct PrescribeResponse {
    pub appointment: Appointment,
}

/// `POST /api/doctor/appointments/prescribe/:id` — the Prescribe
/// transition.
pub async fn prescribe(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(request): Json<PrescribeRequest>,
) -> Result<Json<PrescribeResponse>, ApiError> {
    actor.require(Role::Doctor)?;

    let id = parse_appointment_id(&id)?;
    let appointment = lifecycle::prescribe(&ctx.db, &id, &request.prescription)?;

    Ok(Json(PrescribeResponse { appointment }))
}
