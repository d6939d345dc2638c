//! Admin triage surface: full listings, search, grouping, and the
//! Assign transition.

use axum::extract::{Path, Query, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::lifecycle;
use crate::models::{Appointment, Role};
use crate::queries;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/admin/appointments/all` — every appointment.
pub async fn all(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Admin)?;

    let appointments = queries::admin_all(&ctx.db)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/admin/appointments/today` — today's calendar day.
pub async fn today(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Admin)?;

    let appointments = queries::admin_today(&ctx.db)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Serialize)]
pub struct GroupedResponse {
    pub groups: Vec<queries::PatientGroup>,
}

/// `GET /api/admin/appointments/grouped` — visit history buckets.
pub async fn grouped(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<GroupedResponse>, ApiError> {
    actor.require(Role::Admin)?;

    let groups = queries::admin_grouped(&ctx.db)?;
    Ok(Json(GroupedResponse { groups }))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// `GET /api/admin/appointments/search?name=` — substring search.
pub async fn search(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Admin)?;

    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Name parameter is required".into()))?;

    let appointments = queries::admin_search(&ctx.db, &name)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub assigned_date: String,
    pub appointment_time: String,
}

#[derive(Serialize)]
pub struct AssignResponse {
    pub appointment: Appointment,
}

/// `POST /api/admin/appointments/assign/:id` — the Assign transition.
pub async fn assign(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    actor.require(Role::Admin)?;

    let id = parse_appointment_id(&id)?;
    let appointment = lifecycle::assign(
        &ctx.db,
        &ctx.notifier,
        &id,
        &request.assigned_date,
        &request.appointment_time,
    )
    .await?;

    Ok(Json(AssignResponse { appointment }))
}

/// A malformed id cannot name any appointment — report it the same
/// way as a missing one.
pub(super) fn parse_appointment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Appointment not found".into()))
}
