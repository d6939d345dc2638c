//! Patient booking surface.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::lifecycle::{self, BookingRequest};
use crate::models::{Actor, Appointment, Notification, Role};
use crate::queries;

#[derive(Serialize)]
pub struct BookResponse {
    pub appointment: Appointment,
}

/// `POST /api/book/appointment` — book with verified payment.
pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    actor.require(Role::Patient)?;

    let patient = Actor {
        id: actor.actor_id,
        name: actor.name.clone(),
        email: actor.email.clone(),
        role: actor.role,
        created_at: chrono::Utc::now(),
    };

    // The verified-order set is consumed only after the request
    // validates, so a rejected booking does not spend the payment.
    let appointment = lifecycle::book(&ctx.db, &patient, request, |order_id| {
        ctx.take_order_verified(order_id).unwrap_or(false)
    })?;

    Ok((StatusCode::CREATED, Json(BookResponse { appointment })))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/book/appointments` — the caller's own appointments.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    actor.require(Role::Patient)?;

    let appointments = queries::patient_appointments(&ctx.db, &actor.actor_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// `GET /api/book/notifications` — the caller's own notices.
pub async fn notifications(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    actor.require(Role::Patient)?;

    let notifications = queries::patient_notifications(&ctx.db, &actor.actor_id)?;
    Ok(Json(NotificationsResponse { notifications }))
}
