//! Actor registration and login.
//!
//! Identity is deliberately thin: no passwords, no federation. An
//! actor registers once and holds an opaque bearer token; login
//! re-issues the token. The core only ever consumes the result as
//! "caller X with role R".

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{generate_token, hash_token, ApiContext};
use crate::db::repository;
use crate::models::{Actor, Role};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// Defaults to patient. Staff accounts are provisioned through
    /// the same endpoint by the operator.
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub actor: Actor,
    pub token: String,
}

/// `POST /api/auth/register` — create an actor and issue its token.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and email are required".into()));
    }

    let role: Role = match request.role.as_deref() {
        None => Role::Patient,
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::BadRequest("Role must be patient, doctor or admin".into()))?,
    };

    let actor = Actor {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        role,
        created_at: Utc::now(),
    };
    let token = generate_token();

    {
        let conn = ctx.db.lock()?;
        if repository::find_actor_by_email(&conn, &actor.email)?.is_some() {
            return Err(ApiError::BadRequest("Email already registered".into()));
        }
        repository::insert_actor(&conn, &actor, &hash_token(&token))?;
    }

    tracing::info!(actor_id = %actor.id, role = actor.role.as_str(), "Actor registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { actor, token })))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// `POST /api/auth/login` — re-issue the actor's bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let token = generate_token();

    let actor = {
        let conn = ctx.db.lock()?;
        let actor = repository::find_actor_by_email(&conn, request.email.trim())?
            .ok_or_else(|| ApiError::BadRequest("Invalid credentials".into()))?;
        repository::update_actor_token(&conn, &actor.id, &hash_token(&token))?;
        actor
    };

    Ok(Json(AuthResponse { actor, token }))
}
