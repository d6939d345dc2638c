//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves the actor by
//! token hash, and injects `ActorContext` into request extensions for
//! downstream handlers. Role checks stay in the handlers — the
//! middleware only answers "who is calling".

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{hash_token, ActorContext, ApiContext};
use crate::db::repository;

/// Require a valid bearer token from a registered actor.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract bearer token
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // 2. Resolve the actor by token hash
    let actor = {
        let conn = ctx.db.lock().map_err(ApiError::from)?;
        repository::find_actor_by_token_hash(&conn, &hash_token(&token))
            .map_err(ApiError::from)?
            .ok_or(ApiError::Unauthorized)?
    };

    // 3. Inject actor context for downstream handlers
    req.extensions_mut().insert(ActorContext {
        actor_id: actor.id,
        name: actor.name,
        email: actor.email,
        role: actor.role,
    });

    Ok(next.run(req).await)
}
