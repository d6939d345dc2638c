//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. Routes are nested under `/api/`; everything except health,
//! register and login sits behind the bearer-token auth middleware.

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` (provided via
/// `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    // Protected routes — require a registered actor's bearer token.
    // Role checks live in the handlers, per transition.
    let protected = Router::new()
        .route("/payment/create-order", post(endpoints::payment::create_order))
        .route("/payment/verify-payment", post(endpoints::payment::verify_payment))
        .route("/book/appointment", post(endpoints::booking::book))
        .route("/book/appointments", get(endpoints::booking::list))
        .route("/book/notifications", get(endpoints::booking::notifications))
        .route("/admin/appointments/all", get(endpoints::admin::all))
        .route("/admin/appointments/today", get(endpoints::admin::today))
        .route("/admin/appointments/grouped", get(endpoints::admin::grouped))
        .route("/admin/appointments/search", get(endpoints::admin::search))
        .route("/admin/appointments/assign/:id", post(endpoints::admin::assign))
        .route("/doctor/appointments/assigned", get(endpoints::doctor::assigned))
        .route(
            "/doctor/appointments/assigned/today",
            get(endpoints::doctor::assigned_today),
        )
        .route("/doctor/appointments/search", get(endpoints::doctor::search))
        .route(
            "/doctor/appointments/prescribe/:id",
            post(endpoints::doctor::prescribe),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes: identity issuance and the health check
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new().nest("/api", protected).nest("/api", unprotected)
}
