//! Payment order creation and verification.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::models::Role;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub amount: u64,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Minor currency units, the gateway convention.
    pub amount: u64,
    pub key_id: String,
}

/// `POST /api/payment/create-order` — open an order with the gateway.
pub async fn create_order(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    actor.require(Role::Patient)?;

    let intent = ctx.payment.create_order(request.amount)?;

    Ok(Json(CreateOrderResponse {
        order_id: intent.order_id,
        amount: intent.amount_minor,
        key_id: intent.key_id,
    }))
}

#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Serialize)]
pub struct VerifyPaymentResponse {
    pub verified: bool,
}

/// `POST /api/payment/verify-payment` — check the gateway signature.
///
/// On success the order is remembered so a subsequent booking can
/// spend it; a mismatch rejects with no partial trust.
pub async fn verify_payment(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<ActorContext>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    actor.require(Role::Patient)?;

    if !ctx
        .payment
        .verify(&request.order_id, &request.payment_id, &request.signature)
    {
        return Err(ApiError::PaymentRejected);
    }

    ctx.mark_order_verified(&request.order_id)?;

    Ok(Json(VerifyPaymentResponse { verified: true }))
}
