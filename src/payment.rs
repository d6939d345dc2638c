//! Payment verification gate.
//!
//! Orders are created server-side with a random reference; after the
//! client completes payment with the gateway, it submits the gateway's
//! transaction id plus a signature. Verification recomputes the keyed
//! hash over `order_id|payment_id` with the server-held secret and
//! compares constant-time. Any mismatch or malformed input rejects —
//! the gate fails closed.

use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

const ORDER_ID_RANDOM_LEN: usize = 20;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment amount must be greater than zero")]
    InvalidAmount,
}

/// Order reference handed to the client before it pays the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct OrderIntent {
    pub order_id: String,
    /// Amount in minor currency units (gateway convention: amount × 100).
    pub amount_minor: u64,
    pub key_id: String,
}

#[derive(Clone)]
pub struct PaymentGate {
    key_id: String,
    secret: String,
}

impl PaymentGate {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            key_id: config.key_id.clone(),
            secret: config.secret.clone(),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create an order reference for the given amount (major units).
    pub fn create_order(&self, amount: u64) -> Result<OrderIntent, PaymentError> {
        if amount == 0 {
            return Err(PaymentError::InvalidAmount);
        }

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ORDER_ID_RANDOM_LEN)
            .map(char::from)
            .collect();

        Ok(OrderIntent {
            order_id: format!("order_{suffix}"),
            amount_minor: amount * 100,
            key_id: self.key_id.clone(),
        })
    }

    /// `true` iff the signature equals the keyed hash of
    /// `order_id|payment_id` under the configured secret.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
            return false;
        }

        match self.signature_for(order_id, payment_id) {
            Some(expected) => expected.as_bytes().ct_eq(signature.as_bytes()).into(),
            None => false,
        }
    }

    fn signature_for(&self, order_id: &str, payment_id: &str) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Some(hex_encode(&mac.finalize().into_bytes()))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
