//! Shared types for the API layer.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::Database;
use crate::models::Role;
use crate::notify::Notifier;
use crate::payment::PaymentGate;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware: the store handle,
/// the payment gate, the notification side-channel, and the set of
/// payment orders the gate has verified.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Database,
    pub payment: PaymentGate,
    pub notifier: Notifier,
    pub verified_orders: Arc<Mutex<VerifiedOrders>>,
}

impl ApiContext {
    pub fn new(db: Database, payment: PaymentGate, notifier: Notifier) -> Self {
        Self {
            db,
            payment,
            notifier,
            verified_orders: Arc::new(Mutex::new(VerifiedOrders::new())),
        }
    }

    /// Mark an order as verified by the payment gate.
    pub fn mark_order_verified(&self, order_id: &str) -> Result<(), ApiError> {
        let mut orders = self
            .verified_orders
            .lock()
            .map_err(|_| ApiError::Internal("verified orders lock".into()))?;
        orders.mark(order_id);
        Ok(())
    }

    /// Consume a verification (one booking per verified order).
    pub fn take_order_verified(&self, order_id: &str) -> Result<bool, ApiError> {
        let mut orders = self
            .verified_orders
            .lock()
            .map_err(|_| ApiError::Internal("verified orders lock".into()))?;
        Ok(orders.take(order_id))
    }
}

// ═══════════════════════════════════════════════════════════
// Actor context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl ActorContext {
    /// Reject the request unless the caller holds `role`. Called
    /// before any state read, so a mismatch never leaks whether the
    /// target resource exists.
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Token management
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token string using SHA-256, hex encoded for storage.
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Verified payment orders
// ═══════════════════════════════════════════════════════════

/// Orders that passed signature verification and have not yet been
/// spent on a booking. One verification admits one appointment.
pub struct VerifiedOrders {
    orders: HashSet<String>,
}

impl VerifiedOrders {
    pub fn new() -> Self {
        Self {
            orders: HashSet::new(),
        }
    }

    pub fn mark(&mut self, order_id: &str) {
        self.orders.insert(order_id.to_string());
    }

    /// Remove and return whether the order had been verified.
    pub fn take(&mut self, order_id: &str) -> bool {
        self.orders.remove(order_id)
    }
}

impl Default for VerifiedOrders {
    fn default() -> Self {
        Self::new()
    }
}
