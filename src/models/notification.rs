use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationKind;

/// Append-only in-app notice. Created once per lifecycle transition
/// that informs the patient; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub title: String,
    pub message: String,
    pub symptom: Option<String>,
    pub appointment_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}
