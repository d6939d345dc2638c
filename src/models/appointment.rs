use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, Gender};

/// Payment identifiers attached at booking time. Write-once: an
/// appointment row cannot exist without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub order_id: String,
    pub amount_minor: u64,
    pub paid_at: DateTime<Utc>,
}

/// One patient booking request, tracked through
/// Waiting → Assigned → Prescribed.
///
/// The clinical fields (`name` through `symptom`) are a snapshot taken
/// at request time; they are never re-synced from the patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: String,
    pub email: String,
    pub symptom: String,
    pub requested_date: NaiveDate,
    pub assigned_date: Option<NaiveDate>,
    pub assigned_time: Option<String>,
    pub status: AppointmentStatus,
    pub prescription: Option<String>,
    pub payment: PaymentRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Both-or-neither invariant on the assigned schedule.
    pub fn has_schedule(&self) -> bool {
        self.assigned_date.is_some() && self.assigned_time.is_some()
    }
}
