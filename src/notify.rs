//! Notification side-channel: persisted in-app record + outbound mail.
//!
//! Fired by the Assign transition. The contract is best-effort: every
//! internal failure is captured into `NotifyOutcome` and logged — a
//! schedule assignment never rolls back because the mail relay is down,
//! and callers never see an error from this module.

use chrono::Utc;
use uuid::Uuid;

use crate::db::{repository, Database};
use crate::mailer::Mailer;
use crate::models::{Appointment, Notification, NotificationKind};

/// What the side-channel managed to do, reported for logging only.
#[derive(Debug, Default)]
pub struct NotifyOutcome {
    pub notification_created: bool,
    pub email_sent: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct Notifier {
    db: Database,
    mailer: Option<Mailer>,
}

impl Notifier {
    /// `mailer: None` means outbound mail is not configured; sends are
    /// skipped, which is not an error.
    pub fn new(db: Database, mailer: Option<Mailer>) -> Self {
        Self { db, mailer }
    }

    /// Inform the patient that their appointment has been scheduled.
    pub async fn appointment_scheduled(&self, appointment: &Appointment) -> NotifyOutcome {
        let mut outcome = NotifyOutcome::default();

        let (date, time) = match (
            appointment.assigned_date,
            appointment.assigned_time.as_deref(),
        ) {
            (Some(date), Some(time)) => (date, time),
            _ => {
                outcome.error = Some("appointment has no assigned schedule".into());
                tracing::warn!(
                    appointment_id = %appointment.id,
                    "Appointment confirmation skipped: no assigned schedule"
                );
                return outcome;
            }
        };

        let message = format!(
            "Your appointment is scheduled for {} at {time}.",
            date.format("%b %d, %Y")
        );

        match self.persist(appointment, &message) {
            Ok(()) => outcome.notification_created = true,
            Err(e) => {
                tracing::warn!(
                    appointment_id = %appointment.id,
                    "Failed to create notification: {e}"
                );
                outcome.error = Some(e.to_string());
                return outcome;
            }
        }

        match &self.mailer {
            None => {
                tracing::warn!("Email not sent: mail relay not configured");
            }
            Some(mailer) => {
                let subject = "Your Appointment Has Been Scheduled";
                let html = email_html(appointment, &message);
                match mailer.send(&appointment.email, subject, &message, &html).await {
                    Ok(()) => outcome.email_sent = true,
                    Err(e) => {
                        tracing::warn!(
                            appointment_id = %appointment.id,
                            "Appointment confirmation email failed: {e}"
                        );
                        outcome.error = Some(e.to_string());
                    }
                }
            }
        }

        outcome
    }

    fn persist(
        &self,
        appointment: &Appointment,
        message: &str,
    ) -> Result<(), crate::db::DatabaseError> {
        let symptom = if appointment.symptom.is_empty() {
            None
        } else {
            Some(appointment.symptom.clone())
        };

        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id: appointment.patient_id,
            title: "Appointment Scheduled".into(),
            message: message.into(),
            symptom,
            appointment_id: Some(appointment.id),
            kind: NotificationKind::Appointment,
            created_at: Utc::now(),
        };

        let conn = self.db.lock()?;
        repository::insert_notification(&conn, &notification)
    }
}

fn email_html(appointment: &Appointment, message: &str) -> String {
    let symptom = if appointment.symptom.is_empty() {
        "Not specified"
    } else {
        &appointment.symptom
    };

    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; \
         padding: 20px; border: 1px solid #eee; border-radius: 5px;\">\
         <h2 style=\"color: #333; text-align: center;\">Appointment Confirmation</h2>\
         <p>Dear {name},</p>\
         <p>{message}</p>\
         <p><strong>Symptom:</strong> {symptom}</p>\
         <p>Please arrive 15 minutes before your scheduled time.</p>\
         <p>Thank you for choosing our hospital.</p>\
         </div>",
        name = appointment.name,
    )
}
