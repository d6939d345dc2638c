//! Appointment lifecycle state machine.
//!
//! Three transitions, one per actor role:
//!
//! - Book (patient): verified payment + complete clinical snapshot →
//!   a `Waiting` appointment.
//! - Assign (admin): date + time → `Assigned`; overwrites any prior
//!   schedule and re-fires the notification side-channel.
//! - Prescribe (doctor): free-text note → `Prescribed`.
//!
//! Role checks happen at the API boundary before any state is read.
//! Every transition is a single read-modify-write under the store
//! lock; concurrent assigns race last-write-wins by arrival order.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, Database, DatabaseError};
use crate::models::{Actor, Appointment, AppointmentStatus, PaymentRecord};
use crate::notify::Notifier;

/// How long Assign waits on the notification task — for logging the
/// outcome only, never to gate the transition's success.
const NOTIFY_LOG_WAIT: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),

    #[error("Appointment not found")]
    NotFound,

    #[error("Payment verification required before booking")]
    PaymentRejected,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

fn invalid(message: &str) -> LifecycleError {
    LifecycleError::Validation(message.into())
}

/// Patient-supplied booking payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub symptom: String,
    pub date: String,
    pub phone: String,
    pub payment_id: String,
    pub order_id: String,
    pub amount: u64,
}

/// Book: create a `Waiting` appointment for `patient`.
///
/// `payment_verified` resolves the gate's verdict for the order id;
/// it runs only after the request validates, so a rejected booking
/// never spends a verification. The contact email is taken from the
/// authenticated actor record, not the request body.
pub fn book(
    db: &Database,
    patient: &Actor,
    request: BookingRequest,
    payment_verified: impl FnOnce(&str) -> bool,
) -> Result<Appointment, LifecycleError> {
    let required = [
        &request.name,
        &request.gender,
        &request.symptom,
        &request.date,
        &request.phone,
        &request.payment_id,
        &request.order_id,
    ];
    if required.iter().any(|field| field.trim().is_empty()) || request.age == 0 {
        return Err(invalid("All required fields must be filled"));
    }
    if request.amount == 0 {
        return Err(invalid("All required fields must be filled"));
    }

    let gender = request
        .gender
        .parse()
        .map_err(|_| invalid("Gender must be Male, Female or Other"))?;
    let requested_date: NaiveDate = request
        .date
        .parse()
        .map_err(|_| invalid("Invalid date format (expected YYYY-MM-DD)"))?;

    if !payment_verified(&request.order_id) {
        return Err(LifecycleError::PaymentRejected);
    }

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        name: request.name,
        age: request.age,
        gender,
        phone: request.phone,
        email: patient.email.clone(),
        symptom: request.symptom,
        requested_date,
        assigned_date: None,
        assigned_time: None,
        status: AppointmentStatus::Waiting,
        prescription: None,
        payment: PaymentRecord {
            payment_id: request.payment_id,
            order_id: request.order_id,
            amount_minor: request.amount,
            paid_at: now,
        },
        created_at: now,
        updated_at: now,
    };

    let conn = db.lock()?;
    repository::insert_appointment(&conn, &appointment)?;

    tracing::info!(appointment_id = %appointment.id, "Appointment booked");
    Ok(appointment)
}

/// Assign: set the schedule and fire the notification side-channel.
///
/// Re-assignment is permitted and overwrites the prior schedule. The
/// notification task is spawned after the write commits; its outcome
/// is awaited only briefly, for logging.
pub async fn assign(
    db: &Database,
    notifier: &Notifier,
    id: &Uuid,
    assigned_date: &str,
    appointment_time: &str,
) -> Result<Appointment, LifecycleError> {
    if assigned_date.trim().is_empty() || appointment_time.trim().is_empty() {
        return Err(invalid("Date and time are required"));
    }
    let date: NaiveDate = assigned_date
        .parse()
        .map_err(|_| invalid("Invalid date format (expected YYYY-MM-DD)"))?;

    let updated = {
        let conn = db.lock()?;
        let current = repository::get_appointment(&conn, id)?.ok_or(LifecycleError::NotFound)?;

        // A prescription outlives a re-assignment: the explicit state
        // stays Prescribed when one is already attached.
        let status = if current.prescription.is_some() {
            AppointmentStatus::Prescribed
        } else {
            AppointmentStatus::Assigned
        };

        repository::update_schedule(&conn, id, date, appointment_time, status, Utc::now())?;
        repository::get_appointment(&conn, id)?.ok_or(LifecycleError::NotFound)?
    };

    tracing::info!(
        appointment_id = %updated.id,
        %date,
        time = appointment_time,
        "Appointment time assigned"
    );

    dispatch_notification(notifier, &updated).await;

    Ok(updated)
}

/// Prescribe: attach the doctor's note and move to `Prescribed`.
///
/// Prescribing is allowed from any state, including `Waiting` — an
/// appointment does not need a schedule first. No notification fires;
/// the patient sees the prescription when viewing the appointment.
pub fn prescribe(
    db: &Database,
    id: &Uuid,
    prescription: &str,
) -> Result<Appointment, LifecycleError> {
    if prescription.trim().is_empty() {
        return Err(invalid("Prescription text is required"));
    }

    let conn = db.lock()?;
    repository::get_appointment(&conn, id)?.ok_or(LifecycleError::NotFound)?;
    repository::update_prescription(
        &conn,
        id,
        prescription,
        AppointmentStatus::Prescribed,
        Utc::now(),
    )?;
    let updated = repository::get_appointment(&conn, id)?.ok_or(LifecycleError::NotFound)?;

    tracing::info!(appointment_id = %updated.id, "Prescription added");
    Ok(updated)
}

/// Fire the side-channel without gating the transition: spawn, then
/// wait at most `NOTIFY_LOG_WAIT` so the outcome can be logged.
async fn dispatch_notification(notifier: &Notifier, appointment: &Appointment) {
    let notifier = notifier.clone();
    let appointment = appointment.clone();
    let appointment_id = appointment.id;

    let task = tokio::spawn(async move { notifier.appointment_scheduled(&appointment).await });

    match tokio::time::timeout(NOTIFY_LOG_WAIT, task).await {
        Ok(Ok(outcome)) => {
            tracing::info!(
                %appointment_id,
                notification_created = outcome.notification_created,
                email_sent = outcome.email_sent,
                error = outcome.error.as_deref(),
                "Assignment notification outcome"
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(%appointment_id, "Notification task failed: {e}");
        }
        Err(_) => {
            tracing::info!(%appointment_id, "Notification still in flight; assignment not blocked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;
    use crate::mailer::Mailer;
    use crate::models::Role;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn register_patient(db: &Database, name: &str, email: &str) -> Actor {
        let actor = Actor {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role: Role::Patient,
            created_at: Utc::now(),
        };
        let conn = db.lock().unwrap();
        repository::insert_actor(&conn, &actor, &format!("hash-{email}")).unwrap();
        actor
    }

    fn booking_request() -> BookingRequest {
        BookingRequest {
            name: "Asha Rao".into(),
            age: 34,
            gender: "Female".into(),
            symptom: "Fever".into(),
            date: "2024-06-01".into(),
            phone: "9876543210".into(),
            payment_id: "pay_001".into(),
            order_id: "order_001".into(),
            amount: 50_000,
        }
    }

    fn silent_notifier(db: &Database) -> Notifier {
        Notifier::new(db.clone(), None)
    }

    #[test]
    fn book_creates_waiting_appointment() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();

        assert_eq!(appt.status, AppointmentStatus::Waiting);
        assert_eq!(appt.patient_id, patient.id);
        assert_eq!(appt.email, "asha@example.test");
        assert_eq!(appt.payment.payment_id, "pay_001");
        assert_eq!(appt.payment.order_id, "order_001");
        assert_eq!(appt.payment.amount_minor, 50_000);
        assert!(appt.assigned_date.is_none());
        assert!(appt.assigned_time.is_none());

        let conn = db.lock().unwrap();
        let stored = repository::get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Waiting);
    }

    #[test]
    fn book_rejects_missing_date() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");

        let mut request = booking_request();
        request.date = "".into();

        let err = book(&db, &patient, request, |_| true).unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        let conn = db.lock().unwrap();
        assert_eq!(repository::count_appointments(&conn).unwrap(), 0);
    }

    #[test]
    fn book_rejects_missing_payment_fields() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");

        let mut request = booking_request();
        request.payment_id = "".into();

        let err = book(&db, &patient, request, |_| true).unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        let conn = db.lock().unwrap();
        assert_eq!(repository::count_appointments(&conn).unwrap(), 0);
    }

    #[test]
    fn book_rejects_unverified_payment() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");

        let err = book(&db, &patient, booking_request(), |_| false).unwrap_err();
        assert!(matches!(err, LifecycleError::PaymentRejected));

        let conn = db.lock().unwrap();
        assert_eq!(repository::count_appointments(&conn).unwrap(), 0);
    }

    #[test]
    fn book_rejects_unknown_gender() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");

        let mut request = booking_request();
        request.gender = "Unknown".into();

        let err = book(&db, &patient, request, |_| true).unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }

    #[tokio::test]
    async fn assign_sets_schedule_and_status() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        let updated = assign(&db, &notifier, &appt.id, "2024-06-03", "10:00")
            .await
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Assigned);
        assert_eq!(updated.assigned_date.unwrap().to_string(), "2024-06-03");
        assert_eq!(updated.assigned_time.as_deref(), Some("10:00"));
        // The requested date is untouched, now historical
        assert_eq!(updated.requested_date.to_string(), "2024-06-01");
    }

    #[tokio::test]
    async fn assign_creates_notification_record() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        assign(&db, &notifier, &appt.id, "2024-06-03", "10:00")
            .await
            .unwrap();

        let conn = db.lock().unwrap();
        let notices = repository::list_notifications_for_appointment(&conn, &appt.id).unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].recipient_id, patient.id);
    }

    #[tokio::test]
    async fn assign_succeeds_when_mail_relay_down() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let mailer = Mailer::new(&MailConfig {
            relay_url: "http://127.0.0.1:9/send".into(),
            relay_token: "t".into(),
            from: "carebook@example.test".into(),
        })
        .unwrap();
        let notifier = Notifier::new(db.clone(), Some(mailer));

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        let updated = assign(&db, &notifier, &appt.id, "2024-06-03", "10:00")
            .await
            .unwrap();

        // The transition succeeded and the in-app record exists even
        // though delivery failed.
        assert_eq!(updated.status, AppointmentStatus::Assigned);
        let conn = db.lock().unwrap();
        let notices = repository::list_notifications_for_appointment(&conn, &appt.id).unwrap();
        assert_eq!(notices.len(), 1);
    }

    #[tokio::test]
    async fn reassign_overwrites_and_refires() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        assign(&db, &notifier, &appt.id, "2024-06-03", "10:00")
            .await
            .unwrap();
        let updated = assign(&db, &notifier, &appt.id, "2024-06-05", "14:30")
            .await
            .unwrap();

        // Overwritten, not appended
        assert_eq!(updated.assigned_date.unwrap().to_string(), "2024-06-05");
        assert_eq!(updated.assigned_time.as_deref(), Some("14:30"));
        assert_eq!(updated.status, AppointmentStatus::Assigned);

        let conn = db.lock().unwrap();
        let notices = repository::list_notifications_for_appointment(&conn, &appt.id).unwrap();
        assert_eq!(notices.len(), 2);
    }

    #[tokio::test]
    async fn assign_schedule_is_both_or_neither() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        assert!(!appt.has_schedule());
        assert!(appt.assigned_date.is_none() && appt.assigned_time.is_none());

        for (date, time) in [("2024-06-03", "10:00"), ("2024-06-05", "14:30"), ("2024-07-01", "09:15")] {
            let updated = assign(&db, &notifier, &appt.id, date, time).await.unwrap();
            assert!(updated.has_schedule());
        }
    }

    #[tokio::test]
    async fn assign_rejects_blank_inputs() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);
        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();

        for (date, time) in [("", "10:00"), ("2024-06-03", ""), ("", "")] {
            let err = assign(&db, &notifier, &appt.id, date, time).await.unwrap_err();
            assert!(matches!(err, LifecycleError::Validation(_)));
        }

        // No notification fired for the rejected attempts
        let conn = db.lock().unwrap();
        let notices = repository::list_notifications_for_appointment(&conn, &appt.id).unwrap();
        assert!(notices.is_empty());
    }

    #[tokio::test]
    async fn assign_unknown_id_is_not_found() {
        let db = test_db();
        let notifier = silent_notifier(&db);

        let err = assign(&db, &notifier, &Uuid::new_v4(), "2024-06-03", "10:00")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound));
    }

    #[tokio::test]
    async fn prescribe_sets_text_and_status() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        assign(&db, &notifier, &appt.id, "2024-06-03", "10:00")
            .await
            .unwrap();

        let updated = prescribe(&db, &appt.id, "Paracetamol 500mg twice daily").unwrap();
        assert_eq!(updated.status, AppointmentStatus::Prescribed);
        assert_eq!(
            updated.prescription.as_deref(),
            Some("Paracetamol 500mg twice daily")
        );
    }

    #[test]
    fn prescribe_permitted_on_waiting_appointment() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Waiting);

        // No schedule yet — the transition is still allowed
        let updated = prescribe(&db, &appt.id, "Rest and fluids").unwrap();
        assert_eq!(updated.status, AppointmentStatus::Prescribed);
        assert!(updated.assigned_date.is_none());
    }

    #[test]
    fn prescribe_rejects_empty_text() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();

        let err = prescribe(&db, &appt.id, "   ").unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }

    #[tokio::test]
    async fn reassign_after_prescription_keeps_prescribed_status() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();
        assign(&db, &notifier, &appt.id, "2024-06-03", "10:00")
            .await
            .unwrap();
        prescribe(&db, &appt.id, "Paracetamol").unwrap();

        let updated = assign(&db, &notifier, &appt.id, "2024-06-10", "11:00")
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Prescribed);
        assert_eq!(updated.assigned_date.unwrap().to_string(), "2024-06-10");
        assert_eq!(updated.prescription.as_deref(), Some("Paracetamol"));
    }

    #[tokio::test]
    async fn concurrent_assigns_last_write_wins() {
        let db = test_db();
        let patient = register_patient(&db, "Asha Rao", "asha@example.test");
        let notifier = silent_notifier(&db);

        let appt = book(&db, &patient, booking_request(), |_| true).unwrap();

        let a = assign(&db, &notifier, &appt.id, "2024-06-03", "10:00");
        let b = assign(&db, &notifier, &appt.id, "2024-06-04", "16:00");
        let (ra, rb) = tokio::join!(a, b);

        // Neither caller sees an error
        ra.unwrap();
        rb.unwrap();

        // Whichever update committed last is the schedule; the shape
        // invariant holds either way.
        let conn = db.lock().unwrap();
        let stored = repository::get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert!(stored.has_schedule());
        let date = stored.assigned_date.unwrap().to_string();
        assert!(date == "2024-06-03" || date == "2024-06-04");
    }
}
