//! Role-scoped read projections over the appointment store.
//!
//! Admin sees everything; a doctor sees only scheduled appointments;
//! a patient sees only their own records. Nothing here mutates state.

use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{repository, Database, DatabaseError};
use crate::models::{Appointment, Notification};

/// One visit-history bucket. Grouping is by the self-reported
/// `(name, email)` pair, not a verified account join — two bookings
/// that spell the name differently land in different buckets.
#[derive(Debug, Serialize)]
pub struct PatientGroup {
    pub name: String,
    pub email: String,
    pub appointments: Vec<Appointment>,
}

pub fn admin_all(db: &Database) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::list_appointments(&conn)
}

/// Appointments falling on the server's local calendar day.
pub fn admin_today(db: &Database) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::list_appointments_on(&conn, Local::now().date_naive())
}

pub fn admin_search(db: &Database, name: &str) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::search_appointments(&conn, name)
}

/// Visit history buckets, newest booking first within and across
/// buckets (bucket order follows first appearance in the listing).
pub fn admin_grouped(db: &Database) -> Result<Vec<PatientGroup>, DatabaseError> {
    let appointments = admin_all(db)?;

    let mut index: std::collections::HashMap<(String, String), usize> =
        std::collections::HashMap::new();
    let mut groups: Vec<PatientGroup> = Vec::new();

    for appointment in appointments {
        let key = (appointment.name.clone(), appointment.email.clone());
        match index.get(&key) {
            Some(&slot) => groups[slot].appointments.push(appointment),
            None => {
                index.insert(key, groups.len());
                groups.push(PatientGroup {
                    name: appointment.name.clone(),
                    email: appointment.email.clone(),
                    appointments: vec![appointment],
                });
            }
        }
    }

    Ok(groups)
}

/// Scheduled appointments (assigned or already prescribed) — a
/// `Waiting` appointment is never visible to a doctor.
pub fn doctor_assigned(db: &Database) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::list_scheduled(&conn)
}

pub fn doctor_assigned_today(db: &Database) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::list_scheduled_on(&conn, Local::now().date_naive())
}

pub fn doctor_search(db: &Database, name: &str) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::search_scheduled(&conn, name)
}

pub fn patient_appointments(
    db: &Database,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let conn = db.lock()?;
    repository::list_appointments_by_patient(&conn, patient_id)
}

pub fn patient_notifications(
    db: &Database,
    patient_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let conn = db.lock()?;
    repository::list_notifications_by_recipient(&conn, patient_id)
}
