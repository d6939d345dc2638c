use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, name, age, gender, phone, email, symptom,
     requested_date, assigned_date, assigned_time, status, prescription,
     payment_id, order_id, amount_minor, paid_at, created_at, updated_at";

fn row_to_appointment(row: &Row) -> rusqlite::Result<Appointment> {
    let id: String = row.get(0)?;
    let patient_id: String = row.get(1)?;
    let gender: String = row.get(4)?;
    let status: String = row.get(11)?;

    Ok(Appointment {
        id: super::column_uuid(0, &id)?,
        patient_id: super::column_uuid(1, &patient_id)?,
        name: row.get(2)?,
        age: row.get(3)?,
        gender: super::column_enum(4, &gender)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        symptom: row.get(7)?,
        requested_date: row.get(8)?,
        assigned_date: row.get(9)?,
        assigned_time: row.get(10)?,
        status: super::column_enum(11, &status)?,
        prescription: row.get(12)?,
        payment: PaymentRecord {
            payment_id: row.get(13)?,
            order_id: row.get(14)?,
            amount_minor: row.get(15)?,
            paid_at: row.get(16)?,
        },
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, name, age, gender, phone, email, symptom,
         requested_date, assigned_date, assigned_time, status, prescription,
         payment_id, order_id, amount_minor, paid_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.name,
            appt.age,
            appt.gender.as_str(),
            appt.phone,
            appt.email,
            appt.symptom,
            appt.requested_date,
            appt.assigned_date,
            appt.assigned_time,
            appt.status.as_str(),
            appt.prescription,
            appt.payment.payment_id,
            appt.payment.order_id,
            appt.payment.amount_minor,
            appt.payment.paid_at,
            appt.created_at,
            appt.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let appt = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            row_to_appointment,
        )
        .optional()?;
    Ok(appt)
}

/// All appointments, newest request first.
pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             ORDER BY requested_date DESC, created_at DESC"
        ),
        params![],
    )
}

pub fn list_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE patient_id = ?1
             ORDER BY requested_date DESC, created_at DESC"
        ),
        params![patient_id.to_string()],
    )
}

/// Appointments falling on the given calendar day, by assigned or
/// requested date.
pub fn list_appointments_on(
    conn: &Connection,
    day: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE assigned_date = ?1 OR (assigned_date IS NULL AND requested_date = ?1)
             ORDER BY requested_date ASC, created_at ASC"
        ),
        params![day],
    )
}

/// Case-insensitive substring match on the patient-supplied name.
pub fn search_appointments(
    conn: &Connection,
    name: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE LOWER(name) LIKE '%' || LOWER(?1) || '%'
             ORDER BY requested_date DESC, created_at DESC"
        ),
        params![name],
    )
}

/// Appointments an admin has scheduled (assigned or already prescribed),
/// soonest first.
pub fn list_scheduled(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE status != 'waiting'
             ORDER BY assigned_date ASC, assigned_time ASC"
        ),
        params![],
    )
}

pub fn list_scheduled_on(
    conn: &Connection,
    day: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE status != 'waiting' AND assigned_date = ?1
             ORDER BY assigned_time ASC"
        ),
        params![day],
    )
}

pub fn search_scheduled(
    conn: &Connection,
    name: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE status != 'waiting' AND LOWER(name) LIKE '%' || LOWER(?1) || '%'
             ORDER BY assigned_date ASC, assigned_time ASC"
        ),
        params![name],
    )
}

/// Overwrite the assigned schedule. Sole mutation path for the Assign
/// transition; last write wins on concurrent calls.
pub fn update_schedule(
    conn: &Connection,
    id: &Uuid,
    date: NaiveDate,
    time: &str,
    status: AppointmentStatus,
    updated_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET assigned_date = ?2, assigned_time = ?3, status = ?4, updated_at = ?5
         WHERE id = ?1",
        params![id.to_string(), date, time, status.as_str(), updated_at],
    )?;
    Ok(changed)
}

/// Attach prescription text. Sole mutation path for the Prescribe
/// transition.
pub fn update_prescription(
    conn: &Connection,
    id: &Uuid,
    prescription: &str,
    status: AppointmentStatus,
    updated_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET prescription = ?2, status = ?3, updated_at = ?4
         WHERE id = ?1",
        params![id.to_string(), prescription, status.as_str(), updated_at],
    )?;
    Ok(changed)
}

pub fn count_appointments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

fn query_appointments(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_appointment)?;
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?);
    }
    Ok(appointments)
}
