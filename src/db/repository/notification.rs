use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

fn row_to_notification(row: &Row) -> rusqlite::Result<Notification> {
    let id: String = row.get(0)?;
    let recipient_id: String = row.get(1)?;
    let appointment_id: Option<String> = row.get(5)?;
    let kind: String = row.get(6)?;

    Ok(Notification {
        id: super::column_uuid(0, &id)?,
        recipient_id: super::column_uuid(1, &recipient_id)?,
        title: row.get(2)?,
        message: row.get(3)?,
        symptom: row.get(4)?,
        appointment_id: appointment_id
            .as_deref()
            .map(|s| super::column_uuid(5, s))
            .transpose()?,
        kind: super::column_enum(6, &kind)?,
        created_at: row.get(7)?,
    })
}

pub fn insert_notification(
    conn: &Connection,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, recipient_id, title, message, symptom,
         appointment_id, kind, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            notification.id.to_string(),
            notification.recipient_id.to_string(),
            notification.title,
            notification.message,
            notification.symptom,
            notification.appointment_id.map(|id| id.to_string()),
            notification.kind.as_str(),
            notification.created_at,
        ],
    )?;
    Ok(())
}

/// Notices for one recipient, newest first.
pub fn list_notifications_by_recipient(
    conn: &Connection,
    recipient_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, title, message, symptom, appointment_id, kind, created_at
         FROM notifications WHERE recipient_id = ?1
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![recipient_id.to_string()], row_to_notification)?;
    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}

/// Notices attached to one appointment, newest first.
pub fn list_notifications_for_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, title, message, symptom, appointment_id, kind, created_at
         FROM notifications WHERE appointment_id = ?1
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![appointment_id.to_string()], row_to_notification)?;
    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}
