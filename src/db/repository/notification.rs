use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

/// Idempotent create: a duplicate (pharmacy, prescription, transition)
/// is silently ignored, not an error.
pub fn insert_notification(
    conn: &Connection,
    id: &Uuid,
    pharmacy_id: &Uuid,
    prescription_id: &Uuid,
    transition_type: TransitionType,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, pharmacy_id, prescription_id, transition_type)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (pharmacy_id, prescription_id, transition_type) DO NOTHING",
        params![
            id.to_string(),
            pharmacy_id.to_string(),
            prescription_id.to_string(),
            transition_type.as_str(),
        ],
    )?;
    Ok(())
}

/// Notifications for a pharmacy, newest first, joined with medication
/// and patient fields for display.
pub fn list_notifications_by_pharmacy(
    conn: &Connection,
    pharmacy_id: &Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT n.id, n.pharmacy_id, n.prescription_id, n.transition_type, n.read,
                n.created_at, rx.medication_name, rx.units_per_box, rx.daily_consumption,
                rx.box_start_date, pt.id, pt.first_name, pt.last_name
         FROM notifications n
         JOIN prescriptions rx ON rx.id = n.prescription_id
         JOIN patients pt ON pt.id = rx.patient_id
         WHERE n.pharmacy_id = ?1
         ORDER BY n.created_at DESC",
    )?;

    let rows = stmt.query_map(params![pharmacy_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, bool>(4)?,
            row.get::<_, NaiveDateTime>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, i32>(7)?,
            row.get::<_, f64>(8)?,
            row.get::<_, NaiveDate>(9)?,
            row.get::<_, String>(10)?,
            row.get::<_, String>(11)?,
            row.get::<_, String>(12)?,
        ))
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        let r = row?;
        notifications.push(Notification {
            id: Uuid::parse_str(&r.0).unwrap_or_default(),
            pharmacy_id: Uuid::parse_str(&r.1).unwrap_or_default(),
            prescription_id: Uuid::parse_str(&r.2).unwrap_or_default(),
            transition_type: TransitionType::from_str(&r.3)?,
            read: r.4,
            created_at: r.5,
            medication_name: r.6,
            units_per_box: r.7,
            daily_consumption: r.8,
            box_start_date: r.9,
            patient_id: Uuid::parse_str(&r.10).unwrap_or_default(),
            first_name: r.11,
            last_name: r.12,
        });
    }
    Ok(notifications)
}

/// Mark a single notification as read. Pharmacy-scoped so one pharmacy
/// cannot touch another's notifications.
pub fn mark_notification_read(
    conn: &Connection,
    id: &Uuid,
    pharmacy_id: &Uuid,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1 AND pharmacy_id = ?2",
        params![id.to_string(), pharmacy_id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "notification".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn mark_all_notifications_read(
    conn: &Connection,
    pharmacy_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE notifications SET read = 1 WHERE pharmacy_id = ?1 AND read = 0",
        params![pharmacy_id.to_string()],
    )?;
    Ok(())
}

pub fn count_unread_notifications(
    conn: &Connection,
    pharmacy_id: &Uuid,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE pharmacy_id = ?1 AND read = 0",
        params![pharmacy_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
