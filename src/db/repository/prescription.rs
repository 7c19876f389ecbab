use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, medication_name, units_per_box,
         daily_consumption, box_start_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            rx.id.to_string(),
            rx.patient_id.to_string(),
            rx.medication_name,
            rx.units_per_box,
            rx.daily_consumption,
            rx.box_start_date,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, medication_name, units_per_box, daily_consumption, box_start_date
         FROM prescriptions WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id.to_string()], prescription_from_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn list_prescriptions_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, medication_name, units_per_box, daily_consumption, box_start_date
         FROM prescriptions WHERE patient_id = ?1 ORDER BY medication_name",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], prescription_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_prescription(
    conn: &Connection,
    p: &UpdatePrescriptionParams,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions SET medication_name = ?2, units_per_box = ?3,
         daily_consumption = ?4, box_start_date = ?5 WHERE id = ?1",
        params![
            p.id.to_string(),
            p.medication_name,
            p.units_per_box,
            p.daily_consumption,
            p.box_start_date,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: p.id.to_string(),
        });
    }
    Ok(())
}

/// Overwrite only the box start date (refill rollover).
pub fn update_box_start_date(
    conn: &Connection,
    id: &Uuid,
    new_start_date: NaiveDate,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE prescriptions SET box_start_date = ?2 WHERE id = ?1",
        params![id.to_string(), new_start_date],
    )?;
    Ok(())
}

pub fn insert_refill_history(
    conn: &Connection,
    entry: &RefillHistoryEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO refill_history (id, prescription_id, box_start_date, box_end_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.id.to_string(),
            entry.prescription_id.to_string(),
            entry.box_start_date,
            entry.box_end_date,
        ],
    )?;
    Ok(())
}

pub fn list_refill_history(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<Vec<RefillHistoryEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, box_start_date, box_end_date
         FROM refill_history WHERE prescription_id = ?1 ORDER BY box_start_date",
    )?;

    let rows = stmt.query_map(params![prescription_id.to_string()], |row| {
        Ok(RefillHistoryEntry {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            prescription_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            box_start_date: row.get(2)?,
            box_end_date: row.get(3)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn prescription_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        patient_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        medication_name: row.get(2)?,
        units_per_box: row.get(3)?,
        daily_consumption: row.get(4)?,
        box_start_date: row.get(5)?,
    })
}
