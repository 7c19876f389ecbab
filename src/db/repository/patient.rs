//! Patient and pharmacy rows. Full CRUD for these lives outside the
//! engine; only the consensus check and seed-style inserts are needed
//! here (the dashboard join reads patient fields directly).

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Seed-level patient record.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub fulfillment: String,
    pub delivery_address: String,
    pub phone: String,
    pub email: String,
    pub consensus: bool,
}

pub fn insert_pharmacy(conn: &Connection, id: &Uuid, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacies (id, name) VALUES (?1, ?2)",
        params![id.to_string(), name],
    )?;
    Ok(())
}

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, pharmacy_id, first_name, last_name, fulfillment,
         delivery_address, phone, email, consensus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            patient.id.to_string(),
            patient.pharmacy_id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.fulfillment,
            patient.delivery_address,
            patient.phone,
            patient.email,
            patient.consensus as i32,
        ],
    )?;
    Ok(())
}

pub fn has_consensus(conn: &Connection, patient_id: &Uuid) -> Result<bool, DatabaseError> {
    let consensus: Option<i64> = conn
        .query_row(
            "SELECT consensus FROM patients WHERE id = ?1",
            params![patient_id.to_string()],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    Ok(consensus == Some(1))
}
