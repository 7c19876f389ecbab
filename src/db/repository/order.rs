use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_order(conn: &Connection, order: &Order) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO orders (id, prescription_id, cycle_start_date,
         estimated_depletion_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            order.id.to_string(),
            order.prescription_id.to_string(),
            order.cycle_start_date,
            order.estimated_depletion_date,
            order.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_order(conn: &Connection, id: &Uuid) -> Result<Option<Order>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, cycle_start_date, estimated_depletion_date, status
         FROM orders WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map(params![id.to_string()], order_row)?;
    match rows.next() {
        Some(row) => Ok(Some(order_from_row(row?)?)),
        None => Ok(None),
    }
}

/// An active order is any non-fulfilled order for the given cycle.
pub fn has_active_order(
    conn: &Connection,
    prescription_id: &Uuid,
    cycle_start_date: NaiveDate,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM orders
         WHERE prescription_id = ?1 AND cycle_start_date = ?2 AND status != 'fulfilled'",
        params![prescription_id.to_string(), cycle_start_date],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_order_status(
    conn: &Connection,
    id: &Uuid,
    status: OrderStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE orders SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "order".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Mark any still-open order for the given cycle as fulfilled.
/// Used by refill rollover for walk-in refills recorded outside the
/// normal order-advance flow.
pub fn fulfill_open_orders(
    conn: &Connection,
    prescription_id: &Uuid,
    cycle_start_date: NaiveDate,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE orders SET status = 'fulfilled'
         WHERE prescription_id = ?1 AND cycle_start_date = ?2 AND status != 'fulfilled'",
        params![prescription_id.to_string(), cycle_start_date],
    )?;
    Ok(())
}

/// Joined order + prescription + patient projection for the dashboard,
/// most urgent first.
pub fn list_dashboard_entries(
    conn: &Connection,
    pharmacy_id: &Uuid,
) -> Result<Vec<DashboardEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT o.id, o.prescription_id, o.cycle_start_date, o.estimated_depletion_date,
                o.status, rx.medication_name, rx.units_per_box, rx.daily_consumption,
                rx.box_start_date, pt.id, pt.first_name, pt.last_name, pt.fulfillment,
                pt.delivery_address, pt.phone, pt.email
         FROM orders o
         JOIN prescriptions rx ON rx.id = o.prescription_id
         JOIN patients pt ON pt.id = rx.patient_id
         WHERE pt.pharmacy_id = ?1
         ORDER BY o.estimated_depletion_date, pt.last_name",
    )?;

    let rows = stmt.query_map(params![pharmacy_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, NaiveDate>(2)?,
            row.get::<_, NaiveDate>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, i32>(6)?,
            row.get::<_, f64>(7)?,
            row.get::<_, NaiveDate>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, String>(10)?,
            row.get::<_, String>(11)?,
            row.get::<_, String>(12)?,
            row.get::<_, String>(13)?,
            row.get::<_, String>(14)?,
            row.get::<_, String>(15)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let r = row?;
        entries.push(DashboardEntry {
            order_id: Uuid::parse_str(&r.0).unwrap_or_default(),
            prescription_id: Uuid::parse_str(&r.1).unwrap_or_default(),
            cycle_start_date: r.2,
            estimated_depletion_date: r.3,
            order_status: OrderStatus::from_str(&r.4)?,
            medication_name: r.5,
            units_per_box: r.6,
            daily_consumption: r.7,
            box_start_date: r.8,
            patient_id: Uuid::parse_str(&r.9).unwrap_or_default(),
            first_name: r.10,
            last_name: r.11,
            fulfillment: r.12,
            delivery_address: r.13,
            phone: r.14,
            email: r.15,
        });
    }
    Ok(entries)
}

/// Prescriptions of consented patients for a pharmacy, as input to the
/// order-generation policy.
pub fn list_lookahead_prescriptions(
    conn: &Connection,
    pharmacy_id: &Uuid,
) -> Result<Vec<PrescriptionSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT rx.id, rx.patient_id, rx.units_per_box, rx.daily_consumption, rx.box_start_date
         FROM prescriptions rx
         JOIN patients pt ON pt.id = rx.patient_id
         WHERE pt.pharmacy_id = ?1 AND pt.consensus = 1",
    )?;

    let rows = stmt.query_map(params![pharmacy_id.to_string()], |row| {
        Ok(PrescriptionSummary {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            patient_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            units_per_box: row.get(2)?,
            daily_consumption: row.get(3)?,
            box_start_date: row.get(4)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

type OrderRow = (String, String, NaiveDate, NaiveDate, String);

fn order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn order_from_row(r: OrderRow) -> Result<Order, DatabaseError> {
    Ok(Order {
        id: Uuid::parse_str(&r.0).unwrap_or_default(),
        prescription_id: Uuid::parse_str(&r.1).unwrap_or_default(),
        cycle_start_date: r.2,
        estimated_depletion_date: r.3,
        status: OrderStatus::from_str(&r.4)?,
    })
}
