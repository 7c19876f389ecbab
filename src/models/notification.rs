use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::depletion;
use super::enums::TransitionType;

/// A record that a prescription crossed into "approaching" for a
/// pharmacy's attention. Joined with medication and patient fields
/// for the notification list view. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub prescription_id: Uuid,
    pub transition_type: TransitionType,
    pub read: bool,
    pub created_at: NaiveDateTime,
    pub medication_name: String,
    pub units_per_box: i32,
    pub daily_consumption: f64,
    pub box_start_date: NaiveDate,
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl Notification {
    /// Date the prescription's current box is expected to run out.
    pub fn estimated_depletion_date(&self) -> NaiveDate {
        depletion::estimated_depletion_date(
            self.units_per_box,
            self.daily_consumption,
            self.box_start_date,
        )
    }
}
