use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::depletion;
use super::enums::DepletionStatus;

/// A patient's recurring medication. Never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medication_name: String,
    pub units_per_box: i32,
    pub daily_consumption: f64,
    pub box_start_date: NaiveDate,
}

impl Prescription {
    /// Date the current box is expected to run out.
    pub fn estimated_depletion_date(&self) -> NaiveDate {
        depletion::estimated_depletion_date(
            self.units_per_box,
            self.daily_consumption,
            self.box_start_date,
        )
    }

    /// Days until depletion relative to `as_of`; negative once past it.
    pub fn days_remaining(&self, as_of: NaiveDate) -> i64 {
        depletion::days_remaining(self.estimated_depletion_date(), as_of)
    }

    pub fn status(&self, as_of: NaiveDate) -> DepletionStatus {
        depletion::status(self.days_remaining(as_of))
    }
}

/// Lightweight prescription view used by the order-generation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionSummary {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub units_per_box: i32,
    pub daily_consumption: f64,
    pub box_start_date: NaiveDate,
}

impl PrescriptionSummary {
    pub fn estimated_depletion_date(&self) -> NaiveDate {
        depletion::estimated_depletion_date(
            self.units_per_box,
            self.daily_consumption,
            self.box_start_date,
        )
    }

    pub fn days_remaining(&self, as_of: NaiveDate) -> i64 {
        depletion::days_remaining(self.estimated_depletion_date(), as_of)
    }
}

/// Data needed to create a prescription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrescriptionParams {
    pub patient_id: Uuid,
    pub medication_name: String,
    pub units_per_box: i32,
    pub daily_consumption: f64,
    pub box_start_date: NaiveDate,
}

/// Data needed to update a prescription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePrescriptionParams {
    pub id: Uuid,
    pub medication_name: String,
    pub units_per_box: i32,
    pub daily_consumption: f64,
    pub box_start_date: NaiveDate,
}

/// An archived box cycle, written on refill rollover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillHistoryEntry {
    pub id: Uuid,
    pub prescription_id: Uuid,
    pub box_start_date: NaiveDate,
    pub box_end_date: NaiveDate,
}
