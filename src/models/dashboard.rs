use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::depletion;
use super::enums::{DepletionStatus, OrderStatus};

/// Read-only projection joining order + prescription + patient data
/// for the staff dashboard. Derived on read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEntry {
    pub order_id: Uuid,
    pub prescription_id: Uuid,
    pub cycle_start_date: NaiveDate,
    pub estimated_depletion_date: NaiveDate,
    pub order_status: OrderStatus,
    pub medication_name: String,
    pub units_per_box: i32,
    pub daily_consumption: f64,
    pub box_start_date: NaiveDate,
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub fulfillment: String,
    pub delivery_address: String,
    pub phone: String,
    pub email: String,
}

impl DashboardEntry {
    /// Days until the stored estimated depletion date.
    pub fn days_remaining(&self, as_of: NaiveDate) -> i64 {
        depletion::days_remaining(self.estimated_depletion_date, as_of)
    }

    /// Urgency classification from the stored estimated depletion date.
    pub fn prescription_status(&self, as_of: NaiveDate) -> DepletionStatus {
        depletion::status(self.days_remaining(as_of))
    }
}
