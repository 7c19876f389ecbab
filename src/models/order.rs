use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::OrderStatus;

/// One restocking task for one prescription cycle.
///
/// At most one active (non-fulfilled, same `cycle_start_date`) order
/// exists per prescription — enforced by an existence check before
/// creation, not a database constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub prescription_id: Uuid,
    /// Copy of the prescription's `box_start_date` at creation time.
    pub cycle_start_date: NaiveDate,
    pub estimated_depletion_date: NaiveDate,
    pub status: OrderStatus,
}

/// Data needed to create an order. Orders always start as pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderParams {
    pub prescription_id: Uuid,
    pub cycle_start_date: NaiveDate,
    pub estimated_depletion_date: NaiveDate,
}
