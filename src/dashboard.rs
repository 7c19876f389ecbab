//! Dashboard assembly and filtering.
//!
//! A dashboard view is the trigger for the whole replenishment cycle:
//! ensure orders for the lookahead window, read the joined view, emit
//! approaching notifications over it (best-effort, never blocking the
//! read path), then apply the caller's filters.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::*;
use crate::notifications::{approaching_prescriptions, NotificationService};
use crate::orders::{OrderError, OrderService};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Apply status and date filters to dashboard entries. Filters compose
/// by logical AND; malformed date strings degrade to "no bound".
pub fn apply_filters(
    entries: Vec<DashboardEntry>,
    filter: &DashboardFilter,
    as_of: NaiveDate,
) -> Vec<DashboardEntry> {
    let date_from = NaiveDate::parse_from_str(&filter.date_from, DATE_FORMAT).ok();
    let date_to = NaiveDate::parse_from_str(&filter.date_to, DATE_FORMAT).ok();

    entries
        .into_iter()
        .filter(|entry| {
            if !filter.prescription_status.is_empty()
                && filter.prescription_status != "all"
                && entry.prescription_status(as_of).as_str() != filter.prescription_status
            {
                return false;
            }

            // Three-way policy: unset hides fulfilled (the "active
            // work" view), "all" shows everything, anything else is an
            // exact match.
            match filter.order_status.as_str() {
                "" => {
                    if entry.order_status == OrderStatus::Fulfilled {
                        return false;
                    }
                }
                "all" => {}
                explicit => {
                    if entry.order_status.as_str() != explicit {
                        return false;
                    }
                }
            }

            if let Some(from) = date_from {
                if entry.estimated_depletion_date < from {
                    return false;
                }
            }
            if let Some(to) = date_to {
                if entry.estimated_depletion_date > to {
                    return false;
                }
            }

            true
        })
        .collect()
}

/// Assemble the filtered dashboard for a pharmacy.
///
/// Order generation and notification generation are best-effort here:
/// their failures are logged and the read continues, so a storage
/// hiccup in either never blanks the staff's screen.
pub fn load_dashboard(
    orders: &OrderService,
    notifications: &NotificationService,
    pharmacy_id: &Uuid,
    as_of: NaiveDate,
    lookahead_days: i64,
    filter: &DashboardFilter,
) -> Result<Vec<DashboardEntry>, OrderError> {
    if let Err(e) = orders.ensure_orders(pharmacy_id, as_of, lookahead_days) {
        tracing::error!(pharmacy = %pharmacy_id, error = %e, "ensuring orders failed");
    }

    let entries = orders.list_dashboard(pharmacy_id)?;

    let approaching = approaching_prescriptions(&entries, as_of);
    if let Err(e) = notifications.generate_approaching(pharmacy_id, &approaching) {
        tracing::warn!(pharmacy = %pharmacy_id, error = %e, "notification generation failed");
    }

    Ok(apply_filters(entries, filter, as_of))
}
