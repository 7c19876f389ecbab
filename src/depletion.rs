//! Depletion estimation for prescription boxes.
//!
//! Pure day-granularity arithmetic: when a box runs out, how many days
//! are left, and the urgency band staff should see. Callers guarantee
//! `daily_consumption > 0` (validated at prescription entry).

use chrono::{Days, NaiveDate};

use crate::models::DepletionStatus;

/// Days-remaining ceiling of the "approaching" urgency band. Fixed
/// policy constant, not configurable per pharmacy.
pub const APPROACHING_WINDOW_DAYS: i64 = 7;

/// Date the box is expected to run out:
/// `box_start_date + floor(units_per_box / daily_consumption)` days.
///
/// Floor, not round — a box lasting a fractional number of days is
/// reported as depleted at the start of its final whole day
/// (100 units at 3/day → 33 days, not 33.33).
pub fn estimated_depletion_date(
    units_per_box: i32,
    daily_consumption: f64,
    box_start_date: NaiveDate,
) -> NaiveDate {
    let days = (units_per_box as f64 / daily_consumption).floor() as u64;
    box_start_date
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Signed days until `depletion_date` as of `as_of`; negative once the
/// box is past depletion. Both arguments are calendar dates, so the
/// caller's time-of-day cannot leak into the comparison.
pub fn days_remaining(depletion_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (depletion_date - as_of).num_days()
}

/// Urgency band for a days-remaining value:
/// depleted (<= 0), approaching (1..=7), ok (> 7).
pub fn status(days_remaining: i64) -> DepletionStatus {
    if days_remaining <= 0 {
        DepletionStatus::Depleted
    } else if days_remaining <= APPROACHING_WINDOW_DAYS {
        DepletionStatus::Approaching
    } else {
        DepletionStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn depletion_date_uses_floor() {
        // 100 units at 3/day lasts 33 whole days, not 33.33
        let depletion = estimated_depletion_date(100, 3.0, date(2026, 1, 1));
        assert_eq!(depletion, date(2026, 2, 3));
    }

    #[test]
    fn depletion_date_exact_division() {
        let depletion = estimated_depletion_date(30, 1.0, date(2026, 1, 1));
        assert_eq!(depletion, date(2026, 1, 31));
    }

    #[test]
    fn depletion_date_fractional_consumption() {
        // 28 units at 0.5/day → 56 days
        let depletion = estimated_depletion_date(28, 0.5, date(2026, 1, 1));
        assert_eq!(depletion, date(2026, 2, 26));
    }

    #[test]
    fn days_remaining_antisymmetric_around_depletion() {
        let depletion = date(2026, 1, 31);
        assert_eq!(days_remaining(depletion, date(2026, 1, 31)), 0);
        assert_eq!(days_remaining(depletion, date(2026, 2, 1)), -1);
        assert_eq!(days_remaining(depletion, date(2026, 1, 11)), 20);
    }

    #[test]
    fn status_boundaries() {
        assert_eq!(status(8), DepletionStatus::Ok);
        assert_eq!(status(7), DepletionStatus::Approaching);
        assert_eq!(status(1), DepletionStatus::Approaching);
        assert_eq!(status(0), DepletionStatus::Depleted);
        assert_eq!(status(-6), DepletionStatus::Depleted);
    }
}
