//! Order lifecycle — generation policy and state machine.
//!
//! Orders move strictly pending → prepared → fulfilled. Generation runs
//! inline on dashboard view (no background scheduler): every consented
//! prescription inside the lookahead window gets one pending order per
//! box cycle. Fulfillment is the real-world handover of a new box, so
//! it also rolls the prescription over via the injected refill recorder.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;
use crate::prescriptions::PrescriptionError;
use crate::store::OrderStore;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("order not found")]
    NotFound,

    #[error("invalid order status transition")]
    InvalidTransition,

    #[error("recording refill on fulfillment: {0}")]
    Refill(#[from] PrescriptionError),

    #[error("storage error: {0}")]
    Database(#[from] DatabaseError),
}

/// Cross-domain rollover collaborator, invoked synchronously on the
/// fulfillment transition. Implemented by `PrescriptionService`.
pub trait RefillRecorder: Send + Sync {
    fn record_refill(
        &self,
        prescription_id: &Uuid,
        new_start_date: NaiveDate,
    ) -> Result<(), PrescriptionError>;
}

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    refills: Arc<dyn RefillRecorder>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, refills: Arc<dyn RefillRecorder>) -> Self {
        OrderService { store, refills }
    }

    /// Create pending orders for prescriptions in the lookahead window
    /// that don't already have an active order for the current cycle.
    /// Idempotent: re-invocation with the same inputs creates nothing new.
    ///
    /// The window is "at most `lookahead_days` remaining" — a
    /// prescription already past depletion still qualifies.
    pub fn ensure_orders(
        &self,
        pharmacy_id: &Uuid,
        as_of: NaiveDate,
        lookahead_days: i64,
    ) -> Result<(), OrderError> {
        let prescriptions = self.store.list_lookahead_prescriptions(pharmacy_id)?;

        for rx in prescriptions {
            if rx.days_remaining(as_of) > lookahead_days {
                continue;
            }

            if self.store.has_active_order(&rx.id, rx.box_start_date)? {
                continue;
            }

            let order = self.store.create_order(&CreateOrderParams {
                prescription_id: rx.id,
                cycle_start_date: rx.box_start_date,
                estimated_depletion_date: rx.estimated_depletion_date(),
            })?;
            tracing::debug!(
                order = %order.id,
                prescription = %rx.id,
                depletion = %order.estimated_depletion_date,
                "restocking order created"
            );
        }

        Ok(())
    }

    /// Joined dashboard entries for a pharmacy.
    pub fn list_dashboard(&self, pharmacy_id: &Uuid) -> Result<Vec<DashboardEntry>, OrderError> {
        Ok(self.store.list_dashboard(pharmacy_id)?)
    }

    /// Advance an order to the next status in the lifecycle. On the
    /// transition to fulfilled, records a prescription refill with
    /// `as_of` as the new cycle start.
    pub fn advance_status(&self, order_id: &Uuid, as_of: NaiveDate) -> Result<(), OrderError> {
        let order = self
            .store
            .get_order(order_id)?
            .ok_or(OrderError::NotFound)?;

        let next = order.status.next().ok_or(OrderError::InvalidTransition)?;

        self.store.update_order_status(order_id, next)?;

        if next == OrderStatus::Fulfilled {
            self.refills.record_refill(&order.prescription_id, as_of)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::db::repository::patient::NewPatient;
    use crate::store::{PrescriptionStore, SqliteStore};

    /// Counts rollover invocations instead of touching storage.
    struct CountingRefiller {
        calls: Mutex<Vec<(Uuid, NaiveDate)>>,
    }

    impl CountingRefiller {
        fn new() -> Self {
            CountingRefiller {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(Uuid, NaiveDate)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RefillRecorder for CountingRefiller {
        fn record_refill(
            &self,
            prescription_id: &Uuid,
            new_start_date: NaiveDate,
        ) -> Result<(), PrescriptionError> {
            self.calls
                .lock()
                .unwrap()
                .push((*prescription_id, new_start_date));
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        service: OrderService,
        store: Arc<SqliteStore>,
        refiller: Arc<CountingRefiller>,
        pharmacy_id: Uuid,
        patient_id: Uuid,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let pharmacy_id = Uuid::new_v4();
        let patient_id = Uuid::new_v4();
        store.insert_pharmacy(&pharmacy_id, "Farmacia Blu").unwrap();
        store
            .insert_patient(&NewPatient {
                id: patient_id,
                pharmacy_id,
                first_name: "Dario".into(),
                last_name: "Neri".into(),
                fulfillment: "pickup".into(),
                delivery_address: "".into(),
                phone: "".into(),
                email: "".into(),
                consensus: true,
            })
            .unwrap();
        let refiller = Arc::new(CountingRefiller::new());
        let service = OrderService::new(store.clone(), refiller.clone());
        Fixture {
            service,
            store,
            refiller,
            pharmacy_id,
            patient_id,
        }
    }

    fn add_rx(f: &Fixture, units: i32, consumption: f64, start: NaiveDate) -> Prescription {
        f.store
            .create_prescription(&CreatePrescriptionParams {
                patient_id: f.patient_id,
                medication_name: "Amlodipine".into(),
                units_per_box: units,
                daily_consumption: consumption,
                box_start_date: start,
            })
            .unwrap()
    }

    #[test]
    fn creates_order_inside_lookahead_window() {
        let f = fixture();
        // Depletes 2026-01-31; 5 days remaining on 2026-01-26
        let rx = add_rx(&f, 30, 1.0, date(2026, 1, 1));

        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 1, 26), 7)
            .unwrap();

        let entries = f.service.list_dashboard(&f.pharmacy_id).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prescription_id, rx.id);
        assert_eq!(entries[0].order_status, OrderStatus::Pending);
        assert_eq!(entries[0].cycle_start_date, date(2026, 1, 1));
        assert_eq!(entries[0].estimated_depletion_date, date(2026, 1, 31));
    }

    #[test]
    fn skips_prescription_outside_lookahead_window() {
        let f = fixture();
        // 30 days remaining on 2026-01-01
        add_rx(&f, 30, 1.0, date(2026, 1, 1));

        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 1, 1), 7)
            .unwrap();

        assert!(f.service.list_dashboard(&f.pharmacy_id).unwrap().is_empty());
    }

    #[test]
    fn already_depleted_prescription_still_gets_an_order() {
        let f = fixture();
        // Depleted 2026-01-31, checked well past that
        add_rx(&f, 30, 1.0, date(2026, 1, 1));

        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 3, 1), 7)
            .unwrap();

        assert_eq!(f.service.list_dashboard(&f.pharmacy_id).unwrap().len(), 1);
    }

    #[test]
    fn ensure_orders_is_idempotent() {
        let f = fixture();
        add_rx(&f, 30, 1.0, date(2026, 1, 1));

        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 1, 26), 7)
            .unwrap();
        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 1, 26), 7)
            .unwrap();

        assert_eq!(f.service.list_dashboard(&f.pharmacy_id).unwrap().len(), 1);
    }

    #[test]
    fn new_cycle_gets_a_fresh_order() {
        let f = fixture();
        let rx = add_rx(&f, 30, 1.0, date(2026, 1, 1));

        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 1, 26), 7)
            .unwrap();

        // Refill rolls the prescription to a new cycle (and fulfills
        // the old order); the next window then needs a new order.
        f.store.record_refill(&rx.id, date(2026, 1, 30)).unwrap();
        f.service
            .ensure_orders(&f.pharmacy_id, date(2026, 2, 24), 7)
            .unwrap();

        let entries = f.service.list_dashboard(&f.pharmacy_id).unwrap();
        assert_eq!(entries.len(), 2);
        let open: Vec<_> = entries
            .iter()
            .filter(|e| e.order_status != OrderStatus::Fulfilled)
            .collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].cycle_start_date, date(2026, 1, 30));
    }

    #[test]
    fn advance_walks_the_full_lifecycle() {
        let f = fixture();
        let rx = add_rx(&f, 30, 1.0, date(2026, 1, 1));
        let order = f
            .store
            .create_order(&CreateOrderParams {
                prescription_id: rx.id,
                cycle_start_date: rx.box_start_date,
                estimated_depletion_date: rx.estimated_depletion_date(),
            })
            .unwrap();

        f.service.advance_status(&order.id, date(2026, 1, 28)).unwrap();
        assert_eq!(
            f.store.get_order(&order.id).unwrap().unwrap().status,
            OrderStatus::Prepared
        );
        assert!(f.refiller.calls().is_empty());

        f.service.advance_status(&order.id, date(2026, 1, 29)).unwrap();
        assert_eq!(
            f.store.get_order(&order.id).unwrap().unwrap().status,
            OrderStatus::Fulfilled
        );
        // Exactly one rollover, with the order's prescription and the given date
        assert_eq!(f.refiller.calls(), vec![(rx.id, date(2026, 1, 29))]);
    }

    #[test]
    fn advance_on_fulfilled_fails_without_side_effects() {
        let f = fixture();
        let rx = add_rx(&f, 30, 1.0, date(2026, 1, 1));
        let order = f
            .store
            .create_order(&CreateOrderParams {
                prescription_id: rx.id,
                cycle_start_date: rx.box_start_date,
                estimated_depletion_date: rx.estimated_depletion_date(),
            })
            .unwrap();
        f.store
            .update_order_status(&order.id, OrderStatus::Fulfilled)
            .unwrap();

        let err = f
            .service
            .advance_status(&order.id, date(2026, 1, 29))
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition));
        assert_eq!(
            f.store.get_order(&order.id).unwrap().unwrap().status,
            OrderStatus::Fulfilled
        );
        assert!(f.refiller.calls().is_empty());
    }

    #[test]
    fn advance_missing_order_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .advance_status(&Uuid::new_v4(), date(2026, 1, 29))
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound));
    }
}
