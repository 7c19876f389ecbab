//! Storage ports for the replenishment engine, one per aggregate, plus
//! the SQLite implementation.
//!
//! Services receive ports via constructor injection (`Arc<dyn …>`), so
//! tests can substitute in-memory or counting fakes. `SqliteStore`
//! satisfies every port by delegating to the `db::repository` query
//! functions behind a single mutex-guarded connection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, repository, DatabaseError};
use crate::depletion;
use crate::models::*;

// ─── Ports ────────────────────────────────────────────────────────────────────

/// Prescription aggregate operations.
pub trait PrescriptionStore: Send + Sync {
    fn create_prescription(
        &self,
        params: &CreatePrescriptionParams,
    ) -> Result<Prescription, DatabaseError>;

    fn get_prescription(&self, id: &Uuid) -> Result<Option<Prescription>, DatabaseError>;

    fn list_prescriptions_by_patient(
        &self,
        patient_id: &Uuid,
    ) -> Result<Vec<Prescription>, DatabaseError>;

    fn update_prescription(&self, params: &UpdatePrescriptionParams)
        -> Result<(), DatabaseError>;

    /// Refill rollover as one atomic unit: archive the old cycle to
    /// refill history, overwrite `box_start_date`, and auto-fulfill any
    /// still-open order for the old cycle. Partial application would
    /// desynchronize the depletion clock from the visible order status.
    fn record_refill(
        &self,
        prescription_id: &Uuid,
        new_start_date: NaiveDate,
    ) -> Result<(), DatabaseError>;
}

/// Order aggregate operations.
pub trait OrderStore: Send + Sync {
    fn create_order(&self, params: &CreateOrderParams) -> Result<Order, DatabaseError>;

    fn has_active_order(
        &self,
        prescription_id: &Uuid,
        cycle_start_date: NaiveDate,
    ) -> Result<bool, DatabaseError>;

    fn get_order(&self, id: &Uuid) -> Result<Option<Order>, DatabaseError>;

    fn update_order_status(&self, id: &Uuid, status: OrderStatus) -> Result<(), DatabaseError>;

    fn list_dashboard(&self, pharmacy_id: &Uuid) -> Result<Vec<DashboardEntry>, DatabaseError>;

    /// Prescriptions of consented patients for a pharmacy, as input to
    /// the lookahead check.
    fn list_lookahead_prescriptions(
        &self,
        pharmacy_id: &Uuid,
    ) -> Result<Vec<PrescriptionSummary>, DatabaseError>;
}

/// Notification aggregate operations. Creation is idempotent on the
/// natural key (pharmacy, prescription, transition).
pub trait NotificationStore: Send + Sync {
    fn create_notification(
        &self,
        pharmacy_id: &Uuid,
        prescription_id: &Uuid,
        transition_type: TransitionType,
    ) -> Result<(), DatabaseError>;

    fn list_notifications(&self, pharmacy_id: &Uuid) -> Result<Vec<Notification>, DatabaseError>;

    fn mark_notification_read(&self, id: &Uuid, pharmacy_id: &Uuid)
        -> Result<(), DatabaseError>;

    fn mark_all_notifications_read(&self, pharmacy_id: &Uuid) -> Result<(), DatabaseError>;

    fn count_unread_notifications(&self, pharmacy_id: &Uuid) -> Result<i64, DatabaseError>;
}

/// Consensus lookup for prescription creation.
pub trait ConsensusChecker: Send + Sync {
    fn has_consensus(&self, patient_id: &Uuid) -> Result<bool, DatabaseError>;
}

// ─── SQLite implementation ────────────────────────────────────────────────────

/// SQLite-backed store. The mutex serializes writers, which also backs
/// the "at most one active order per prescription per cycle" check.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        SqliteStore {
            conn: Mutex::new(conn),
        }
    }

    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(db::open_database(path)?))
    }

    /// In-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(db::open_memory_database()?))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Seed a pharmacy row.
    pub fn insert_pharmacy(&self, id: &Uuid, name: &str) -> Result<(), DatabaseError> {
        repository::patient::insert_pharmacy(&*self.conn()?, id, name)
    }

    /// Seed a patient row.
    pub fn insert_patient(
        &self,
        patient: &repository::patient::NewPatient,
    ) -> Result<(), DatabaseError> {
        repository::patient::insert_patient(&*self.conn()?, patient)
    }

    /// Archived box cycles for a prescription.
    pub fn list_refill_history(
        &self,
        prescription_id: &Uuid,
    ) -> Result<Vec<RefillHistoryEntry>, DatabaseError> {
        repository::prescription::list_refill_history(&*self.conn()?, prescription_id)
    }
}

impl PrescriptionStore for SqliteStore {
    fn create_prescription(
        &self,
        params: &CreatePrescriptionParams,
    ) -> Result<Prescription, DatabaseError> {
        let rx = Prescription {
            id: Uuid::new_v4(),
            patient_id: params.patient_id,
            medication_name: params.medication_name.clone(),
            units_per_box: params.units_per_box,
            daily_consumption: params.daily_consumption,
            box_start_date: params.box_start_date,
        };
        repository::prescription::insert_prescription(&*self.conn()?, &rx)?;
        Ok(rx)
    }

    fn get_prescription(&self, id: &Uuid) -> Result<Option<Prescription>, DatabaseError> {
        repository::prescription::get_prescription(&*self.conn()?, id)
    }

    fn list_prescriptions_by_patient(
        &self,
        patient_id: &Uuid,
    ) -> Result<Vec<Prescription>, DatabaseError> {
        repository::prescription::list_prescriptions_by_patient(&*self.conn()?, patient_id)
    }

    fn update_prescription(
        &self,
        params: &UpdatePrescriptionParams,
    ) -> Result<(), DatabaseError> {
        repository::prescription::update_prescription(&*self.conn()?, params)
    }

    fn record_refill(
        &self,
        prescription_id: &Uuid,
        new_start_date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current = repository::prescription::get_prescription(&tx, prescription_id)?
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "prescription".into(),
                id: prescription_id.to_string(),
            })?;

        let old_end = depletion::estimated_depletion_date(
            current.units_per_box,
            current.daily_consumption,
            current.box_start_date,
        );

        repository::prescription::insert_refill_history(
            &tx,
            &RefillHistoryEntry {
                id: Uuid::new_v4(),
                prescription_id: *prescription_id,
                box_start_date: current.box_start_date,
                box_end_date: old_end,
            },
        )?;

        repository::prescription::update_box_start_date(&tx, prescription_id, new_start_date)?;

        // Walk-in refill: close out any order still open for the cycle
        // that just ended.
        repository::order::fulfill_open_orders(&tx, prescription_id, current.box_start_date)?;

        tx.commit()?;
        Ok(())
    }
}

impl OrderStore for SqliteStore {
    fn create_order(&self, params: &CreateOrderParams) -> Result<Order, DatabaseError> {
        let order = Order {
            id: Uuid::new_v4(),
            prescription_id: params.prescription_id,
            cycle_start_date: params.cycle_start_date,
            estimated_depletion_date: params.estimated_depletion_date,
            status: OrderStatus::Pending,
        };
        repository::order::insert_order(&*self.conn()?, &order)?;
        Ok(order)
    }

    fn has_active_order(
        &self,
        prescription_id: &Uuid,
        cycle_start_date: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        repository::order::has_active_order(&*self.conn()?, prescription_id, cycle_start_date)
    }

    fn get_order(&self, id: &Uuid) -> Result<Option<Order>, DatabaseError> {
        repository::order::get_order(&*self.conn()?, id)
    }

    fn update_order_status(&self, id: &Uuid, status: OrderStatus) -> Result<(), DatabaseError> {
        repository::order::update_order_status(&*self.conn()?, id, status)
    }

    fn list_dashboard(&self, pharmacy_id: &Uuid) -> Result<Vec<DashboardEntry>, DatabaseError> {
        repository::order::list_dashboard_entries(&*self.conn()?, pharmacy_id)
    }

    fn list_lookahead_prescriptions(
        &self,
        pharmacy_id: &Uuid,
    ) -> Result<Vec<PrescriptionSummary>, DatabaseError> {
        repository::order::list_lookahead_prescriptions(&*self.conn()?, pharmacy_id)
    }
}

impl NotificationStore for SqliteStore {
    fn create_notification(
        &self,
        pharmacy_id: &Uuid,
        prescription_id: &Uuid,
        transition_type: TransitionType,
    ) -> Result<(), DatabaseError> {
        repository::notification::insert_notification(
            &*self.conn()?,
            &Uuid::new_v4(),
            pharmacy_id,
            prescription_id,
            transition_type,
        )
    }

    fn list_notifications(&self, pharmacy_id: &Uuid) -> Result<Vec<Notification>, DatabaseError> {
        repository::notification::list_notifications_by_pharmacy(&*self.conn()?, pharmacy_id)
    }

    fn mark_notification_read(
        &self,
        id: &Uuid,
        pharmacy_id: &Uuid,
    ) -> Result<(), DatabaseError> {
        repository::notification::mark_notification_read(&*self.conn()?, id, pharmacy_id)
    }

    fn mark_all_notifications_read(&self, pharmacy_id: &Uuid) -> Result<(), DatabaseError> {
        repository::notification::mark_all_notifications_read(&*self.conn()?, pharmacy_id)
    }

    fn count_unread_notifications(&self, pharmacy_id: &Uuid) -> Result<i64, DatabaseError> {
        repository::notification::count_unread_notifications(&*self.conn()?, pharmacy_id)
    }
}

impl ConsensusChecker for SqliteStore {
    fn has_consensus(&self, patient_id: &Uuid) -> Result<bool, DatabaseError> {
        repository::patient::has_consensus(&*self.conn()?, patient_id)
    }
}
