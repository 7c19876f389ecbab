//! Approaching-depletion notifications.
//!
//! The dashboard is re-scanned on every view; a prescription whose
//! computed status is exactly "approaching" yields one notification
//! per (pharmacy, prescription, transition) natural key, ever — the
//! store's create is idempotent, so repeated views do not spam.
//! Already-depleted prescriptions generate nothing: the approaching
//! crossing was either caught earlier or skipped for good.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;
use crate::store::NotificationStore;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("storage error: {0}")]
    Database(#[from] DatabaseError),
}

/// Prescription ids whose status, from the entry's stored estimated
/// depletion date, is exactly approaching. Deduplicated — a
/// prescription can surface through several order rows.
pub fn approaching_prescriptions(entries: &[DashboardEntry], as_of: NaiveDate) -> Vec<Uuid> {
    let mut ids = Vec::new();
    for entry in entries {
        if entry.prescription_status(as_of) == DepletionStatus::Approaching
            && !ids.contains(&entry.prescription_id)
        {
            ids.push(entry.prescription_id);
        }
    }
    ids
}

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        NotificationService { store }
    }

    /// One idempotent "approaching" notification per prescription id.
    pub fn generate_approaching(
        &self,
        pharmacy_id: &Uuid,
        prescription_ids: &[Uuid],
    ) -> Result<(), NotificationError> {
        for rx_id in prescription_ids {
            self.store
                .create_notification(pharmacy_id, rx_id, TransitionType::Approaching)?;
        }
        Ok(())
    }

    pub fn list(&self, pharmacy_id: &Uuid) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.store.list_notifications(pharmacy_id)?)
    }

    pub fn mark_read(&self, id: &Uuid, pharmacy_id: &Uuid) -> Result<(), NotificationError> {
        Ok(self.store.mark_notification_read(id, pharmacy_id)?)
    }

    pub fn mark_all_read(&self, pharmacy_id: &Uuid) -> Result<(), NotificationError> {
        Ok(self.store.mark_all_notifications_read(pharmacy_id)?)
    }

    pub fn count_unread(&self, pharmacy_id: &Uuid) -> Result<i64, NotificationError> {
        Ok(self.store.count_unread_notifications(pharmacy_id)?)
    }
}
