//! Prescription service — validation, CRUD, and refill rollover.
//!
//! Rollover archives the cycle that just ended, moves the depletion
//! clock to the new box, and closes any order still open for the old
//! cycle. The storage port applies the three writes as one atomic unit.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;
use crate::orders::RefillRecorder;
use crate::store::{ConsensusChecker, PrescriptionStore};

#[derive(Error, Debug)]
pub enum PrescriptionError {
    #[error("prescription not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("patient must give consensus before prescriptions can be added")]
    ConsensusRequired,

    #[error("storage error: {0}")]
    Database(#[from] DatabaseError),
}

pub struct PrescriptionService {
    store: Arc<dyn PrescriptionStore>,
    consensus: Arc<dyn ConsensusChecker>,
}

impl PrescriptionService {
    pub fn new(store: Arc<dyn PrescriptionStore>, consensus: Arc<dyn ConsensusChecker>) -> Self {
        PrescriptionService { store, consensus }
    }

    /// Validate and create a prescription. Blocked until the patient
    /// has given consensus.
    pub fn create(
        &self,
        params: CreatePrescriptionParams,
    ) -> Result<Prescription, PrescriptionError> {
        validate(
            &params.medication_name,
            params.units_per_box,
            params.daily_consumption,
        )?;

        if !self.consensus.has_consensus(&params.patient_id)? {
            return Err(PrescriptionError::ConsensusRequired);
        }

        let rx = self.store.create_prescription(&params)?;
        tracing::debug!(prescription = %rx.id, patient = %rx.patient_id, "prescription created");
        Ok(rx)
    }

    pub fn get(&self, id: &Uuid) -> Result<Prescription, PrescriptionError> {
        self.store
            .get_prescription(id)?
            .ok_or(PrescriptionError::NotFound)
    }

    pub fn list_by_patient(&self, patient_id: &Uuid) -> Result<Vec<Prescription>, PrescriptionError> {
        Ok(self.store.list_prescriptions_by_patient(patient_id)?)
    }

    /// Validate and update a prescription.
    pub fn update(&self, params: UpdatePrescriptionParams) -> Result<(), PrescriptionError> {
        validate(
            &params.medication_name,
            params.units_per_box,
            params.daily_consumption,
        )?;

        match self.store.update_prescription(&params) {
            Err(DatabaseError::NotFound { .. }) => Err(PrescriptionError::NotFound),
            other => Ok(other?),
        }
    }

    /// Record a refill: archive the old cycle and start the new one.
    pub fn record_refill(
        &self,
        prescription_id: &Uuid,
        new_start_date: NaiveDate,
    ) -> Result<(), PrescriptionError> {
        match self.store.record_refill(prescription_id, new_start_date) {
            Err(DatabaseError::NotFound { .. }) => Err(PrescriptionError::NotFound),
            Err(e) => Err(e.into()),
            Ok(()) => {
                tracing::debug!(prescription = %prescription_id, start = %new_start_date, "refill recorded");
                Ok(())
            }
        }
    }
}

/// Rollover port consumed by the order lifecycle on fulfillment.
impl RefillRecorder for PrescriptionService {
    fn record_refill(
        &self,
        prescription_id: &Uuid,
        new_start_date: NaiveDate,
    ) -> Result<(), PrescriptionError> {
        PrescriptionService::record_refill(self, prescription_id, new_start_date)
    }
}

fn validate(
    medication_name: &str,
    units_per_box: i32,
    daily_consumption: f64,
) -> Result<(), PrescriptionError> {
    if medication_name.trim().is_empty() {
        return Err(PrescriptionError::Validation(
            "medication name is required".into(),
        ));
    }
    if units_per_box <= 0 {
        return Err(PrescriptionError::Validation(
            "units per box must be greater than zero".into(),
        ));
    }
    if daily_consumption <= 0.0 {
        return Err(PrescriptionError::Validation(
            "daily consumption must be greater than zero".into(),
        ));
    }
    // A box must last at least one day.
    if daily_consumption >= units_per_box as f64 {
        return Err(PrescriptionError::Validation(
            "daily consumption must be lower than units per box".into(),
        ));
    }
    Ok(())
}
