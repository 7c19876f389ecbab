//! PharmaRecall — prescription replenishment engine.
//!
//! Tracks recurring medication prescriptions and schedules restocking
//! orders before a patient's current box runs out. The embedding web
//! layer drives everything through in-process calls: dashboard views
//! trigger order generation and approaching-depletion notifications,
//! staff actions advance orders and record refills.

pub mod config;
pub mod db;
pub mod models;
pub mod depletion; // pure depletion-date estimator + urgency classifier
pub mod store; // storage ports + SQLite implementation
pub mod prescriptions; // validation, CRUD, refill rollover
pub mod orders; // order lifecycle state machine + EnsureOrders policy
pub mod notifications; // approaching-notification policy + read tracking
pub mod dashboard; // dashboard assembly + filtering

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("PharmaRecall engine v{}", config::APP_VERSION);
}
