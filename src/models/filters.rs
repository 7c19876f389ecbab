use serde::{Deserialize, Serialize};

/// Raw dashboard filter parameters as received from the web layer.
///
/// Values stay strings on purpose: empty/`"all"` carry meaning for
/// status filters, and malformed dates must degrade to "no bound"
/// rather than error. Parsing happens at filter time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardFilter {
    /// `""` or `"all"` → no filter; otherwise exact computed status.
    pub prescription_status: String,
    /// `""` → hide fulfilled; `"all"` → show everything; otherwise exact.
    pub order_status: String,
    /// Inclusive lower bound on estimated depletion date (`YYYY-MM-DD`).
    pub date_from: String,
    /// Inclusive upper bound on estimated depletion date (`YYYY-MM-DD`).
    pub date_to: String,
}
