//! Metrics recording.
//!
//! # Metrics
//! - `pool_router_selections_total` (counter): requests served, by class, policy, backend
//! - `pool_router_connection_errors_total` (counter): failed opens, by class, backend
//! - `pool_router_initializations_total` (counter): list builds, by class, outcome

use crate::registry::TrafficClass;

pub const SELECTIONS_TOTAL: &str = "pool_router_selections_total";
pub const CONNECTION_ERRORS_TOTAL: &str = "pool_router_connection_errors_total";
pub const INITIALIZATIONS_TOTAL: &str = "pool_router_initializations_total";

/// Register descriptions with the installed recorder.
pub fn describe() {
    ::metrics::describe_counter!(SELECTIONS_TOTAL, "Connection requests routed to a data source");
    ::metrics::describe_counter!(CONNECTION_ERRORS_TOTAL, "Connections a data source failed to open");
    ::metrics::describe_counter!(INITIALIZATIONS_TOTAL, "Backend list initialization attempts");
}

pub fn record_selection(class: TrafficClass, policy: &'static str, backend: &str) {
    ::metrics::counter!(
        SELECTIONS_TOTAL,
        "class" => class.as_str(),
        "policy" => policy,
        "backend" => backend.to_string()
    )
    .increment(1);
}

pub fn record_connection_error(class: TrafficClass, backend: &str) {
    ::metrics::counter!(
        CONNECTION_ERRORS_TOTAL,
        "class" => class.as_str(),
        "backend" => backend.to_string()
    )
    .increment(1);
}

pub fn record_initialization(class: TrafficClass, success: bool) {
    let outcome = if success { "ready" } else { "failed" };
    ::metrics::counter!(INITIALIZATIONS_TOTAL, "class" => class.as_str(), "outcome" => outcome)
        .increment(1);
}
