//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket service operations by outcome
//! - Store read/write failures

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};

// =============================================================================
// Ticket Service Metrics
// =============================================================================

/// Ticket operations by operation name and result.
pub static TICKET_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "helpdesk_ticket_operations_total",
            "Total ticket service operations",
        ),
        &["operation", "result"], // result: "ok", "not_found", "store_error"
    )
    .unwrap()
});

/// Store failures by direction.
pub static STORE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "helpdesk_store_failures_total",
            "Total ticket store read/write failures",
        ),
        &["operation"], // "read", "write"
    )
    .unwrap()
});

/// All core metrics, for registration in the server registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKET_OPERATIONS.clone()),
        Box::new(STORE_FAILURES.clone()),
    ]
}
