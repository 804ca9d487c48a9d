// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the CIS webhook solver.
//!
//! All metrics use the namespace prefix `cis_webhook` and are exposed on the
//! `/metrics` endpoint.
//!
//! # Example
//!
//! ```rust,no_run
//! use cis_webhook::metrics::record_challenge_success;
//!
//! record_challenge_success("Present", std::time::Duration::from_millis(250));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "cis_webhook";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Challenge Metrics
// ============================================================================

/// Total number of challenge operations by action and status
///
/// Labels:
/// - `action`: `Present` or `CleanUp`
/// - `status`: `success` or `error`
pub static CHALLENGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_challenges_total"),
        "Total number of challenge operations by action and status",
    );
    let counter = CounterVec::new(opts, &["action", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of challenge operations in seconds
///
/// Labels:
/// - `action`: `Present` or `CleanUp`
pub static CHALLENGE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_challenge_duration_seconds"),
        "Duration of challenge operations in seconds by action",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["action"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// DNS Record Metrics
// ============================================================================

/// Total number of TXT records changed at the provider
///
/// Labels:
/// - `operation`: `created` or `deleted`
pub static RECORDS_CHANGED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_records_changed_total"),
        "Total number of challenge TXT records created or deleted",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of errors by reason
///
/// Labels:
/// - `action`: `Present` or `CleanUp`
/// - `reason`: status reason of the error (e.g. `SecretNotFound`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of challenge errors by action and reason",
    );
    let counter = CounterVec::new(opts, &["action", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful challenge operation
pub fn record_challenge_success(action: &str, duration: Duration) {
    CHALLENGES_TOTAL
        .with_label_values(&[action, "success"])
        .inc();
    CHALLENGE_DURATION_SECONDS
        .with_label_values(&[action])
        .observe(duration.as_secs_f64());
}

/// Record a failed challenge operation
///
/// # Arguments
/// * `action` - `Present` or `CleanUp`
/// * `reason` - Status reason of the error
/// * `duration` - Time spent before failing
pub fn record_challenge_error(action: &str, reason: &str, duration: Duration) {
    CHALLENGES_TOTAL.with_label_values(&[action, "error"]).inc();
    CHALLENGE_DURATION_SECONDS
        .with_label_values(&[action])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[action, reason]).inc();
}

/// Record a TXT record created at the provider
pub fn record_txt_created() {
    RECORDS_CHANGED_TOTAL.with_label_values(&["created"]).inc();
}

/// Record a TXT record deleted at the provider
pub fn record_txt_deleted() {
    RECORDS_CHANGED_TOTAL.with_label_values(&["deleted"]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
