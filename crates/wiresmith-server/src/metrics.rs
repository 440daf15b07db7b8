//! Prometheus metrics for the wiresmith service.
//!
//! Tracks validation outcomes, generated mappings and deployments.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_int_counter, CounterVec, Encoder, IntCounter, TextEncoder,
};
use tracing::warn;
use wiresmith_admin::DeployReport;

lazy_static! {
    /// Total number of HTTP requests served
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "wiresmith_requests_total",
        "Total number of HTTP requests served",
        &["method", "status"]
    )
    .unwrap();

    /// Documents validated, by outcome
    pub static ref DOCUMENTS_VALIDATED_TOTAL: CounterVec = register_counter_vec!(
        "wiresmith_documents_validated_total",
        "Total number of mock definition documents validated",
        &["outcome"]  // outcome: valid|invalid
    )
    .unwrap();

    /// Mappings produced by the transformer
    pub static ref MAPPINGS_GENERATED_TOTAL: IntCounter = register_int_counter!(
        "wiresmith_mappings_generated_total",
        "Total number of mappings generated from documents"
    )
    .unwrap();

    /// Mappings pushed to a stub server, by outcome
    pub static ref MAPPINGS_DEPLOYED_TOTAL: CounterVec = register_counter_vec!(
        "wiresmith_mappings_deployed_total",
        "Total number of mapping create calls against stub servers",
        &["outcome"]  // outcome: success|failure
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Helper to record request processing
pub fn record_request(method: &str, status: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[method, &status.to_string()])
        .inc();
}

/// Helper to record a validation outcome
pub fn record_validation(is_valid: bool) {
    let outcome = if is_valid { "valid" } else { "invalid" };
    DOCUMENTS_VALIDATED_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

pub fn record_generated(count: usize) {
    MAPPINGS_GENERATED_TOTAL.inc_by(count as u64);
}

/// Helper to record the outcome of a deploy batch
pub fn record_deploy(report: &DeployReport) {
    MAPPINGS_DEPLOYED_TOTAL
        .with_label_values(&["success"])
        .inc_by(report.success_count() as f64);
    MAPPINGS_DEPLOYED_TOTAL
        .with_label_values(&["failure"])
        .inc_by(report.failure_count() as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        record_request("GET", 200);
        record_validation(true);
        record_validation(false);
        record_generated(3);
        record_deploy(&DeployReport::default());

        let output = collect_metrics();
        assert!(output.contains("wiresmith_requests_total"));
        assert!(output.contains("wiresmith_documents_validated_total"));
        assert!(output.contains("wiresmith_mappings_generated_total"));
        assert!(output.contains("wiresmith_mappings_deployed_total"));
    }
}
