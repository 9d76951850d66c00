//! Prometheus metrics for ingestion runs.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Idempotent; later calls return the first handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            Some(HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_run(source: &'static str) {
        counter!("trials_pipeline_runs_total", "source" => source).increment(1);
    }

    pub fn record_fetch_error(source: &'static str) {
        counter!("trials_fetch_errors_total", "source" => source).increment(1);
    }

    pub fn record_outcome(source: &'static str, accepted: usize, skipped: usize, duration_secs: f64) {
        counter!("trials_records_accepted_total", "source" => source).increment(accepted as u64);
        counter!("trials_records_skipped_total", "source" => source).increment(skipped as u64);
        histogram!("trials_pipeline_duration_seconds", "source" => source).record(duration_secs);
    }

    pub fn record_length_warnings(count: usize) {
        counter!("trials_length_warnings_total").increment(count as u64);
    }
}
