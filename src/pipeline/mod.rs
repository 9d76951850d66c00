//! Fetch → parse → extract/map → validate pipelines for both registries.
//!
//! A pipeline run only produces records; persisting them is the caller's job
//! (see [`crate::app::ingest_use_case`]), so a failed run never touches storage.

pub mod ctgov;
pub mod eudract;

pub use ctgov::CsvImportPipeline;
pub use eudract::EudractScrapePipeline;

use crate::app::ports::HttpClientPort;
use crate::error::{Result, ScraperError};
use crate::metrics::PipelineMetrics;
use serde::Serialize;
use tracing::{debug, error};

/// Records accepted by one run plus what was dropped or flagged along the way
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput<T> {
    pub records: Vec<T>,
    pub total_seen: usize,
    pub skipped: usize,
    pub length_warnings: usize,
}

/// GET `url` and return the body; transport errors and non-2xx statuses are fetch failures.
pub async fn fetch_document(
    http: &dyn HttpClientPort,
    source_name: &'static str,
    url: &str,
) -> Result<Vec<u8>> {
    let resp = http.get(url).await.map_err(|e| {
        error!(source = source_name, url = %url, "Request error: {}", e);
        PipelineMetrics::record_fetch_error(source_name);
        ScraperError::fetch(source_name, e)
    })?;

    if !resp.is_success() {
        error!(source = source_name, url = %url, status = resp.status, "Upstream returned non-success status");
        PipelineMetrics::record_fetch_error(source_name);
        return Err(ScraperError::fetch(
            source_name,
            format!("HTTP status {}", resp.status),
        ));
    }

    debug!(
        source = source_name,
        bytes = resp.bytes.len(),
        content_type = %resp.content_type,
        "Fetched document"
    );
    Ok(resp.bytes)
}
