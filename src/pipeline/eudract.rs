use crate::app::ports::HttpClientPort;
use crate::constants::{EUDRACT_RESULT_SELECTOR, EUDRACT_SOURCE};
use crate::error::Result;
use crate::metrics::PipelineMetrics;
use crate::parser::HtmlTrialExtractor;
use crate::pipeline::{fetch_document, PipelineOutput};
use crate::types::EudractTrial;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(EUDRACT_RESULT_SELECTOR).expect("result selector is valid"));

/// Scrapes the first page of EudraCT search results.
pub struct EudractScrapePipeline {
    http: Arc<dyn HttpClientPort>,
    url: String,
    extractor: HtmlTrialExtractor,
}

impl EudractScrapePipeline {
    pub fn new(http: Arc<dyn HttpClientPort>, url: impl Into<String>) -> Self {
        Self::with_extractor(http, url, HtmlTrialExtractor::new())
    }

    pub fn with_extractor(
        http: Arc<dyn HttpClientPort>,
        url: impl Into<String>,
        extractor: HtmlTrialExtractor,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            extractor,
        }
    }

    #[instrument(skip(self), fields(source = EUDRACT_SOURCE))]
    pub async fn run(&self) -> Result<PipelineOutput<EudractTrial>> {
        PipelineMetrics::record_run(EUDRACT_SOURCE);
        let started = Instant::now();

        info!("Fetching EudraCT search page from {}", self.url);
        let payload = fetch_document(&*self.http, EUDRACT_SOURCE, &self.url).await?;
        let body = String::from_utf8_lossy(&payload);

        let output = self.extract_page(&body);
        info!(
            "Extracted {} EudraCT trials ({} skipped)",
            output.records.len(),
            output.skipped
        );
        PipelineMetrics::record_outcome(
            EUDRACT_SOURCE,
            output.records.len(),
            output.skipped,
            started.elapsed().as_secs_f64(),
        );
        Ok(output)
    }

    /// Extract every result table of an already fetched page, in page order.
    pub fn extract_page(&self, html: &str) -> PipelineOutput<EudractTrial> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();
        let mut total_seen = 0;

        for trial_element in document.select(&RESULT_SELECTOR) {
            total_seen += 1;
            if let Some(trial) = self.extractor.extract(trial_element) {
                records.push(trial);
            }
        }

        PipelineOutput {
            skipped: total_seen - records.len(),
            records,
            total_seen,
            length_warnings: 0,
        }
    }
}
