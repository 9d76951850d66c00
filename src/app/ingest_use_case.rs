use crate::error::Result;
use crate::pipeline::{CsvImportPipeline, EudractScrapePipeline};
use crate::storage::TrialStore;
use crate::types::{ClinicalTrial, EudractTrial};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Runs a pipeline and swaps its output into storage.
///
/// Each pipeline has its own lock held from fetch to swap, so two runs of the
/// same pipeline never interleave. The two pipelines run independently.
pub struct IngestUseCase {
    store: Arc<dyn TrialStore>,
    eudract: EudractScrapePipeline,
    ctgov: CsvImportPipeline,
    eudract_lock: Mutex<()>,
    ctgov_lock: Mutex<()>,
}

impl IngestUseCase {
    pub fn new(
        store: Arc<dyn TrialStore>,
        eudract: EudractScrapePipeline,
        ctgov: CsvImportPipeline,
    ) -> Self {
        Self {
            store,
            eudract,
            ctgov,
            eudract_lock: Mutex::new(()),
            ctgov_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<dyn TrialStore> {
        Arc::clone(&self.store)
    }

    /// Scrape EudraCT and replace the stored set. Fails without touching storage
    /// if the fetch fails.
    #[instrument(skip(self))]
    pub async fn ingest_eudract(&self) -> Result<Vec<EudractTrial>> {
        let _guard = self.eudract_lock.lock().await;
        let output = self.eudract.run().await?;
        let generation = self.store.replace_eudract(&output.records).await?;
        info!(generation, count = output.records.len(), "EudraCT trials replaced");
        Ok(output.records)
    }

    /// Import the ClinicalTrials.gov export and replace the stored set.
    #[instrument(skip(self))]
    pub async fn ingest_clinical_trials(&self) -> Result<Vec<ClinicalTrial>> {
        let _guard = self.ctgov_lock.lock().await;
        let output = self.ctgov.run().await?;
        let generation = self.store.replace_clinical_trials(&output.records).await?;
        info!(generation, count = output.records.len(), "ClinicalTrials.gov trials replaced");
        Ok(output.records)
    }
}
