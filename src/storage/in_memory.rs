use super::TrialStore;
use crate::aggregate::count_pipe_values;
use crate::error::{Result, ScraperError};
use crate::types::{AggregationRow, ClinicalTrial, EudractTrial, MultiValueField};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;

struct Generation<T> {
    number: u64,
    records: Arc<Vec<T>>,
}

impl<T> Default for Generation<T> {
    fn default() -> Self {
        Self {
            number: 0,
            records: Arc::new(Vec::new()),
        }
    }
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    eudract: RwLock<Generation<EudractTrial>>,
    clinical_trials: RwLock<Generation<ClinicalTrial>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the new generation off-lock, then repoint readers in one write.
fn swap<T: Clone>(slot: &RwLock<Generation<T>>, records: &[T]) -> Result<u64> {
    let records = Arc::new(records.to_vec());
    let mut current = slot
        .write()
        .map_err(|_| ScraperError::storage("collection lock poisoned"))?;
    let number = current.number + 1;
    *current = Generation { number, records };
    Ok(number)
}

fn snapshot<T>(slot: &RwLock<Generation<T>>) -> Result<Arc<Vec<T>>> {
    let current = slot
        .read()
        .map_err(|_| ScraperError::storage("collection lock poisoned"))?;
    Ok(Arc::clone(&current.records))
}

#[async_trait]
impl TrialStore for InMemoryStorage {
    async fn replace_eudract(&self, trials: &[EudractTrial]) -> Result<u64> {
        let generation = swap(&self.eudract, trials)?;
        debug!("Stored EudraCT generation {} with {} trials", generation, trials.len());
        Ok(generation)
    }

    async fn find_eudract(&self) -> Result<Vec<EudractTrial>> {
        Ok(snapshot(&self.eudract)?.as_ref().clone())
    }

    async fn replace_clinical_trials(&self, trials: &[ClinicalTrial]) -> Result<u64> {
        let generation = swap(&self.clinical_trials, trials)?;
        debug!(
            "Stored ClinicalTrials.gov generation {} with {} trials",
            generation,
            trials.len()
        );
        Ok(generation)
    }

    async fn find_clinical_trials(&self) -> Result<Vec<ClinicalTrial>> {
        Ok(snapshot(&self.clinical_trials)?.as_ref().clone())
    }

    async fn value_counts(&self, field: MultiValueField) -> Result<Vec<AggregationRow>> {
        let trials = snapshot(&self.clinical_trials)?;
        Ok(count_pipe_values(trials.iter().map(|t| t.multi_value(field))))
    }
}
