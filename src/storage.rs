use crate::error::Result;
use crate::types::{AggregationRow, ClinicalTrial, EudractTrial, MultiValueField};
use async_trait::async_trait;

#[cfg(feature = "db")]
pub mod database;
pub mod in_memory;

#[cfg(feature = "db")]
pub use database::DatabaseStorage;
pub use in_memory::InMemoryStorage;

/// Storage for both trial collections.
///
/// `replace_*` swaps in a complete new generation: readers observe either the
/// previous set or the new one, never a mix. Returns the new generation number.
#[async_trait]
pub trait TrialStore: Send + Sync {
    // EudraCT collection
    async fn replace_eudract(&self, trials: &[EudractTrial]) -> Result<u64>;
    async fn find_eudract(&self) -> Result<Vec<EudractTrial>>;

    // ClinicalTrials.gov collection
    async fn replace_clinical_trials(&self, trials: &[ClinicalTrial]) -> Result<u64>;
    async fn find_clinical_trials(&self) -> Result<Vec<ClinicalTrial>>;

    /// Frequency of each `|`-separated value of `field` across stored ClinicalTrials.gov trials
    async fn value_counts(&self, field: MultiValueField) -> Result<Vec<AggregationRow>>;
}
