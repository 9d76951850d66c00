//! Frequency tables over pipe-delimited multi-value fields.

use crate::constants::MULTI_VALUE_SEPARATOR;
use crate::error::Result;
use crate::storage::TrialStore;
use crate::types::{AggregationRow, MultiValueField};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Count every `|`-separated value across `values`.
///
/// Absent and empty fields contribute nothing. Values are not trimmed, and an
/// empty segment between two separators counts as the empty value. Row order
/// is unspecified.
pub fn count_pipe_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<AggregationRow> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for field in values.into_iter().flatten().filter(|f| !f.is_empty()) {
        for value in field.split(MULTI_VALUE_SEPARATOR) {
            *counts.entry(value).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(value, count)| AggregationRow {
            value: value.to_string(),
            count,
        })
        .collect()
}

pub struct AggregationQueries {
    store: Arc<dyn TrialStore>,
}

impl AggregationQueries {
    pub fn new(store: Arc<dyn TrialStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn trials_by_sponsor(&self) -> Result<Vec<AggregationRow>> {
        self.store
            .value_counts(MultiValueField::SponsorCollaborators)
            .await
    }

    #[instrument(skip(self))]
    pub async fn trials_by_condition(&self) -> Result<Vec<AggregationRow>> {
        self.store.value_counts(MultiValueField::Conditions).await
    }

    pub async fn by_field(&self, field: MultiValueField) -> Result<Vec<AggregationRow>> {
        match field {
            MultiValueField::SponsorCollaborators => self.trials_by_sponsor().await,
            MultiValueField::Conditions => self.trials_by_condition().await,
        }
    }
}
