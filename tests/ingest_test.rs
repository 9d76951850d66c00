mod common;

use common::{
    ctgov_export, FakeHttp, CTGOV_ROW_FULL, CTGOV_ROW_SPARSE, CTGOV_URL, EUDRACT_PAGE, EUDRACT_URL,
};
use std::sync::Arc;
use trials_scraper::aggregate::AggregationQueries;
use trials_scraper::app::ingest_use_case::IngestUseCase;
use trials_scraper::error::ErrorCategory;
use trials_scraper::pipeline::{CsvImportPipeline, EudractScrapePipeline};
use trials_scraper::storage::{InMemoryStorage, TrialStore};
use trials_scraper::types::AggregationRow;

fn ingest_with(store: Arc<dyn TrialStore>, http: FakeHttp) -> IngestUseCase {
    let http = Arc::new(http);
    IngestUseCase::new(
        store,
        EudractScrapePipeline::new(http.clone(), EUDRACT_URL),
        CsvImportPipeline::new(http, CTGOV_URL),
    )
}

fn healthy_http() -> FakeHttp {
    FakeHttp::new()
        .with_page(EUDRACT_URL, 200, EUDRACT_PAGE)
        .with_page(CTGOV_URL, 200, ctgov_export(&[CTGOV_ROW_FULL, CTGOV_ROW_SPARSE]))
}

fn sorted(mut rows: Vec<AggregationRow>) -> Vec<(String, u64)> {
    rows.sort_by(|a, b| a.value.cmp(&b.value));
    rows.into_iter().map(|r| (r.value, r.count)).collect()
}

#[tokio::test]
async fn test_repeated_runs_leave_identical_state() {
    let store: Arc<dyn TrialStore> = Arc::new(InMemoryStorage::new());
    let ingest = ingest_with(store.clone(), healthy_http());

    let first = ingest.ingest_clinical_trials().await.unwrap();
    let after_first = store.find_clinical_trials().await.unwrap();
    ingest.ingest_clinical_trials().await.unwrap();
    let after_second = store.find_clinical_trials().await.unwrap();

    assert_eq!(first, after_first);
    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 2);

    ingest.ingest_eudract().await.unwrap();
    ingest.ingest_eudract().await.unwrap();
    assert_eq!(store.find_eudract().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_records() {
    let store: Arc<dyn TrialStore> = Arc::new(InMemoryStorage::new());
    ingest_with(store.clone(), healthy_http())
        .ingest_clinical_trials()
        .await
        .unwrap();

    let broken = ingest_with(
        store.clone(),
        FakeHttp::new().with_page(CTGOV_URL, 500, "internal error"),
    );
    let err = broken.ingest_clinical_trials().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Fetch);
    assert_eq!(store.find_clinical_trials().await.unwrap().len(), 2);

    let err = broken.ingest_eudract().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Fetch);
    assert!(store.find_eudract().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interleave() {
    let store: Arc<dyn TrialStore> = Arc::new(InMemoryStorage::new());
    let ingest = Arc::new(ingest_with(store.clone(), healthy_http()));

    let a = tokio::spawn({
        let ingest = ingest.clone();
        async move { ingest.ingest_clinical_trials().await }
    });
    let b = tokio::spawn({
        let ingest = ingest.clone();
        async move { ingest.ingest_clinical_trials().await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(store.find_clinical_trials().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_trials_by_condition_and_sponsor() {
    let store: Arc<dyn TrialStore> = Arc::new(InMemoryStorage::new());
    ingest_with(store.clone(), healthy_http())
        .ingest_clinical_trials()
        .await
        .unwrap();
    let queries = AggregationQueries::new(store);

    assert_eq!(
        sorted(queries.trials_by_condition().await.unwrap()),
        vec![("Asthma".to_string(), 1), ("Diabetes".to_string(), 2)]
    );
    assert_eq!(
        sorted(queries.trials_by_sponsor().await.unwrap()),
        vec![
            ("BioNTech SE".to_string(), 1),
            ("National Cancer Institute (NCI)".to_string(), 1),
            ("Pfizer".to_string(), 1)
        ]
    );
}

#[tokio::test]
async fn test_aggregation_over_empty_store() {
    let queries = AggregationQueries::new(Arc::new(InMemoryStorage::new()));
    assert!(queries.trials_by_condition().await.unwrap().is_empty());
}
