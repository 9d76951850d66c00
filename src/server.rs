use crate::aggregate::AggregationQueries;
use crate::app::ingest_use_case::IngestUseCase;
use crate::error::{ErrorCategory, ScraperError};
use crate::types::{AggregationRow, MultiValueField};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub struct AppState {
    pub ingest: IngestUseCase,
    pub aggregates: AggregationQueries,
    pub metrics: Option<PrometheusHandle>,
}

impl IntoResponse for ScraperError {
    fn into_response(self) -> Response {
        let category = self.category();
        error!("Request failed: {}", self);
        let status = match category {
            ErrorCategory::Fetch => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::DataFormat => StatusCode::BAD_GATEWAY,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": category.describe() }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ScraperError>;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "trials-scraper",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn scrape_eudract(Extension(state): Extension<Arc<AppState>>) -> ApiResult {
    let trials = state.ingest.ingest_eudract().await?;
    Ok(Json(json!({ "trials": trials })))
}

async fn list_eudract(Extension(state): Extension<Arc<AppState>>) -> ApiResult {
    let trials = state.ingest.store().find_eudract().await?;
    Ok(Json(json!({ "trials": trials })))
}

async fn download_clinical_trials(Extension(state): Extension<Arc<AppState>>) -> ApiResult {
    let trials = state.ingest.ingest_clinical_trials().await?;
    Ok(Json(json!({ "trials": trials })))
}

async fn list_clinical_trials(Extension(state): Extension<Arc<AppState>>) -> ApiResult {
    let trials = state.ingest.store().find_clinical_trials().await?;
    Ok(Json(json!({ "trials": trials })))
}

async fn trials_by_sponsor(Extension(state): Extension<Arc<AppState>>) -> ApiResult {
    let rows = state.aggregates.trials_by_sponsor().await?;
    Ok(Json(aggregation_body(
        "trials_by_sponsor",
        MultiValueField::SponsorCollaborators,
        rows,
    )))
}

async fn trials_by_condition(Extension(state): Extension<Arc<AppState>>) -> ApiResult {
    let rows = state.aggregates.trials_by_condition().await?;
    Ok(Json(aggregation_body(
        "trials_by_condition",
        MultiValueField::Conditions,
        rows,
    )))
}

/// `{"<key>": [{"<sponsor|condition>": value, "count": n}, ...]}`
pub fn aggregation_body(key: &str, field: MultiValueField, rows: Vec<AggregationRow>) -> Value {
    let rows: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            let mut obj = Map::new();
            obj.insert(field.value_key().to_string(), Value::String(row.value));
            obj.insert("count".to_string(), Value::from(row.count));
            Value::Object(obj)
        })
        .collect();
    let mut body = Map::new();
    body.insert(key.to_string(), Value::Array(rows));
    Value::Object(body)
}

/// Create the HTTP router with all API routes
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/scrape-eudract", get(scrape_eudract))
        .route("/api/eudract", get(list_eudract))
        .route("/api/download-clinical-trials-gov", get(download_clinical_trials))
        .route("/api/clinicaltrials", get(list_clinical_trials))
        .route("/api/trialsbysponsor", get(trials_by_sponsor))
        .route("/api/trialsbycondition", get(trials_by_condition))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
