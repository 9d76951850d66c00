use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tracing::{error, info};

use trials_scraper::aggregate::AggregationQueries;
use trials_scraper::app::ingest_use_case::IngestUseCase;
use trials_scraper::app::ports::HttpClientPort;
use trials_scraper::config::{Config, StorageBackend};
use trials_scraper::error::ScraperError;
use trials_scraper::infra::http_client::ReqwestHttp;
use trials_scraper::pipeline::{CsvImportPipeline, EudractScrapePipeline};
use trials_scraper::server::{aggregation_body, start_server, AppState};
use trials_scraper::storage::{InMemoryStorage, TrialStore};
use trials_scraper::types::MultiValueField;
use trials_scraper::{logging, metrics};

#[derive(Parser)]
#[command(name = "trials_scraper")]
#[command(about = "Clinical-trial ingestion from EudraCT and ClinicalTrials.gov")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = trials_scraper::config::DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the EudraCT search page and replace stored EudraCT trials
    ScrapeEudract,
    /// Download the ClinicalTrials.gov export and replace stored trials
    ImportCtgov,
    /// Print trial counts per sponsor or condition
    Aggregate {
        #[arg(long, value_enum)]
        by: AggregateBy,
    },
    /// Serve the HTTP API
    Serve {
        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AggregateBy {
    Sponsor,
    Condition,
}

impl From<AggregateBy> for MultiValueField {
    fn from(by: AggregateBy) -> Self {
        match by {
            AggregateBy::Sponsor => MultiValueField::SponsorCollaborators,
            AggregateBy::Condition => MultiValueField::Conditions,
        }
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn TrialStore>, ScraperError> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "db")]
        StorageBackend::Libsql => Ok(Arc::new(
            trials_scraper::storage::DatabaseStorage::from_env().await?,
        )),
        #[cfg(not(feature = "db"))]
        StorageBackend::Libsql => Err(ScraperError::Config(
            "libsql storage requires building with the `db` feature".to_string(),
        )),
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    logging::init_logging();
    let handle = metrics::init_metrics();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;

    let store = build_store(&config).await?;
    let http: Arc<dyn HttpClientPort> = Arc::new(ReqwestHttp::new(&config.http)?);
    let ingest = IngestUseCase::new(
        store.clone(),
        EudractScrapePipeline::new(http.clone(), config.sources.eudract_url.clone()),
        CsvImportPipeline::new(http, config.sources.ctgov_url.clone()),
    );

    let result = match cli.command {
        Commands::ScrapeEudract => ingest
            .ingest_eudract()
            .await
            .map(|trials| serde_json::json!({ "trials": trials })),
        Commands::ImportCtgov => ingest
            .ingest_clinical_trials()
            .await
            .map(|trials| serde_json::json!({ "trials": trials })),
        Commands::Aggregate { by } => {
            let field = MultiValueField::from(by);
            let key = match by {
                AggregateBy::Sponsor => "trials_by_sponsor",
                AggregateBy::Condition => "trials_by_condition",
            };
            // The in-memory store starts empty on every process, so populate it first
            let populated = match config.storage.backend {
                StorageBackend::Memory => ingest.ingest_clinical_trials().await.map(|_| ()),
                StorageBackend::Libsql => Ok(()),
            };
            match populated {
                Ok(()) => AggregationQueries::new(store)
                    .by_field(field)
                    .await
                    .map(|rows| aggregation_body(key, field, rows)),
                Err(e) => Err(e),
            }
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let state = Arc::new(AppState {
                ingest,
                aggregates: AggregationQueries::new(store),
                metrics: handle,
            });
            return start_server(state, port).await;
        }
    };

    match result {
        Ok(body) => {
            info!("Run completed");
            print_json(&body)
        }
        Err(e) => {
            error!("Run failed: {}", e);
            anyhow::bail!("{}: {}", e.category().describe(), e)
        }
    }
}
