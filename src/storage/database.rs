use super::TrialStore;
use crate::constants::{CTGOV_SOURCE, EUDRACT_SOURCE};
use crate::error::{Result, ScraperError};
use crate::types::{AggregationRow, ClinicalTrial, EudractTrial, MultiValueField};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use serde::de::DeserializeOwned;
use std::env;
use tracing::{debug, info};

/// Turso/libSQL storage. Every row carries the generation it was written in;
/// the `generations` table says which one readers see.
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    /// Connect to Turso using `LIBSQL_URL` and `LIBSQL_AUTH_TOKEN`
    pub async fn from_env() -> Result<Self> {
        let url = env::var("LIBSQL_URL")
            .map_err(|_| ScraperError::storage("LIBSQL_URL environment variable not set"))?;
        let auth_token = env::var("LIBSQL_AUTH_TOKEN")
            .map_err(|_| ScraperError::storage("LIBSQL_AUTH_TOKEN environment variable not set"))?;

        info!("Connecting to Turso database at {}", url);
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| ScraperError::storage(format!("Failed to connect to database: {e}")))?;
        Self::with_database(db).await
    }

    /// Open (or create) a local database file
    pub async fn open_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ScraperError::storage(format!("Failed to open database {path}: {e}")))?;
        Self::with_database(db).await
    }

    async fn with_database(db: Database) -> Result<Self> {
        let storage = Self { db };
        storage.run_migrations().await?;
        Ok(storage)
    }

    fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| ScraperError::storage(format!("Failed to get database connection: {e}")))
    }

    async fn run_migrations(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(include_str!("../../migrations/001_create_trials.sql"))
            .await
            .map_err(|e| ScraperError::storage(format!("Failed to run migrations: {e}")))?;
        debug!("Database migrations applied");
        Ok(())
    }

    async fn current_generation(conn: &Connection, collection: &str) -> Result<i64> {
        let mut rows = conn
            .query(
                "SELECT current FROM generations WHERE collection = ?1",
                libsql::params![collection],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }

    /// Point readers at `generation` and drop every other generation of `table`.
    /// Must run inside the transaction that wrote the generation.
    async fn promote(conn: &Connection, collection: &str, table: &str, generation: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO generations (collection, current) VALUES (?1, ?2) \
             ON CONFLICT(collection) DO UPDATE SET current = excluded.current",
            libsql::params![collection, generation],
        )
        .await?;
        conn.execute(
            &format!("DELETE FROM {table} WHERE generation <> ?1"),
            libsql::params![generation],
        )
        .await?;
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, collection: &str, table: &str) -> Result<Vec<T>> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT data FROM {table} \
             WHERE generation = (SELECT current FROM generations WHERE collection = ?1) \
             ORDER BY position"
        );
        let mut rows = conn.query(&sql, libsql::params![collection]).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let data: String = row.get(0)?;
            out.push(serde_json::from_str(&data)?);
        }
        Ok(out)
    }
}

#[async_trait]
impl TrialStore for DatabaseStorage {
    async fn replace_eudract(&self, trials: &[EudractTrial]) -> Result<u64> {
        let conn = self.connection()?;
        let tx = conn.transaction().await?;
        let generation = Self::current_generation(&tx, EUDRACT_SOURCE).await? + 1;

        for (position, trial) in trials.iter().enumerate() {
            tx.execute(
                "INSERT INTO eudract (generation, position, eudract_number, data) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    generation,
                    position as i64,
                    trial.eudract_number.as_str(),
                    serde_json::to_string(trial)?
                ],
            )
            .await?;
        }

        Self::promote(&tx, EUDRACT_SOURCE, "eudract", generation).await?;
        tx.commit().await?;
        info!("Stored EudraCT generation {} with {} trials", generation, trials.len());
        Ok(generation as u64)
    }

    async fn find_eudract(&self) -> Result<Vec<EudractTrial>> {
        self.load(EUDRACT_SOURCE, "eudract").await
    }

    async fn replace_clinical_trials(&self, trials: &[ClinicalTrial]) -> Result<u64> {
        let conn = self.connection()?;
        let tx = conn.transaction().await?;
        let generation = Self::current_generation(&tx, CTGOV_SOURCE).await? + 1;

        for (position, trial) in trials.iter().enumerate() {
            tx.execute(
                "INSERT INTO clinicaltrials \
                 (generation, position, nct_number, sponsor_collaborators, conditions, data) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    generation,
                    position as i64,
                    trial.nct_number.clone(),
                    trial.sponsor_collaborators.clone(),
                    trial.conditions.clone(),
                    serde_json::to_string(trial)?
                ],
            )
            .await?;
        }

        Self::promote(&tx, CTGOV_SOURCE, "clinicaltrials", generation).await?;
        tx.commit().await?;
        info!(
            "Stored ClinicalTrials.gov generation {} with {} trials",
            generation,
            trials.len()
        );
        Ok(generation as u64)
    }

    async fn find_clinical_trials(&self) -> Result<Vec<ClinicalTrial>> {
        self.load(CTGOV_SOURCE, "clinicaltrials").await
    }

    async fn value_counts(&self, field: MultiValueField) -> Result<Vec<AggregationRow>> {
        let conn = self.connection()?;
        // SQLite has no string_to_array, so split on '|' with a recursive CTE.
        // The seed row carries a NULL value and is filtered out below.
        let column = field.column();
        let sql = format!(
            "WITH RECURSIVE split(value, rest) AS ( \
                 SELECT NULL, {column} || '|' FROM clinicaltrials \
                 WHERE generation = (SELECT current FROM generations WHERE collection = ?1) \
                   AND {column} IS NOT NULL AND {column} <> '' \
                 UNION ALL \
                 SELECT substr(rest, 1, instr(rest, '|') - 1), substr(rest, instr(rest, '|') + 1) \
                 FROM split WHERE rest <> '' \
             ) \
             SELECT value, COUNT(*) FROM split WHERE value IS NOT NULL GROUP BY value"
        );
        let mut rows = conn.query(&sql, libsql::params![CTGOV_SOURCE]).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            out.push(AggregationRow {
                value,
                count: count as u64,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(nct: &str, conditions: &str) -> ClinicalTrial {
        ClinicalTrial {
            nct_number: Some(nct.to_string()),
            conditions: Some(conditions.to_string()),
            ..Default::default()
        }
    }

    async fn open(dir: &tempfile::TempDir) -> DatabaseStorage {
        let path = dir.path().join("trials.db");
        DatabaseStorage::open_local(path.to_str().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_replace_swaps_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;

        store
            .replace_clinical_trials(&[trial("NCT1", "Asthma"), trial("NCT2", "Flu")])
            .await
            .unwrap();
        let generation = store
            .replace_clinical_trials(&[trial("NCT3", "Asthma|Diabetes")])
            .await
            .unwrap();

        assert_eq!(generation, 2);
        assert_eq!(
            store.find_clinical_trials().await.unwrap(),
            vec![trial("NCT3", "Asthma|Diabetes")]
        );
    }

    #[tokio::test]
    async fn test_value_counts_split_on_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        store
            .replace_clinical_trials(&[
                trial("NCT1", "Asthma|Diabetes"),
                trial("NCT2", "Diabetes"),
                trial("NCT3", ""),
            ])
            .await
            .unwrap();

        let mut rows = store.value_counts(MultiValueField::Conditions).await.unwrap();
        rows.sort_by(|a, b| a.value.cmp(&b.value));
        assert_eq!(
            rows,
            vec![
                AggregationRow { value: "Asthma".into(), count: 1 },
                AggregationRow { value: "Diabetes".into(), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_eudract_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir).await;
        let trials: Vec<EudractTrial> = ["2004-000018-29", "2015-001234-56"]
            .iter()
            .map(|n| EudractTrial {
                eudract_number: n.to_string(),
                sponsor_protocol: None,
                start_date: None,
                sponsor_name: None,
                full_title: None,
                medical_condition: None,
                population_age: None,
                gender: Some("Female".into()),
            })
            .collect();

        store.replace_eudract(&trials).await.unwrap();
        assert_eq!(store.find_eudract().await.unwrap(), trials);
    }
}
