use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::debug;

use super::{ScenarioRecord, ScenarioStore};
use crate::error::{PollutionError, Result};
use crate::feature::LoadResult;

/// How long a writer waits on another process's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed scenario store.
///
/// Id allocation reads and bumps `scenario_sequence` inside one
/// `BEGIN IMMEDIATE` transaction, which serialises concurrent writers
/// across connections and processes.
pub struct SqliteScenarioStore {
    conn: Mutex<Connection>,
}

impl SqliteScenarioStore {
    /// Open (or create) the store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening scenario store");
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite itself consistent.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ScenarioStore for SqliteScenarioStore {
    fn allocate_scenario_id(&self) -> Result<i64> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let last = last_allocated(&tx)?;
        let next = last + 1;
        tx.execute(
            "UPDATE scenario_sequence SET last_scenario_id = ?1 WHERE id = 1",
            params![next],
        )?;
        tx.commit()?;
        debug!(scenario_id = next, "allocated scenario id");
        Ok(next)
    }

    fn persist(&self, scenario_id: i64, results: &[LoadResult]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if scenario_id < 1 || scenario_id > last_allocated(&tx)? {
            return Err(PollutionError::ScenarioNotAllocated(scenario_id));
        }
        let existing: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM pollution_model_output WHERE scenario_id = ?1)",
            params![scenario_id],
            |row| row.get(0),
        )?;
        if existing {
            return Err(PollutionError::ScenarioAlreadyPersisted(scenario_id));
        }
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO pollution_model_output (
                    spatial_feature_id, surface_type, total_suspended_solids,
                    total_copper, total_zinc, dissolved_copper, dissolved_zinc, scenario_id
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in results {
                stmt.execute(params![
                    r.feature_id,
                    r.surface_type.code(),
                    r.total_suspended_solids,
                    r.total_copper,
                    r.total_zinc,
                    r.dissolved_copper,
                    r.dissolved_zinc,
                    scenario_id,
                ])?;
            }
        }
        tx.commit()?;
        debug!(scenario_id, rows = results.len(), "persisted scenario");
        Ok(())
    }

    fn load_scenario(&self, scenario_id: i64) -> Result<ScenarioRecord> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT spatial_feature_id, surface_type, total_suspended_solids,
                    total_copper, total_zinc, dissolved_copper, dissolved_zinc
             FROM pollution_model_output WHERE scenario_id = ?1 ORDER BY row_id",
        )?;
        let rows = stmt.query_map(params![scenario_id], |row| {
            Ok(StoredRow {
                feature_id: row.get(0)?,
                surface_code: row.get(1)?,
                values: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?],
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?.into_result()?);
        }
        if results.is_empty() {
            return Err(PollutionError::ScenarioNotFound(scenario_id));
        }
        Ok(ScenarioRecord { scenario_id, results })
    }

    fn latest_scenario_id(&self) -> Result<Option<i64>> {
        let conn = self.lock();
        let latest = conn.query_row(
            "SELECT MAX(scenario_id) FROM pollution_model_output",
            [],
            |row| row.get(0),
        )?;
        Ok(latest)
    }
}

/// Highest id ever handed out. Rows written by a tool that bypassed the
/// sequence still count.
fn last_allocated(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT MAX(last_scenario_id,
                    (SELECT COALESCE(MAX(scenario_id), 0) FROM pollution_model_output))
         FROM scenario_sequence WHERE id = 1",
        [],
        |row| row.get(0),
    )
}

/// Raw row; SQLite stores NaN as NULL, read back as NaN.
struct StoredRow {
    feature_id: String,
    surface_code: String,
    values: [Option<f64>; 5],
}

impl StoredRow {
    fn into_result(self) -> Result<LoadResult> {
        let [tss, cu, zn, dcu, dzn] = self.values.map(|v| v.unwrap_or(f64::NAN));
        Ok(LoadResult {
            feature_id: self.feature_id,
            surface_type: self.surface_code.parse()?,
            total_suspended_solids: tss,
            total_copper: cu,
            total_zinc: zn,
            dissolved_copper: dcu,
            dissolved_zinc: dzn,
        })
    }
}
