//! Scenario-versioned, append-only persistence of model results.

pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::feature::LoadResult;

pub use sqlite::SqliteScenarioStore;

/// One persisted run of the model for one rainfall event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario_id: i64,
    pub results: Vec<LoadResult>,
}

/// Append-only store of scenario results.
///
/// Implementations must make id allocation atomic against concurrent
/// callers and must never hand out an id twice, including ids whose
/// `persist` later failed.
pub trait ScenarioStore {
    /// Next scenario id: 1 on an empty store, otherwise one past the
    /// highest id ever allocated.
    fn allocate_scenario_id(&self) -> Result<i64>;

    /// Append `results` tagged with `scenario_id`. All rows land or none do.
    ///
    /// Fails with `ScenarioNotAllocated` for an id this store never handed
    /// out and with `ScenarioAlreadyPersisted` when the id already holds
    /// rows, so prior scenarios are never touched.
    fn persist(&self, scenario_id: i64, results: &[LoadResult]) -> Result<()>;

    fn load_scenario(&self, scenario_id: i64) -> Result<ScenarioRecord>;

    fn latest_scenario_id(&self) -> Result<Option<i64>>;

    /// Allocate an id and persist under it. On a failed persist the id is
    /// burned; retry calls `record` again.
    ///
    /// An empty `results` still consumes an id but leaves no rows, so
    /// `load_scenario` on it reports `ScenarioNotFound`. Callers that want
    /// every id to be loadable reject empty runs first.
    fn record(&self, results: &[LoadResult]) -> Result<i64> {
        let scenario_id = self.allocate_scenario_id()?;
        self.persist(scenario_id, results)?;
        Ok(scenario_id)
    }
}
