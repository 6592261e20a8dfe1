//! MEDUSA 2.0 pollutant loading for a single rainfall event.
//!
//! Computes total suspended solids and total/dissolved copper and zinc for
//! building roofs, roads and car parks, and persists each run as a numbered
//! scenario.
//!
//! Pipeline per feature:
//!   `sediment::compute_tss` → `metals` (roof formula or TSS proportionality)
//!   → `dissolved::compute_dissolved_load`.
//!
//! Model paper: <https://doi.org/10.3390/w12040969>

pub mod config;
pub mod dissolved;
pub mod error;
pub mod event;
pub mod feature;
pub mod geometry;
pub mod metals;
pub mod runner;
pub mod sediment;
pub mod store;
pub mod surface;

pub use error::{PollutionError, Result};
pub use event::EventParameters;
pub use feature::{LoadResult, SurfaceFeature};
pub use runner::EventRunner;
pub use store::{ScenarioRecord, ScenarioStore, SqliteScenarioStore};
pub use surface::SurfaceVariant;
