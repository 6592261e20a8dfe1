use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::EventParameters;

/// Settings for one pollution-model invocation, read from a JSON file.
/// Missing keys fall back to `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub event: EventParameters,
    /// SQLite file holding persisted scenarios.
    pub database: PathBuf,
    /// Persist the features that succeeded when others fail.
    pub allow_partial: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            event: EventParameters::default(),
            database: PathBuf::from("data/pollution.sqlite"),
            allow_partial: false,
        }
    }
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
