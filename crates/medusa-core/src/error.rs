//! Error taxonomy for the pollutant-load model and its scenario store.

use thiserror::Error;

use crate::surface::SurfaceVariant;

pub type Result<T> = std::result::Result<T, PollutionError>;

#[derive(Error, Debug)]
pub enum PollutionError {
    /// A surface code that names none of the recognised variants.
    #[error("unknown surface type code {code:?} (expected one of Cr, Cu, Gv, Rd, CrP)")]
    UnknownSurface { code: String },

    /// A formula invoked with a variant outside its valid domain,
    /// e.g. the roof metal-load formula given a road.
    #[error("surface {variant:?} is not valid for computing {operation}: needed {expected}")]
    InvalidSurface {
        variant: SurfaceVariant,
        operation: &'static str,
        expected: &'static str,
    },

    /// Wraps the failure of one feature so callers can report which one.
    #[error("feature {feature_id}: {source}")]
    Feature {
        feature_id: String,
        #[source]
        source: Box<PollutionError>,
    },

    /// Surface area must be finite and strictly positive.
    #[error("invalid surface area {area} (must be finite and > 0)")]
    InvalidArea { area: f64 },

    #[error("invalid event parameter: {field}={value}")]
    InvalidEvent { field: &'static str, value: f64 },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("scenario {0} has no persisted results")]
    ScenarioNotFound(i64),

    #[error("scenario {0} already has persisted results")]
    ScenarioAlreadyPersisted(i64),

    #[error("scenario {0} was never allocated")]
    ScenarioNotAllocated(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PollutionError {
    /// True for both flavours of invalid-surface failure.
    pub fn is_invalid_surface(&self) -> bool {
        match self {
            Self::UnknownSurface { .. } | Self::InvalidSurface { .. } => true,
            Self::Feature { source, .. } => source.is_invalid_surface(),
            _ => false,
        }
    }
}
