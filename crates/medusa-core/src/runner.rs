//! Event runner: applies TSS → total metal → dissolved metal to every
//! building and road feature for one rainfall event.

#[cfg(feature = "threading")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::dissolved::compute_dissolved_load;
use crate::error::{PollutionError, Result};
use crate::event::EventParameters;
use crate::feature::{LoadResult, SurfaceFeature};
use crate::metals::{compute_road_carpark_metal_load, compute_roof_metal_load, MetalLoad};
use crate::sediment::compute_tss;

/// Per-feature outcome; failures are `PollutionError::Feature`.
pub type FeatureOutcome = Result<LoadResult>;

/// Runs the load model over building and road collections.
///
/// Each feature depends only on itself and the shared `EventParameters`, so
/// with the `threading` feature the collections are evaluated on the rayon
/// pool. Output order is unaffected.
pub struct EventRunner;

impl EventRunner {
    pub fn new() -> Self { Self }

    /// Evaluate every feature, keeping failures in place.
    ///
    /// Buildings come first, then roads, each in input order.
    pub fn evaluate(
        &self,
        buildings: &[SurfaceFeature],
        roads: &[SurfaceFeature],
        event: &EventParameters,
    ) -> Vec<FeatureOutcome> {
        debug!(buildings = buildings.len(), roads = roads.len(), ?event, "evaluating rain event");

        let mut outcomes = map_features(buildings, |f| with_feature_id(f, building_load(f, event)));
        outcomes.extend(map_features(roads, |f| with_feature_id(f, road_load(f, event))));

        for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            warn!("{err}");
        }
        outcomes
    }

    /// Evaluate every feature; the first failure (in output order) fails the run.
    pub fn run(
        &self,
        buildings: &[SurfaceFeature],
        roads: &[SurfaceFeature],
        event: &EventParameters,
    ) -> Result<Vec<LoadResult>> {
        self.evaluate(buildings, roads, event).into_iter().collect()
    }
}

impl Default for EventRunner {
    fn default() -> Self { Self::new() }
}

// ── Per-feature pipelines ─────────────────────────────────────────────────────

fn check_area(feature: &SurfaceFeature) -> Result<()> {
    let area = feature.surface_area;
    if area.is_finite() && area > 0.0 {
        Ok(())
    } else {
        Err(PollutionError::InvalidArea { area })
    }
}

fn building_load(feature: &SurfaceFeature, event: &EventParameters) -> Result<LoadResult> {
    check_area(feature)?;
    let tss = compute_tss(feature.surface_area, event, feature.variant);
    let total = compute_roof_metal_load(feature.surface_area, event, feature.variant)?;
    Ok(assemble(feature, tss, total))
}

fn road_load(feature: &SurfaceFeature, event: &EventParameters) -> Result<LoadResult> {
    if feature.variant.is_roof() {
        return Err(PollutionError::InvalidSurface {
            variant: feature.variant,
            operation: "road/car park metal load",
            expected: "a road or car park",
        });
    }
    check_area(feature)?;
    let tss = compute_tss(feature.surface_area, event, feature.variant);
    let total = compute_road_carpark_metal_load(tss);
    Ok(assemble(feature, tss, total))
}

fn assemble(feature: &SurfaceFeature, tss: f64, total: MetalLoad) -> LoadResult {
    let dissolved = compute_dissolved_load(total, feature.variant);
    LoadResult {
        feature_id: feature.id.clone(),
        surface_type: feature.variant,
        total_suspended_solids: tss,
        total_copper: total.copper,
        total_zinc: total.zinc,
        dissolved_copper: dissolved.copper,
        dissolved_zinc: dissolved.zinc,
    }
}

fn with_feature_id(feature: &SurfaceFeature, outcome: Result<LoadResult>) -> FeatureOutcome {
    outcome.map_err(|source| PollutionError::Feature {
        feature_id: feature.id.clone(),
        source: Box::new(source),
    })
}

#[cfg(feature = "threading")]
fn map_features<F>(features: &[SurfaceFeature], f: F) -> Vec<FeatureOutcome>
where
    F: Fn(&SurfaceFeature) -> FeatureOutcome + Sync + Send,
{
    // Indexed collect keeps input order.
    features.par_iter().map(f).collect()
}

#[cfg(not(feature = "threading"))]
fn map_features<F>(features: &[SurfaceFeature], f: F) -> Vec<FeatureOutcome>
where
    F: Fn(&SurfaceFeature) -> FeatureOutcome,
{
    features.iter().map(f).collect()
}
