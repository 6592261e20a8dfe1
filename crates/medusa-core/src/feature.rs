use serde::{Deserialize, Serialize};

use crate::surface::SurfaceVariant;

/// Assumed carriageway width applied to road centre-line length, in the
/// same planar units as area.
pub const CARRIAGEWAY_WIDTH: f64 = 5.0;

/// One impervious surface handed to the model. Geometry stays with the
/// caller; only the derived area travels. The runner rejects a
/// `surface_area` that is not finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFeature {
    /// Opaque identifier, unique within its collection.
    pub id: String,
    pub variant: SurfaceVariant,
    pub surface_area: f64,
}

impl SurfaceFeature {
    pub fn building(id: impl Into<String>, variant: SurfaceVariant, footprint_area: f64) -> Self {
        Self { id: id.into(), variant, surface_area: footprint_area }
    }

    /// Road or car park from its centre-line length.
    pub fn road(id: impl Into<String>, variant: SurfaceVariant, length: f64) -> Self {
        Self { id: id.into(), variant, surface_area: length * CARRIAGEWAY_WIDTH }
    }
}

/// Model output for one feature in one run. Metals are in micrograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult {
    pub feature_id: String,
    pub surface_type: SurfaceVariant,
    pub total_suspended_solids: f64,
    pub total_copper: f64,
    pub total_zinc: f64,
    pub dissolved_copper: f64,
    pub dissolved_zinc: f64,
}

impl LoadResult {
    pub fn is_finite(&self) -> bool {
        [
            self.total_suspended_solids,
            self.total_copper,
            self.total_zinc,
            self.dissolved_copper,
            self.dissolved_zinc,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Identifiers of results carrying a NaN or infinite value.
pub fn non_finite(results: &[LoadResult]) -> Vec<&str> {
    results
        .iter()
        .filter(|r| !r.is_finite())
        .map(|r| r.feature_id.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn road_area_uses_carriageway_width() {
        let road = SurfaceFeature::road("r1", SurfaceVariant::AsphaltRoad, 20.0);
        assert_eq!(road.surface_area, 100.0);
    }

    #[test]
    fn non_finite_lists_offending_ids() {
        let ok = LoadResult {
            feature_id: "a".into(),
            surface_type: SurfaceVariant::ConcreteRoof,
            total_suspended_solids: 1.0,
            total_copper: 1.0,
            total_zinc: 1.0,
            dissolved_copper: 1.0,
            dissolved_zinc: 1.0,
        };
        let bad = LoadResult { feature_id: "b".into(), total_zinc: f64::NAN, ..ok.clone() };
        assert_eq!(non_finite(&[ok, bad]), vec!["b"]);
    }
}
