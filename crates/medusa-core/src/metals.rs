//! Total copper and zinc loads.
//!
//! Roofs use the two-regime build-up/wash-off formula; roads and car parks
//! derive their metal load from TSS through fixed proportionality constants.

use serde::{Deserialize, Serialize};

use crate::error::{PollutionError, Result};
use crate::event::EventParameters;
use crate::surface::SurfaceVariant;

/// Wash-off coefficient `k`.
pub const WASH_OFF_COEFFICIENT: f64 = 1.0;
/// Duration (h) separating the first-flush and established regimes (`z`).
pub const REGIME_THRESHOLD_HOURS: f64 = 0.75;

/// Copper per unit TSS for roads and car parks.
pub const ROAD_COPPER_PER_TSS: f64 = 0.441;
/// Zinc per unit TSS for roads and car parks.
pub const ROAD_ZINC_PER_TSS: f64 = 1.96;

/// Copper and zinc load pair, micrograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetalLoad {
    pub copper: f64,
    pub zinc: f64,
}

/// Total copper and zinc washed off a roof.
///
/// Fails with `InvalidSurface` for road and car-park variants.
///
/// For `event_duration > z` the copper update multiplies the pre-adjustment
/// load back into itself while zinc does not. This asymmetry is reproduced
/// as published; do not symmetrise it.
pub fn compute_roof_metal_load(
    surface_area: f64,
    event: &EventParameters,
    variant: SurfaceVariant,
) -> Result<MetalLoad> {
    let coeffs = variant.roof_metal_coefficients().ok_or(PollutionError::InvalidSurface {
        variant,
        operation: "total metal load",
        expected: "a roof",
    })?;
    let (b, c) = (coeffs.copper, coeffs.zinc);
    let ph = event.rainfall_ph;
    let dry_days = event.antecedent_dry_days;
    let intensity = event.avg_rain_intensity;
    let duration = event.event_duration;

    let copper_initial =
        b[0] * ph.powf(b[1]) * b[2] * dry_days.powf(b[3]) * (b[4] * intensity.powf(b[5]));
    let zinc_initial =
        c[0] * ph + c[1] * c[2] * dry_days.powf(c[3]) * (c[4] * intensity.powf(c[5]));
    let copper_established = b[6] * ph.powf(b[7]);
    let zinc_established = c[6] * ph + c[7];

    let k = WASH_OFF_COEFFICIENT;
    let z = REGIME_THRESHOLD_HOURS;
    let mut copper = copper_initial * surface_area / k;
    let mut zinc = zinc_initial * surface_area / k;

    if duration <= z {
        let factor = 1.0 - (k * intensity * duration).exp();
        copper *= factor;
        zinc *= factor;
    } else {
        let factor = 1.0 - (k * intensity * z).exp();
        let bias = intensity * (duration - z);
        zinc = zinc * factor + zinc_established * surface_area * bias;
        copper *= copper * factor + copper_established * surface_area * bias;
    }

    Ok(MetalLoad { copper, zinc })
}

/// Total copper and zinc for a road or car park, from its TSS.
pub fn compute_road_carpark_metal_load(tss: f64) -> MetalLoad {
    MetalLoad {
        copper: tss * ROAD_COPPER_PER_TSS,
        zinc: tss * ROAD_ZINC_PER_TSS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CONCRETE_B: [f64; 8] = [2.0, -2.8, 0.5, 0.217, 3.57, -0.09, 7.0, -3.73];
    const CONCRETE_C: [f64; 8] = [50.0, 2600.0, 0.1, 0.01, 1.0, -3.1, -0.007, 0.056];

    fn concrete_initial(ph: f64, d: f64, i: f64) -> (f64, f64) {
        let (b, c) = (CONCRETE_B, CONCRETE_C);
        (
            b[0] * ph.powf(b[1]) * b[2] * d.powf(b[3]) * (b[4] * i.powf(b[5])),
            c[0] * ph + c[1] * c[2] * d.powf(c[3]) * (c[4] * i.powf(c[5])),
        )
    }

    #[test]
    fn first_flush_branch_matches_literal_formula() {
        let event = EventParameters::new(2.0, 5.0, 0.5, 7.0);
        let load = compute_roof_metal_load(100.0, &event, SurfaceVariant::ConcreteRoof).unwrap();

        let (cu0, zn0) = concrete_initial(7.0, 2.0, 5.0);
        let factor = 1.0 - (5.0f64 * 0.5).exp();
        assert_relative_eq!(load.copper, cu0 * 100.0 * factor, max_relative = 1e-12);
        assert_relative_eq!(load.zinc, zn0 * 100.0 * factor, max_relative = 1e-12);

        assert_relative_eq!(load.copper, -17.272_236_861_760_15, max_relative = 1e-9);
        assert_relative_eq!(load.zinc, -393_381.243_413_177_5, max_relative = 1e-9);
    }

    #[test]
    fn established_branch_keeps_copper_self_multiplication() {
        let event = EventParameters::new(2.0, 5.0, 1.0, 7.0);
        let load = compute_roof_metal_load(100.0, &event, SurfaceVariant::ConcreteRoof).unwrap();

        let (cu0, zn0) = concrete_initial(7.0, 2.0, 5.0);
        let (cu_base, zn_base) = (cu0 * 100.0, zn0 * 100.0);
        let factor = 1.0 - (5.0f64 * 0.75).exp();
        let bias = 5.0 * (1.0 - 0.75);
        let cu_est = 7.0 * 7f64.powf(-3.73);
        let zn_est = -0.007 * 7.0 + 0.056;

        assert_relative_eq!(
            load.copper,
            cu_base * (cu_base * factor + cu_est * 100.0 * bias),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            load.zinc,
            zn_base * factor + zn_est * 100.0 * bias,
            max_relative = 1e-12
        );
        assert_relative_eq!(load.copper, -98.105_832_520_710_48, max_relative = 1e-9);
    }

    #[test]
    fn regimes_are_not_continuous_at_threshold() {
        // Both sides are evaluated; the jump is a property of the formula.
        let eps = 1e-6;
        let below = EventParameters::new(2.0, 5.0, REGIME_THRESHOLD_HOURS - eps, 7.0);
        let above = EventParameters::new(2.0, 5.0, REGIME_THRESHOLD_HOURS + eps, 7.0);
        let lo = compute_roof_metal_load(100.0, &below, SurfaceVariant::ConcreteRoof).unwrap();
        let hi = compute_roof_metal_load(100.0, &above, SurfaceVariant::ConcreteRoof).unwrap();
        assert!(lo.copper.is_finite() && hi.copper.is_finite());
        assert!(lo.zinc.is_finite() && hi.zinc.is_finite());
    }

    #[test]
    fn road_variants_rejected_by_roof_formula() {
        let event = EventParameters::default();
        for v in [SurfaceVariant::AsphaltRoad, SurfaceVariant::CarPark] {
            let err = compute_roof_metal_load(10.0, &event, v).unwrap_err();
            assert!(err.is_invalid_surface(), "{v:?}: {err}");
        }
    }

    #[test]
    fn every_roof_variant_produces_finite_loads() {
        let event = EventParameters::new(3.0, 12.0, 2.0, 5.6);
        for v in SurfaceVariant::ALL.into_iter().filter(|v| v.is_roof()) {
            let load = compute_roof_metal_load(80.0, &event, v).unwrap();
            assert!(load.copper.is_finite() && load.zinc.is_finite(), "{v:?}: {load:?}");
        }
    }

    #[test]
    fn road_load_is_proportional_to_tss() {
        assert_eq!(compute_road_carpark_metal_load(0.0), MetalLoad { copper: 0.0, zinc: 0.0 });
        let load = compute_road_carpark_metal_load(10.0);
        assert_relative_eq!(load.copper, 4.41, max_relative = 1e-12);
        assert_relative_eq!(load.zinc, 19.6, max_relative = 1e-12);
    }
}
