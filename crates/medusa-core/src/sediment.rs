//! Total suspended solids (TSS) wash-off for one surface.

use crate::event::EventParameters;
use crate::surface::SurfaceVariant;

/// TSS mobilised from one surface by one event.
///
/// `area · a1 · dry_days^a2 · Cf · (1 − exp(a3 · intensity · duration))`
///
/// No clamping: `antecedent_dry_days <= 0` with a fractional `a2` yields NaN,
/// which is returned as-is.
pub fn compute_tss(surface_area: f64, event: &EventParameters, variant: SurfaceVariant) -> f64 {
    let a = variant.tss_coefficients();
    let build_up =
        surface_area * a.a1 * event.antecedent_dry_days.powf(a.a2) * variant.capacity_factor();
    let wash_off = 1.0 - (a.a3 * event.avg_rain_intensity * event.event_duration).exp();
    build_up * wash_off
}
