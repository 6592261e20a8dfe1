use crate::metals::MetalLoad;
use crate::surface::SurfaceVariant;

/// Dissolved share of a total metal load: pure linear scaling by the
/// variant's copper and zinc fractions. Zero and negative totals scale too.
pub fn compute_dissolved_load(total: MetalLoad, variant: SurfaceVariant) -> MetalLoad {
    let f = variant.dissolved_fractions();
    MetalLoad {
        copper: f.copper * total.copper,
        zinc: f.zinc * total.zinc,
    }
}
