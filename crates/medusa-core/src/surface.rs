//! Impervious surface variants and their empirical coefficient tables.
//!
//! Every coefficient lives here, keyed by variant, so the model modules
//! never repeat a roof-or-road membership test of their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PollutionError;

/// Recognised impervious surface, serialised by its short storage code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceVariant {
    #[serde(rename = "Cr")]
    ConcreteRoof,
    #[serde(rename = "Cu")]
    CopperRoof,
    #[serde(rename = "Gv")]
    GalvanisedRoof,
    #[serde(rename = "Rd")]
    AsphaltRoad,
    /// Loads are computed exactly as for `AsphaltRoad`; only the label differs.
    #[serde(rename = "CrP")]
    CarPark,
}

/// Which family of formulas a variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceCategory {
    Roof,
    RoadCarPark,
}

impl SurfaceVariant {
    pub const ALL: [SurfaceVariant; 5] = [
        Self::ConcreteRoof,
        Self::CopperRoof,
        Self::GalvanisedRoof,
        Self::AsphaltRoad,
        Self::CarPark,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::ConcreteRoof => "Cr",
            Self::CopperRoof => "Cu",
            Self::GalvanisedRoof => "Gv",
            Self::AsphaltRoad => "Rd",
            Self::CarPark => "CrP",
        }
    }

    pub fn category(self) -> SurfaceCategory {
        match self {
            Self::ConcreteRoof | Self::CopperRoof | Self::GalvanisedRoof => SurfaceCategory::Roof,
            Self::AsphaltRoad | Self::CarPark => SurfaceCategory::RoadCarPark,
        }
    }

    pub fn is_roof(self) -> bool {
        self.category() == SurfaceCategory::Roof
    }

    /// Build-up capacity factor: 0.75 for roofs, 0.25 for roads and car parks.
    pub fn capacity_factor(self) -> f64 {
        match self.category() {
            SurfaceCategory::Roof => 0.75,
            SurfaceCategory::RoadCarPark => 0.25,
        }
    }

    pub fn tss_coefficients(self) -> TssCoefficients {
        match self {
            Self::ConcreteRoof => TssCoefficients { a1: 0.6, a2: 0.25, a3: 0.00933 },
            Self::CopperRoof => TssCoefficients { a1: 2.5, a2: 0.95, a3: 0.00933 },
            Self::GalvanisedRoof => TssCoefficients { a1: 0.6, a2: 0.5, a3: 0.00933 },
            Self::AsphaltRoad | Self::CarPark => TssCoefficients { a1: 2.9, a2: 0.16, a3: 0.0008 },
        }
    }

    /// Copper (`b`) and zinc (`c`) vectors; `None` for non-roof variants.
    pub fn roof_metal_coefficients(self) -> Option<RoofMetalCoefficients> {
        match self {
            Self::ConcreteRoof => Some(RoofMetalCoefficients {
                copper: [2.0, -2.8, 0.5, 0.217, 3.57, -0.09, 7.0, -3.73],
                zinc: [50.0, 2600.0, 0.1, 0.01, 1.0, -3.1, -0.007, 0.056],
            }),
            Self::CopperRoof => Some(RoofMetalCoefficients {
                copper: [100.0, -2.8, 1.372, 0.217, 3.57, -1.0, 275.0, -3.3],
                zinc: [-0.1, 2.0, 0.1, 0.01, 0.8, -1.3, -0.007, 0.056],
            }),
            Self::GalvanisedRoof => Some(RoofMetalCoefficients {
                copper: [2.0, -2.8, 0.5, 0.217, 3.57, -0.09, 7.0, -3.73],
                zinc: [910.0, 4.0, 0.2, 0.09, 1.5, -2.0, -0.23, 1.990],
            }),
            Self::AsphaltRoad | Self::CarPark => None,
        }
    }

    pub fn dissolved_fractions(self) -> DissolvedFractions {
        match self {
            Self::ConcreteRoof => DissolvedFractions { copper: 0.46, zinc: 0.67 },
            Self::CopperRoof => DissolvedFractions { copper: 0.77, zinc: 0.72 },
            Self::GalvanisedRoof | Self::AsphaltRoad | Self::CarPark => {
                DissolvedFractions { copper: 0.28, zinc: 0.43 }
            }
        }
    }
}

impl fmt::Display for SurfaceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SurfaceVariant {
    type Err = PollutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.code() == s)
            .ok_or_else(|| PollutionError::UnknownSurface { code: s.to_string() })
    }
}

/// Empirical TSS build-up/wash-off coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TssCoefficients {
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
}

/// Eight-term copper and zinc coefficient vectors for a roof material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofMetalCoefficients {
    pub copper: [f64; 8],
    pub zinc: [f64; 8],
}

/// Dissolved share of total copper and zinc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DissolvedFractions {
    pub copper: f64,
    pub zinc: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_back_to_their_variant() {
        for v in SurfaceVariant::ALL {
            assert_eq!(v.code().parse::<SurfaceVariant>().unwrap(), v);
        }
    }

    #[test]
    fn unknown_code_is_an_invalid_surface() {
        let err = "Gravel".parse::<SurfaceVariant>().unwrap_err();
        assert!(err.is_invalid_surface(), "got {err}");
    }

    #[test]
    fn roof_and_road_subsets_are_disjoint() {
        let roofs: Vec<_> = SurfaceVariant::ALL.into_iter().filter(|v| v.is_roof()).collect();
        let expected = [
            SurfaceVariant::ConcreteRoof,
            SurfaceVariant::CopperRoof,
            SurfaceVariant::GalvanisedRoof,
        ];
        assert_eq!(roofs, expected);
        for v in SurfaceVariant::ALL {
            assert_eq!(v.roof_metal_coefficients().is_some(), v.is_roof(), "{v:?}");
        }
    }

    #[test]
    fn car_park_shares_road_tables() {
        let road = SurfaceVariant::AsphaltRoad;
        let car_park = SurfaceVariant::CarPark;
        assert_eq!(road.tss_coefficients(), car_park.tss_coefficients());
        assert_eq!(road.dissolved_fractions(), car_park.dissolved_fractions());
        assert_eq!(road.capacity_factor(), car_park.capacity_factor());
        assert_ne!(road.code(), car_park.code());
    }

    #[test]
    fn serde_uses_storage_codes() {
        let json = serde_json::to_string(&SurfaceVariant::CarPark).unwrap();
        assert_eq!(json, "\"CrP\"");
        let back: SurfaceVariant = serde_json::from_str("\"Gv\"").unwrap();
        assert_eq!(back, SurfaceVariant::GalvanisedRoof);
    }
}
