//! Feature file schema: buildings and roads with either raw planar
//! coordinates or a pre-computed area/length.

use anyhow::{Context, Result};
use medusa_core::geometry::{line_length, polygon_area_with_holes};
use medusa_core::{PollutionError, SurfaceFeature, SurfaceVariant};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
pub struct FeatureFile {
    #[serde(default)]
    buildings: Vec<BuildingInput>,
    #[serde(default)]
    roads: Vec<RoadInput>,
}

#[derive(Deserialize)]
struct BuildingInput {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    surface_type: String,
    #[serde(flatten)]
    shape: BuildingShape,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BuildingShape {
    Footprint {
        footprint: Vec<[f64; 2]>,
        #[serde(default)]
        holes: Vec<Vec<[f64; 2]>>,
    },
    Area {
        area: f64,
    },
}

#[derive(Deserialize)]
struct RoadInput {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    /// Roads arrive unlabelled from the road network; car parks say so.
    #[serde(default)]
    surface_type: Option<String>,
    #[serde(flatten)]
    shape: RoadShape,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoadShape {
    Path { path: Vec<[f64; 2]> },
    Length { length: f64 },
}

/// Accept identifiers written as JSON strings or integers.
fn id_as_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }
    Ok(match RawId::deserialize(d)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

impl FeatureFile {
    pub fn read(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
    }

    /// Split into model inputs. A feature whose surface code does not parse
    /// is set aside in `rejected` so the caller's partial-run policy decides.
    pub fn into_features(self) -> ParsedFeatures {
        let mut rejected = Vec::new();

        let mut buildings = Vec::with_capacity(self.buildings.len());
        for b in self.buildings {
            let variant = match b.surface_type.parse::<SurfaceVariant>() {
                Ok(v) => v,
                Err(e) => {
                    rejected.push(feature_error(b.id, e));
                    continue;
                }
            };
            let area = match b.shape {
                BuildingShape::Footprint { footprint, holes } => {
                    polygon_area_with_holes(&footprint, &holes)
                }
                BuildingShape::Area { area } => area,
            };
            buildings.push(SurfaceFeature::building(b.id, variant, area));
        }

        let mut roads = Vec::with_capacity(self.roads.len());
        for r in self.roads {
            let variant = match r.surface_type.as_deref().map(str::parse::<SurfaceVariant>) {
                Some(Ok(v)) => v,
                Some(Err(e)) => {
                    rejected.push(feature_error(r.id, e));
                    continue;
                }
                None => SurfaceVariant::AsphaltRoad,
            };
            let length = match r.shape {
                RoadShape::Path { path } => line_length(&path),
                RoadShape::Length { length } => length,
            };
            roads.push(SurfaceFeature::road(r.id, variant, length));
        }

        ParsedFeatures { buildings, roads, rejected }
    }
}

/// Model inputs plus the features that never reached the model.
pub struct ParsedFeatures {
    pub buildings: Vec<SurfaceFeature>,
    pub roads: Vec<SurfaceFeature>,
    /// `PollutionError::Feature`, one per rejected feature, in file order.
    pub rejected: Vec<PollutionError>,
}

fn feature_error(feature_id: String, source: PollutionError) -> PollutionError {
    PollutionError::Feature { feature_id, source: Box::new(source) }
}
