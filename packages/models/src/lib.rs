#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core domain types for the grievance map layer composer.
//!
//! These types describe the reference data (administrative boundaries,
//! settlement points), the per-request data (complaint records, filter
//! context), and the classification vocabulary (layer tags, heat tiers)
//! shared by every other crate in the workspace. They carry no behavior
//! beyond cheap accessors; the spatial, aggregation, and composition
//! logic lives in the crates that consume them.

pub mod keys;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A `[longitude, latitude]` coordinate pair (WGS84, degrees).
pub type Position = [f64; 2];

/// A linear ring of positions. A usable ring is closed (first position
/// equals the last) and has at least four positions.
pub type Ring = Vec<Position>;

/// Geometry of a map feature, mirroring the `GeoJSON` geometry kinds the
/// composer actually handles.
///
/// Polygon rings are stored outer-ring-first; interior (hole) rings are
/// carried through to the output but never consulted by containment tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single coordinate.
    Point(Position),
    /// One polygon: outer ring followed by any interior rings.
    Polygon(Vec<Ring>),
    /// Multiple polygon parts, each outer-ring-first.
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Converts a `GeoJSON` geometry value. Returns `None` for geometry
    /// kinds the composer does not handle (lines, collections) and for
    /// point geometries without both coordinates.
    #[must_use]
    pub fn from_geojson(value: &geojson::Value) -> Option<Self> {
        match value {
            geojson::Value::Point(coords) => {
                if coords.len() < 2 {
                    return None;
                }
                Some(Self::Point([coords[0], coords[1]]))
            }
            geojson::Value::Polygon(rings) => Some(Self::Polygon(convert_rings(rings))),
            geojson::Value::MultiPolygon(polygons) => Some(Self::MultiPolygon(
                polygons.iter().map(|rings| convert_rings(rings)).collect(),
            )),
            _ => None,
        }
    }

    /// Converts back to a `GeoJSON` geometry value for output.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Value {
        match self {
            Self::Point(p) => geojson::Value::Point(vec![p[0], p[1]]),
            Self::Polygon(rings) => geojson::Value::Polygon(unconvert_rings(rings)),
            Self::MultiPolygon(polygons) => {
                geojson::Value::MultiPolygon(polygons.iter().map(|r| unconvert_rings(r)).collect())
            }
        }
    }

    /// The outer ring of each polygon part. Empty for points.
    #[must_use]
    pub fn outer_rings(&self) -> Vec<&Ring> {
        match self {
            Self::Point(_) => Vec::new(),
            Self::Polygon(rings) => rings.first().into_iter().collect(),
            Self::MultiPolygon(polygons) => {
                polygons.iter().filter_map(|rings| rings.first()).collect()
            }
        }
    }

    /// `true` when the geometry has no polygon part with a non-empty
    /// outer ring (a point is never considered empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(_) => false,
            Self::Polygon(_) | Self::MultiPolygon(_) => {
                self.outer_rings().iter().all(|ring| ring.is_empty())
            }
        }
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| [pos[0], pos[1]])
                .collect()
        })
        .collect()
}

fn unconvert_rings(rings: &[Ring]) -> Vec<Vec<Vec<f64>>> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|pos| vec![pos[0], pos[1]]).collect())
        .collect()
}

/// Discriminates the layers a composed feature can belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LayerTag {
    /// Administrative boundary polygons and their labels.
    Subdistrict,
    /// Village settlement points and outlines.
    Village,
    /// Town settlement points and outlines.
    Town,
    /// Ward settlement points and outlines.
    Ward,
    /// Individual complaint markers.
    Complaint,
    /// Point-of-interest overlays (headquarters, assets).
    Poi,
}

/// The kind of a settlement entity. `Display` yields the capitalized
/// form (`Village`, `Town`, `Ward`) used as the output layer
/// discriminator for click dispatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
pub enum SettlementKind {
    /// A village.
    Village,
    /// A town.
    Town,
    /// An urban ward.
    Ward,
}

impl SettlementKind {
    /// The layer tag controlling visibility of this kind.
    #[must_use]
    pub const fn layer_tag(self) -> LayerTag {
        match self {
            Self::Village => LayerTag::Village,
            Self::Town => LayerTag::Town,
            Self::Ward => LayerTag::Ward,
        }
    }

    /// All settlement kinds, in composition order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Village, Self::Town, Self::Ward]
    }
}

/// Discrete complaint-density bucket for choropleth coloring.
///
/// Derived from a complaint count normalized against the maximum count in
/// the current result set; see the analytics crate for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum HeatTier {
    /// Zero complaints. Rendered as a neutral baseline, distinct from
    /// the density ramp.
    None,
    /// Up to 25% of the maximum count.
    Low,
    /// Up to 50% of the maximum count.
    Medium,
    /// Up to 75% of the maximum count.
    High,
    /// Above 75% of the maximum count.
    VeryHigh,
}

/// An administrative boundary polygon (subdistrict or finer outline).
///
/// Immutable reference data, loaded once at startup. `name` is the
/// primary join key; `code` is an optional administrative code used as a
/// secondary key when naming is inconsistent across sources.
#[derive(Debug, Clone, PartialEq)]
pub struct AdministrativeBoundary {
    /// Human-readable boundary name (primary join key).
    pub name: String,
    /// Administrative code, if the source provides one.
    pub code: Option<String>,
    /// Polygon or multi-polygon geometry.
    pub geometry: Geometry,
}

/// A village, town, or ward represented as a single geographic point.
///
/// Read-mostly reference data; only the batch geocode dispatcher mutates
/// it, by writing coordinates back once an entity is geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPoint {
    /// Stable identifier in the settlement store.
    pub id: u64,
    /// Settlement name (primary join key).
    pub name: String,
    /// Administrative code, if known.
    pub code: Option<String>,
    /// Name of the subdistrict this settlement claims to belong to.
    pub subdistrict_name: String,
    /// Latitude, present once geocoded.
    pub latitude: Option<f64>,
    /// Longitude, present once geocoded.
    pub longitude: Option<f64>,
    /// Population, if census data supplied one.
    pub population: Option<u32>,
    /// Whether coordinates have been resolved for this settlement.
    pub geocoded: bool,
}

impl SettlementPoint {
    /// Coordinates as `[lng, lat]`, if both are present.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some([lng, lat]),
            _ => None,
        }
    }
}

/// A single complaint record as exposed by the complaint store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    /// Complaint category (e.g. "roads", "water", "health").
    pub category: String,
    /// Workflow status (e.g. "open", "resolved").
    pub status: String,
    /// Priority label (e.g. "normal", "urgent").
    pub priority: String,
    /// Subdistrict the complaint was filed under.
    pub subdistrict_name: String,
    /// Village named on the complaint, if any.
    pub village_name: Option<String>,
    /// Village administrative code, if any.
    pub village_code: Option<String>,
    /// Town named on the complaint, if any.
    pub town_name: Option<String>,
    /// Town administrative code, if any.
    pub town_code: Option<String>,
    /// Ward named on the complaint, if any.
    pub ward_name: Option<String>,
    /// Ward administrative code, if any.
    pub ward_code: Option<String>,
    /// Geocoded latitude, if any.
    pub latitude: Option<f64>,
    /// Geocoded longitude, if any.
    pub longitude: Option<f64>,
    /// When the complaint was filed.
    pub reported_at: Option<DateTime<Utc>>,
}

impl ComplaintRecord {
    /// Coordinates as `[lng, lat]`, if both are present.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some([lng, lat]),
            _ => None,
        }
    }

    /// The settlement name this complaint carries for `kind`, if any.
    #[must_use]
    pub fn settlement_name(&self, kind: SettlementKind) -> Option<&str> {
        match kind {
            SettlementKind::Village => self.village_name.as_deref(),
            SettlementKind::Town => self.town_name.as_deref(),
            SettlementKind::Ward => self.ward_name.as_deref(),
        }
    }

    /// The settlement code this complaint carries for `kind`, if any.
    #[must_use]
    pub fn settlement_code(&self, kind: SettlementKind) -> Option<&str> {
        match kind {
            SettlementKind::Village => self.village_code.as_deref(),
            SettlementKind::Town => self.town_code.as_deref(),
            SettlementKind::Ward => self.ward_code.as_deref(),
        }
    }
}

/// A point-of-interest overlay marker (admin headquarters, assets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiPoint {
    /// Display name.
    pub name: String,
    /// Free-form POI type used as the layer discriminator.
    pub poi_type: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// Per-request composition filters.
///
/// A fresh context arrives with every composition request; nothing in it
/// is mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterContext {
    /// Restrict the composition to this subdistrict, spatially.
    pub selected_subdistrict: Option<String>,
    /// Keep only complaints in this category.
    pub category: Option<String>,
    /// Keep only complaints with this status.
    pub status: Option<String>,
    /// Keep only complaints with this priority.
    pub priority: Option<String>,
    /// Layers to include in the output.
    pub enabled_layers: BTreeSet<LayerTag>,
}

impl FilterContext {
    /// A context with every layer enabled and no filters applied.
    #[must_use]
    pub fn all_layers() -> Self {
        Self {
            enabled_layers: BTreeSet::from([
                LayerTag::Subdistrict,
                LayerTag::Village,
                LayerTag::Town,
                LayerTag::Ward,
                LayerTag::Complaint,
                LayerTag::Poi,
            ]),
            ..Self::default()
        }
    }

    /// Whether `tag` is enabled in this context.
    #[must_use]
    pub fn layer_enabled(&self, tag: LayerTag) -> bool {
        self.enabled_layers.contains(&tag)
    }
}
