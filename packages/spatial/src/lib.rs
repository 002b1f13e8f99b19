#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for administrative boundaries.
//!
//! Loads boundary polygons once at startup, indexes them by normalized
//! name and code, and answers point-in-polygon queries via ray casting
//! over outer rings. Boundary counts are small (tens) and rings moderate
//! (hundreds of vertices), so enclosing-boundary lookup is a linear scan
//! rather than a spatial tree.
//!
//! Containment deliberately ignores interior (hole) rings and treats
//! edge-exact points per the raw ray-casting convention; both are
//! documented approximations of the composer, not bugs to fix here.

pub mod centroid;

use std::collections::BTreeMap;

use grievance_map_models::{AdministrativeBoundary, Geometry, Position, Ring, keys};

/// Minimum positions for a usable ring: a closed triangle.
const MIN_RING_LEN: usize = 4;

/// Whether a ring can participate in containment tests: closed (first
/// position equals the last) and at least [`MIN_RING_LEN`] positions.
#[must_use]
pub fn ring_usable(ring: &Ring) -> bool {
    ring.len() >= MIN_RING_LEN && ring.first() == ring.last()
}

/// Ray-cast containment test against a single ring.
///
/// Casts a horizontal ray from the point and counts edge crossings.
/// Unusable rings (unclosed, too short) contain nothing.
#[must_use]
pub fn point_in_ring(point: Position, ring: &Ring) -> bool {
    if !ring_usable(ring) {
        return false;
    }

    let [x, y] = point;
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];

        if ((yi > y) != (yj > y)) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Containment test against a polygon or multi-polygon geometry.
///
/// True when any constituent polygon's outer ring contains the point.
/// Point geometry and malformed rings contain nothing.
#[must_use]
pub fn point_in_geometry(point: Position, geometry: &Geometry) -> bool {
    geometry
        .outer_rings()
        .into_iter()
        .any(|ring| point_in_ring(point, ring))
}

/// Pre-built index over administrative boundaries.
///
/// Constructed once from reference data and shared read-only by every
/// composition; nothing here is mutated after [`GeometryIndex::load`].
pub struct GeometryIndex {
    boundaries: Vec<AdministrativeBoundary>,
    by_name: BTreeMap<String, usize>,
    by_code: BTreeMap<String, usize>,
}

impl GeometryIndex {
    /// Builds the index. Boundaries with no usable outer ring are kept
    /// for name/code lookup but contain nothing spatially; each one is
    /// logged once here rather than on every query.
    #[must_use]
    pub fn load(boundaries: Vec<AdministrativeBoundary>) -> Self {
        let mut by_name = BTreeMap::new();
        let mut by_code = BTreeMap::new();

        for (idx, boundary) in boundaries.iter().enumerate() {
            if !boundary.geometry.outer_rings().into_iter().any(ring_usable) {
                log::warn!(
                    "Boundary '{}' has no usable outer ring; it will contain nothing",
                    boundary.name
                );
            }

            by_name.entry(keys::normalize_name(&boundary.name)).or_insert(idx);
            if let Some(code) = &boundary.code {
                let trimmed = code.trim();
                if !trimmed.is_empty() {
                    by_code.entry(trimmed.to_lowercase()).or_insert(idx);
                }
            }
        }

        log::info!("Loaded {} boundaries into geometry index", boundaries.len());

        Self {
            boundaries,
            by_name,
            by_code,
        }
    }

    /// Number of loaded boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether the index holds no boundaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Iterates all loaded boundaries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &AdministrativeBoundary> {
        self.boundaries.iter()
    }

    /// Looks up a boundary by name (case- and whitespace-insensitive).
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&AdministrativeBoundary> {
        self.by_name
            .get(&keys::normalize_name(name))
            .map(|&idx| &self.boundaries[idx])
    }

    /// Looks up a boundary by administrative code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&AdministrativeBoundary> {
        self.by_code
            .get(&code.trim().to_lowercase())
            .map(|&idx| &self.boundaries[idx])
    }

    /// Finds the first loaded boundary containing the point.
    ///
    /// Subdistricts tile the district without overlap, so first match
    /// wins.
    #[must_use]
    pub fn find_enclosing(&self, point: Position) -> Option<&AdministrativeBoundary> {
        self.boundaries
            .iter()
            .find(|boundary| point_in_geometry(point, &boundary.geometry))
    }
}

/// Extracts administrative boundaries from a `GeoJSON` feature
/// collection.
///
/// Features with a missing or blank `properties.name`, or with geometry
/// the composer cannot use, are skipped with a logged warning — one bad
/// record must never blank the whole map.
#[must_use]
pub fn boundaries_from_geojson(
    collection: &geojson::FeatureCollection,
) -> Vec<AdministrativeBoundary> {
    let mut boundaries = Vec::new();

    for feature in &collection.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let Some(name) = name else {
            log::warn!("Skipping boundary feature without a name");
            continue;
        };

        let geometry = feature
            .geometry
            .as_ref()
            .and_then(|geom| Geometry::from_geojson(&geom.value));

        let Some(geometry) = geometry else {
            log::warn!("Skipping boundary '{name}': missing or unsupported geometry");
            continue;
        };

        let code = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("code"))
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        boundaries.push(AdministrativeBoundary {
            name: name.to_string(),
            code,
            geometry,
        });
    }

    boundaries
}
