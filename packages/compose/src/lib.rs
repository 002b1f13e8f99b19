#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The heat-map layer composer.
//!
//! [`compose`] merges administrative boundaries, settlement points,
//! fine-grained settlement outlines, point-of-interest overlays, and
//! complaint records into a single `GeoJSON` feature collection for an
//! external renderer. It is a pure function over immutable input
//! snapshots: identical inputs yield an identical feature set (up to
//! ordering — consumers key off `properties`, never array position),
//! and every toggle or filter change triggers a wholesale recomputation
//! rather than an incremental patch.
//!
//! Filtering rule: when a subdistrict is selected, the ray-cast
//! containment test decides visibility for settlement points, complaint
//! markers, and POIs alike. A record's text attributes (its claimed
//! `subdistrictName`) never override geometry; text is only used for
//! aggregation joins.

pub mod session;

use std::collections::{BTreeMap, BTreeSet};

use geojson::{Feature, FeatureCollection};
use grievance_map_analytics::{aggregate, heat};
use grievance_map_models::{
    AdministrativeBoundary, ComplaintRecord, FilterContext, Geometry, LayerTag, PoiPoint, Position,
    Ring, SettlementKind, SettlementPoint, keys,
};
use grievance_map_spatial::{GeometryIndex, centroid, point_in_geometry};

/// Property key: boundary fill color for the heat tier.
pub const PROP_COLOR: &str = "_color";
/// Property key: complaint count on boundary, label, and settlement
/// features.
pub const PROP_COMPLAINT_COUNT: &str = "complaintCount";
/// Property key: marks centroid label points.
pub const PROP_IS_SUBDISTRICT_LABEL: &str = "isSubDistrictLabel";
/// Property key: layer discriminator on point features (click dispatch).
pub const PROP_POI_TYPE: &str = "poiType";
/// Property key: layer discriminator on polygon features.
pub const PROP_TYPE: &str = "Type";

/// Radius of the synthesized highlight ring, in degrees.
const HIGHLIGHT_RADIUS_DEG: f64 = 0.005;
/// Number of segments in the highlight ring (33 positions once closed).
const HIGHLIGHT_SEGMENTS: usize = 32;

/// Everything a single composition reads. Borrowed snapshots; nothing
/// is mutated.
pub struct ComposeInputs<'a> {
    /// Subdistrict boundary index.
    pub index: &'a GeometryIndex,
    /// Settlement points per kind.
    pub settlements: &'a BTreeMap<SettlementKind, Vec<SettlementPoint>>,
    /// Fine-grained settlement outline polygons per kind.
    pub outlines: &'a BTreeMap<SettlementKind, Vec<AdministrativeBoundary>>,
    /// Point-of-interest overlays.
    pub pois: &'a [PoiPoint],
    /// The complaint snapshot for this request.
    pub complaints: &'a [ComplaintRecord],
    /// Per-request filters and layer toggles.
    pub filter: &'a FilterContext,
    /// Coordinate to draw a highlight ring around, if any.
    pub highlight: Option<Position>,
}

/// Composes the full renderable feature collection.
#[must_use]
pub fn compose(inputs: &ComposeInputs<'_>) -> FeatureCollection {
    let filter = inputs.filter;

    // Attribute filters apply once, up front; both the aggregates and
    // the markers see the same complaint subset so the shading always
    // matches the dots.
    let complaints: Vec<ComplaintRecord> = inputs
        .complaints
        .iter()
        .filter(|c| passes_attribute_filters(c, filter))
        .cloned()
        .collect();

    // The selected subdistrict, when one is active. An unknown name
    // resolves to no boundary and therefore an empty result set.
    let selected: Option<&AdministrativeBoundary> = filter
        .selected_subdistrict
        .as_deref()
        .map(|name| inputs.index.by_name(name))
        .map(|found| {
            if found.is_none() {
                log::warn!("Selected subdistrict matches no loaded boundary");
            }
            found
        })
        .unwrap_or_default();
    let filter_active = filter.selected_subdistrict.is_some();

    let mut features = Vec::new();

    if filter.layer_enabled(LayerTag::Subdistrict) {
        compose_boundaries(inputs, &complaints, selected, filter_active, &mut features);
    }

    for kind in SettlementKind::all() {
        if filter.layer_enabled(kind.layer_tag()) {
            compose_settlement_layer(
                inputs,
                &complaints,
                kind,
                selected,
                filter_active,
                &mut features,
            );
        }
    }

    if filter.layer_enabled(LayerTag::Complaint) {
        compose_complaint_markers(&complaints, selected, filter_active, &mut features);
    }

    if filter.layer_enabled(LayerTag::Poi) {
        compose_pois(inputs.pois, selected, filter_active, &mut features);
    }

    if let Some(center) = inputs.highlight {
        features.push(highlight_ring(center));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Whether a point is visible under the active spatial filter.
///
/// No filter → everything is in scope. A filter naming an unknown
/// boundary admits nothing.
fn passes_spatial_filter(
    position: Position,
    selected: Option<&AdministrativeBoundary>,
    filter_active: bool,
) -> bool {
    if !filter_active {
        return true;
    }
    selected.is_some_and(|boundary| point_in_geometry(position, &boundary.geometry))
}

fn passes_attribute_filters(complaint: &ComplaintRecord, filter: &FilterContext) -> bool {
    let matches = |wanted: &Option<String>, actual: &str| {
        wanted
            .as_deref()
            .is_none_or(|w| keys::normalize_name(w) == keys::normalize_name(actual))
    };

    matches(&filter.category, &complaint.category)
        && matches(&filter.status, &complaint.status)
        && matches(&filter.priority, &complaint.priority)
}

/// Step 2: choropleth polygons and centroid labels.
///
/// Every physical polygon part is emitted so multi-part subdistricts
/// shade completely, but each distinct name gets exactly one label,
/// placed at the first-seen part's centroid. Do not "simplify" this
/// into a dedup that also drops parts.
fn compose_boundaries(
    inputs: &ComposeInputs<'_>,
    complaints: &[ComplaintRecord],
    selected: Option<&AdministrativeBoundary>,
    filter_active: bool,
    features: &mut Vec<Feature>,
) {
    let counts = aggregate::count_by_subdistrict(complaints);

    let active: Vec<&AdministrativeBoundary> = if filter_active {
        selected.into_iter().collect()
    } else {
        inputs.index.iter().collect()
    };

    let max_count = active
        .iter()
        .filter_map(|b| counts.get(&keys::normalize_name(&b.name)))
        .copied()
        .max()
        .unwrap_or(0);

    let mut labeled: BTreeSet<String> = BTreeSet::new();

    for boundary in active {
        let name_key = keys::normalize_name(&boundary.name);
        let count = counts.get(&name_key).copied().unwrap_or(0);
        let color = heat::tier_color(heat::classify(count, max_count));

        for part in polygon_parts(&boundary.geometry) {
            let mut props = serde_json::Map::new();
            props.insert(PROP_TYPE.into(), boundary.name.clone().into());
            props.insert(PROP_COLOR.into(), color.into());
            props.insert(PROP_COMPLAINT_COUNT.into(), count.into());
            features.push(feature(geojson::Value::Polygon(rings_to_geojson(part)), props));
        }

        if labeled.insert(name_key) {
            if let Some(centroid) = centroid::centroid_of_geometry(&boundary.geometry) {
                let mut props = serde_json::Map::new();
                props.insert(PROP_TYPE.into(), boundary.name.clone().into());
                props.insert(PROP_COMPLAINT_COUNT.into(), count.into());
                props.insert(PROP_IS_SUBDISTRICT_LABEL.into(), true.into());
                features.push(feature(
                    geojson::Value::Point(vec![centroid[0], centroid[1]]),
                    props,
                ));
            }
        }
    }
}

/// Steps 3 and 4: settlement points and their fine-grained outlines.
fn compose_settlement_layer(
    inputs: &ComposeInputs<'_>,
    complaints: &[ComplaintRecord],
    kind: SettlementKind,
    selected: Option<&AdministrativeBoundary>,
    filter_active: bool,
    features: &mut Vec<Feature>,
) {
    let counts = aggregate::count_by_settlement(complaints, kind);
    let empty = Vec::new();
    let points = inputs.settlements.get(&kind).unwrap_or(&empty);

    // Join keys of every point that survived the spatial filter; the
    // outline pass below matches against these.
    let mut visible_keys: BTreeSet<String> = BTreeSet::new();

    for point in points {
        let Some(position) = point.position() else {
            log::debug!(
                "Skipping ungeocoded {kind} '{name}': no coordinates yet",
                name = point.name
            );
            continue;
        };

        if !passes_spatial_filter(position, selected, filter_active) {
            continue;
        }

        let point_keys = keys::join_keys(Some(&point.name), point.code.as_deref());
        visible_keys.extend(point_keys.iter().cloned());

        let mut props = serde_json::Map::new();
        props.insert("name".into(), point.name.clone().into());
        props.insert(PROP_POI_TYPE.into(), kind.to_string().into());
        if let Some(population) = point.population {
            props.insert("population".into(), population.into());
        }

        // An unkeyed point is still rendered, just without a count:
        // it cannot join the aggregation but can be seen on the map.
        if let Some(count) = lookup_count(&counts, &point_keys) {
            props.insert(PROP_COMPLAINT_COUNT.into(), count.into());
        }

        features.push(feature(
            geojson::Value::Point(vec![position[0], position[1]]),
            props,
        ));
    }

    let no_outlines = Vec::new();
    let outlines = inputs.outlines.get(&kind).unwrap_or(&no_outlines);

    for outline in outlines {
        let outline_keys = keys::join_keys(Some(&outline.name), outline.code.as_deref());
        let matches_visible_point = !outline_keys.is_disjoint(&visible_keys);

        // Fall back to the outline's own centroid when no visible point
        // claims it by name or code.
        let keep = matches_visible_point
            || centroid::centroid_of_geometry(&outline.geometry)
                .is_some_and(|c| passes_spatial_filter(c, selected, filter_active));

        if !keep {
            continue;
        }

        for part in polygon_parts(&outline.geometry) {
            let mut props = serde_json::Map::new();
            props.insert("name".into(), outline.name.clone().into());
            props.insert(PROP_TYPE.into(), kind.to_string().into());
            features.push(feature(geojson::Value::Polygon(rings_to_geojson(part)), props));
        }
    }
}

/// Step 5: complaint markers, after attribute and spatial filtering.
fn compose_complaint_markers(
    complaints: &[ComplaintRecord],
    selected: Option<&AdministrativeBoundary>,
    filter_active: bool,
    features: &mut Vec<Feature>,
) {
    for complaint in complaints {
        let Some(position) = complaint.position() else {
            log::debug!("Skipping complaint marker without coordinates");
            continue;
        };

        if !passes_spatial_filter(position, selected, filter_active) {
            continue;
        }

        let mut props = serde_json::Map::new();
        props.insert(PROP_POI_TYPE.into(), "Complaint".into());
        props.insert("category".into(), complaint.category.clone().into());
        props.insert("status".into(), complaint.status.clone().into());
        props.insert("priority".into(), complaint.priority.clone().into());

        features.push(feature(
            geojson::Value::Point(vec![position[0], position[1]]),
            props,
        ));
    }
}

/// Step 6: POI overlays with identical spatial filtering.
fn compose_pois(
    pois: &[PoiPoint],
    selected: Option<&AdministrativeBoundary>,
    filter_active: bool,
    features: &mut Vec<Feature>,
) {
    for poi in pois {
        let position = [poi.longitude, poi.latitude];
        if !passes_spatial_filter(position, selected, filter_active) {
            continue;
        }

        let mut props = serde_json::Map::new();
        props.insert("name".into(), poi.name.clone().into());
        props.insert(PROP_POI_TYPE.into(), poi.poi_type.clone().into());

        features.push(feature(
            geojson::Value::Point(vec![position[0], position[1]]),
            props,
        ));
    }
}

/// Step 7: a fixed-radius, fixed-vertex-count circular highlight ring.
fn highlight_ring(center: Position) -> Feature {
    let mut ring: Ring = Vec::with_capacity(HIGHLIGHT_SEGMENTS + 1);

    for i in 0..HIGHLIGHT_SEGMENTS {
        #[allow(clippy::cast_precision_loss)]
        let angle = std::f64::consts::TAU * i as f64 / HIGHLIGHT_SEGMENTS as f64;
        ring.push([
            center[0] + HIGHLIGHT_RADIUS_DEG * angle.cos(),
            center[1] + HIGHLIGHT_RADIUS_DEG * angle.sin(),
        ]);
    }
    ring.push(ring[0]);

    let mut props = serde_json::Map::new();
    props.insert(PROP_TYPE.into(), "Highlight".into());

    feature(geojson::Value::Polygon(rings_to_geojson(&[ring])), props)
}

/// A settlement finds its count under its name key or, failing that,
/// its code key. Never summed across both: the same complaints
/// incremented each key.
fn lookup_count(counts: &BTreeMap<String, u64>, point_keys: &BTreeSet<String>) -> Option<u64> {
    if point_keys.is_empty() {
        return None;
    }
    Some(
        point_keys
            .iter()
            .find_map(|key| counts.get(key).copied())
            .unwrap_or(0),
    )
}

/// The physical polygon parts of a geometry, each outer-ring-first.
fn polygon_parts(geometry: &Geometry) -> Vec<&Vec<Ring>> {
    match geometry {
        Geometry::Point(_) => Vec::new(),
        Geometry::Polygon(rings) => vec![rings],
        Geometry::MultiPolygon(polygons) => polygons.iter().collect(),
    }
}

fn rings_to_geojson(rings: &[Ring]) -> Vec<Vec<Vec<f64>>> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|pos| vec![pos[0], pos[1]]).collect())
        .collect()
}

fn feature(geometry: geojson::Value, properties: serde_json::Map<String, serde_json::Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        vec![
            [x0, y0],
            [x0, y0 + size],
            [x0 + size, y0 + size],
            [x0 + size, y0],
            [x0, y0],
        ]
    }

    fn boundary(name: &str, geometry: Geometry) -> AdministrativeBoundary {
        AdministrativeBoundary {
            name: name.to_string(),
            code: None,
            geometry,
        }
    }

    fn complaint(subdistrict: &str, category: &str, position: Option<Position>) -> ComplaintRecord {
        ComplaintRecord {
            category: category.to_string(),
            status: "open".to_string(),
            priority: "normal".to_string(),
            subdistrict_name: subdistrict.to_string(),
            village_name: None,
            village_code: None,
            town_name: None,
            town_code: None,
            ward_name: None,
            ward_code: None,
            latitude: position.map(|p| p[1]),
            longitude: position.map(|p| p[0]),
            reported_at: None,
        }
    }

    fn village(id: u64, name: &str, subdistrict: &str, position: Position) -> SettlementPoint {
        SettlementPoint {
            id,
            name: name.to_string(),
            code: None,
            subdistrict_name: subdistrict.to_string(),
            latitude: Some(position[1]),
            longitude: Some(position[0]),
            population: None,
            geocoded: true,
        }
    }

    /// Budaun square spans (0,0)..(10,10); Bilsi spans (20,0)..(30,10).
    fn district_index() -> GeometryIndex {
        GeometryIndex::load(vec![
            boundary("Budaun", Geometry::Polygon(vec![square(0.0, 0.0, 10.0)])),
            boundary("Bilsi", Geometry::Polygon(vec![square(20.0, 0.0, 10.0)])),
        ])
    }

    struct Fixture {
        index: GeometryIndex,
        settlements: BTreeMap<SettlementKind, Vec<SettlementPoint>>,
        outlines: BTreeMap<SettlementKind, Vec<AdministrativeBoundary>>,
        pois: Vec<PoiPoint>,
        complaints: Vec<ComplaintRecord>,
        filter: FilterContext,
        highlight: Option<Position>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                index: district_index(),
                settlements: BTreeMap::new(),
                outlines: BTreeMap::new(),
                pois: Vec::new(),
                complaints: Vec::new(),
                filter: FilterContext::all_layers(),
                highlight: None,
            }
        }

        fn compose(&self) -> FeatureCollection {
            compose(&ComposeInputs {
                index: &self.index,
                settlements: &self.settlements,
                outlines: &self.outlines,
                pois: &self.pois,
                complaints: &self.complaints,
                filter: &self.filter,
                highlight: self.highlight,
            })
        }
    }

    fn labels(collection: &FeatureCollection) -> Vec<&Feature> {
        collection
            .features
            .iter()
            .filter(|f| {
                f.properties
                    .as_ref()
                    .and_then(|p| p.get(PROP_IS_SUBDISTRICT_LABEL))
                    .and_then(serde_json::Value::as_bool)
                    == Some(true)
            })
            .collect()
    }

    fn prop_str<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
        feature
            .properties
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(serde_json::Value::as_str)
    }

    fn prop_u64(feature: &Feature, key: &str) -> Option<u64> {
        feature
            .properties
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(serde_json::Value::as_u64)
    }

    #[test]
    fn budaun_bilsi_scenario_labels_and_colors() {
        let mut fx = Fixture::new();
        fx.complaints = vec![
            complaint("Budaun", "roads", Some([5.0, 5.0])),
            complaint("Budaun", "water", Some([6.0, 5.0])),
            complaint("Budaun", "health", Some([4.0, 4.0])),
        ];

        let out = fx.compose();

        let labels = labels(&out);
        assert_eq!(labels.len(), 2);

        let budaun = labels
            .iter()
            .find(|f| prop_str(f, PROP_TYPE) == Some("Budaun"))
            .unwrap();
        let bilsi = labels
            .iter()
            .find(|f| prop_str(f, PROP_TYPE) == Some("Bilsi"))
            .unwrap();
        assert_eq!(prop_u64(budaun, PROP_COMPLAINT_COUNT), Some(3));
        assert_eq!(prop_u64(bilsi, PROP_COMPLAINT_COUNT), Some(0));

        // classify(3, 3) = VeryHigh, classify(0, 3) = None.
        let budaun_polygon = out
            .features
            .iter()
            .find(|f| prop_str(f, PROP_TYPE) == Some("Budaun") && prop_str(f, PROP_COLOR).is_some())
            .unwrap();
        let bilsi_polygon = out
            .features
            .iter()
            .find(|f| prop_str(f, PROP_TYPE) == Some("Bilsi") && prop_str(f, PROP_COLOR).is_some())
            .unwrap();
        assert_eq!(
            prop_str(budaun_polygon, PROP_COLOR),
            Some(heat::tier_color(grievance_map_models::HeatTier::VeryHigh))
        );
        assert_eq!(
            prop_str(bilsi_polygon, PROP_COLOR),
            Some(heat::tier_color(grievance_map_models::HeatTier::None))
        );
    }

    #[test]
    fn multipart_boundary_shades_every_part_with_one_label() {
        let mut fx = Fixture::new();
        fx.index = GeometryIndex::load(vec![boundary(
            "Salarpur",
            Geometry::MultiPolygon(vec![
                vec![square(0.0, 0.0, 10.0)],
                vec![square(40.0, 0.0, 10.0)],
            ]),
        )]);

        let out = fx.compose();

        let polygons: Vec<&Feature> = out
            .features
            .iter()
            .filter(|f| prop_str(f, PROP_COLOR).is_some())
            .collect();
        assert_eq!(polygons.len(), 2);
        assert_eq!(labels(&out).len(), 1);

        // The label sits at the first part's vertex-average centroid.
        let label = labels(&out)[0];
        let Some(geojson::Geometry {
            value: geojson::Value::Point(coords),
            ..
        }) = &label.geometry
        else {
            panic!("label must be a point");
        };
        assert!((coords[0] - 4.0).abs() < 1e-9);
        assert!((coords[1] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn geometry_beats_text_for_settlement_points() {
        let mut fx = Fixture::new();
        // The point claims Budaun in text but sits inside Bilsi's square.
        fx.settlements.insert(
            SettlementKind::Village,
            vec![
                village(1, "Stray", "Budaun", [25.0, 5.0]),
                village(2, "Kakrala", "Budaun", [5.0, 5.0]),
            ],
        );
        fx.filter.selected_subdistrict = Some("Budaun".to_string());

        let out = fx.compose();

        let villages: Vec<&Feature> = out
            .features
            .iter()
            .filter(|f| prop_str(f, PROP_POI_TYPE) == Some("Village"))
            .collect();
        assert_eq!(villages.len(), 1);
        assert_eq!(prop_str(villages[0], "name"), Some("Kakrala"));
    }

    #[test]
    fn geometry_beats_text_for_complaint_markers() {
        let mut fx = Fixture::new();
        fx.complaints = vec![
            complaint("Budaun", "roads", Some([25.0, 5.0])), // inside Bilsi
            complaint("Budaun", "roads", Some([5.0, 5.0])),  // inside Budaun
        ];
        fx.filter.selected_subdistrict = Some("Budaun".to_string());

        let out = fx.compose();

        let markers: Vec<&Feature> = out
            .features
            .iter()
            .filter(|f| prop_str(f, PROP_POI_TYPE) == Some("Complaint"))
            .collect();
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn settlement_points_carry_their_own_counts() {
        let mut fx = Fixture::new();
        fx.settlements.insert(
            SettlementKind::Village,
            vec![village(1, "Kakrala", "Budaun", [5.0, 5.0])],
        );
        fx.complaints = vec![{
            let mut c = complaint("Budaun", "roads", None);
            c.village_name = Some("kakrala".to_string());
            c
        }];

        let out = fx.compose();

        let point = out
            .features
            .iter()
            .find(|f| prop_str(f, PROP_POI_TYPE) == Some("Village"))
            .unwrap();
        assert_eq!(prop_u64(point, PROP_COMPLAINT_COUNT), Some(1));
    }

    #[test]
    fn unkeyed_settlement_is_rendered_without_count() {
        let mut fx = Fixture::new();
        fx.settlements.insert(
            SettlementKind::Village,
            vec![village(1, "  ", "Budaun", [5.0, 5.0])],
        );

        let out = fx.compose();

        let point = out
            .features
            .iter()
            .find(|f| prop_str(f, PROP_POI_TYPE) == Some("Village"))
            .unwrap();
        assert!(
            point
                .properties
                .as_ref()
                .unwrap()
                .get(PROP_COMPLAINT_COUNT)
                .is_none()
        );
    }

    #[test]
    fn ungeocoded_settlements_are_skipped() {
        let mut fx = Fixture::new();
        let mut point = village(1, "Pending", "Budaun", [5.0, 5.0]);
        point.latitude = None;
        point.longitude = None;
        point.geocoded = false;
        fx.settlements.insert(SettlementKind::Village, vec![point]);

        let out = fx.compose();
        assert!(
            !out.features
                .iter()
                .any(|f| prop_str(f, PROP_POI_TYPE) == Some("Village"))
        );
    }

    #[test]
    fn outlines_follow_visible_points_with_centroid_fallback() {
        let mut fx = Fixture::new();
        fx.settlements.insert(
            SettlementKind::Village,
            vec![village(1, "Kakrala", "Budaun", [5.0, 5.0])],
        );
        fx.outlines.insert(
            SettlementKind::Village,
            vec![
                // Matches the visible point by name.
                boundary("Kakrala", Geometry::Polygon(vec![square(4.0, 4.0, 2.0)])),
                // No matching point, centroid inside Budaun: kept.
                boundary("Orphan In", Geometry::Polygon(vec![square(1.0, 1.0, 2.0)])),
                // No matching point, centroid inside Bilsi: dropped.
                boundary("Orphan Out", Geometry::Polygon(vec![square(24.0, 4.0, 2.0)])),
            ],
        );
        fx.filter.selected_subdistrict = Some("Budaun".to_string());

        let out = fx.compose();

        let outline_names: Vec<&str> = out
            .features
            .iter()
            .filter(|f| prop_str(f, PROP_TYPE) == Some("Village"))
            .filter_map(|f| prop_str(f, "name"))
            .collect();
        assert_eq!(outline_names, vec!["Kakrala", "Orphan In"]);
    }

    #[test]
    fn attribute_filters_shape_counts_and_markers() {
        let mut fx = Fixture::new();
        fx.complaints = vec![
            complaint("Budaun", "roads", Some([5.0, 5.0])),
            complaint("Budaun", "water", Some([6.0, 5.0])),
        ];
        fx.filter.category = Some("roads".to_string());

        let out = fx.compose();

        let budaun_label = labels(&out)
            .into_iter()
            .find(|f| prop_str(f, PROP_TYPE) == Some("Budaun"))
            .unwrap();
        assert_eq!(prop_u64(budaun_label, PROP_COMPLAINT_COUNT), Some(1));

        let markers = out
            .features
            .iter()
            .filter(|f| prop_str(f, PROP_POI_TYPE) == Some("Complaint"))
            .count();
        assert_eq!(markers, 1);
    }

    #[test]
    fn unknown_subdistrict_yields_empty_output() {
        let mut fx = Fixture::new();
        fx.complaints = vec![complaint("Budaun", "roads", Some([5.0, 5.0]))];
        fx.settlements.insert(
            SettlementKind::Village,
            vec![village(1, "Kakrala", "Budaun", [5.0, 5.0])],
        );
        fx.filter.selected_subdistrict = Some("Atlantis".to_string());

        let out = fx.compose();
        assert!(out.features.is_empty());
    }

    #[test]
    fn pois_share_the_spatial_filter() {
        let mut fx = Fixture::new();
        fx.pois = vec![
            PoiPoint {
                name: "Tehsil HQ".to_string(),
                poi_type: "Headquarters".to_string(),
                latitude: 5.0,
                longitude: 5.0,
            },
            PoiPoint {
                name: "Water Tower".to_string(),
                poi_type: "Asset".to_string(),
                latitude: 5.0,
                longitude: 25.0,
            },
        ];
        fx.filter.selected_subdistrict = Some("Budaun".to_string());

        let out = fx.compose();

        let pois: Vec<&str> = out
            .features
            .iter()
            .filter_map(|f| prop_str(f, PROP_POI_TYPE))
            .filter(|t| *t == "Headquarters" || *t == "Asset")
            .collect();
        assert_eq!(pois, vec!["Headquarters"]);
    }

    #[test]
    fn highlight_ring_is_closed_with_fixed_vertex_count() {
        let mut fx = Fixture::new();
        fx.highlight = Some([5.0, 5.0]);

        let out = fx.compose();

        let ring_feature = out
            .features
            .iter()
            .find(|f| prop_str(f, PROP_TYPE) == Some("Highlight"))
            .unwrap();
        let Some(geojson::Geometry {
            value: geojson::Value::Polygon(rings),
            ..
        }) = &ring_feature.geometry
        else {
            panic!("highlight must be a polygon");
        };
        assert_eq!(rings[0].len(), HIGHLIGHT_SEGMENTS + 1);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn compose_is_referentially_transparent() {
        let mut fx = Fixture::new();
        fx.complaints = vec![
            complaint("Budaun", "roads", Some([5.0, 5.0])),
            complaint("Bilsi", "water", Some([25.0, 5.0])),
        ];
        fx.settlements.insert(
            SettlementKind::Village,
            vec![village(1, "Kakrala", "Budaun", [5.0, 5.0])],
        );

        let mut first: Vec<String> = fx
            .compose()
            .features
            .iter()
            .map(|f| serde_json::to_string(f).unwrap())
            .collect();
        let mut second: Vec<String> = fx
            .compose()
            .features
            .iter()
            .map(|f| serde_json::to_string(f).unwrap())
            .collect();
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }
}
