//! Label-point placement for boundary polygons.
//!
//! The "centroid" here is the arithmetic mean of every listed ring
//! vertex, including the duplicated closing vertex. That is not the
//! geometric (area-weighted) centroid: the duplicate vertex biases the
//! mean slightly toward the ring's start point. Label placement only
//! needs a point near the middle of the shape, and the portal's map has
//! always used this mean, so renderers and stored label anchors expect
//! it. Keep the approximation; do not "fix" it to a true centroid.

use grievance_map_models::{Geometry, Position, Ring};

/// Arithmetic mean of all listed ring vertices (closing duplicate
/// included). `None` for an empty ring.
#[must_use]
pub fn centroid_of_ring(ring: &Ring) -> Option<Position> {
    if ring.is_empty() {
        return None;
    }

    let (sum_lng, sum_lat) = ring
        .iter()
        .fold((0.0, 0.0), |(lng, lat), pos| (lng + pos[0], lat + pos[1]));

    #[allow(clippy::cast_precision_loss)]
    let count = ring.len() as f64;

    Some([sum_lng / count, sum_lat / count])
}

/// Label point for a geometry.
///
/// A point labels itself; a polygon is labeled from its outer ring; a
/// multi-polygon is labeled from its **first** constituent polygon's
/// outer ring only — one label per region, even when the region has
/// several physical parts.
#[must_use]
pub fn centroid_of_geometry(geometry: &Geometry) -> Option<Position> {
    match geometry {
        Geometry::Point(pos) => Some(*pos),
        Geometry::Polygon(rings) => rings.first().and_then(centroid_of_ring),
        Geometry::MultiPolygon(polygons) => polygons
            .first()
            .and_then(|rings| rings.first())
            .and_then(centroid_of_ring),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_average_includes_closing_duplicate() {
        // Mean of all five listed vertices, duplicate [0,0] included:
        // lng (0+0+10+10+0)/5 = 4, lat (0+10+10+0+0)/5 = 6. Pinned
        // exactly; this is the documented approximation, not the
        // geometric centroid (5, 5).
        let ring = vec![[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]];
        assert_eq!(centroid_of_ring(&ring), Some([4.0, 6.0]));
    }

    #[test]
    fn empty_ring_has_no_centroid() {
        assert_eq!(centroid_of_ring(&Ring::new()), None);
    }

    #[test]
    fn multipolygon_labels_from_first_part_only() {
        let geom = Geometry::MultiPolygon(vec![
            vec![vec![[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0], [0.0, 0.0]]],
            vec![vec![[100.0, 100.0], [100.0, 102.0], [102.0, 102.0], [100.0, 100.0]]],
        ]);
        let centroid = centroid_of_geometry(&geom).unwrap();
        assert!(centroid[0] < 10.0 && centroid[1] < 10.0);
    }

    #[test]
    fn point_labels_itself() {
        let geom = Geometry::Point([79.12, 28.03]);
        assert_eq!(centroid_of_geometry(&geom), Some([79.12, 28.03]));
    }
}
