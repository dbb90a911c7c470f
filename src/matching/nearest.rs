//! Nearest-known-point lookup over points whose region is already known.
//!
//! Distances are Euclidean over raw (lat, lon) degrees, an acceptable
//! approximation at suburb resolution; this is not a geodesic index.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

#[derive(Debug, Clone)]
struct KnownPoint {
    idx: usize, // construction order, used as the tie-break key
    pos: [f64; 2],
}

impl RTreeObject for KnownPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.pos, self.pos)
    }
}

impl PointDistance for KnownPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index mapping a query coordinate to the region of the closest
/// point with a known region. O(n log n) build, O(log n) query.
#[derive(Debug, Default)]
pub struct NearestRegionIndex {
    tree: RTree<KnownPoint>,
    regions: Vec<String>,
}

impl NearestRegionIndex {
    /// Build from `(lat, lon, region)` entries. Construction order is
    /// remembered: equidistant ties resolve to the earliest entry.
    pub fn build(entries: Vec<(f64, f64, String)>) -> Self {
        let mut regions = Vec::with_capacity(entries.len());
        let mut points = Vec::with_capacity(entries.len());
        for (idx, (lat, lon, region)) in entries.into_iter().enumerate() {
            points.push(KnownPoint { idx, pos: [lat, lon] });
            regions.push(region);
        }
        Self { tree: RTree::bulk_load(points), regions }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Region of the closest known point, or `None` when the index is
    /// empty (callers skip this stage rather than erroring).
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<&str> {
        let query = [lat, lon];
        let mut iter = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = iter.next()?;
        let mut best_idx = first.idx;
        // Collect every candidate at the minimal distance and keep the one
        // inserted first, so results never depend on tree traversal order.
        for (cand, d2) in iter {
            if d2 > best_d2 {
                break;
            }
            if cand.idx < best_idx {
                best_idx = cand.idx;
            }
        }
        Some(&self.regions[best_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_region_of_closest_point() {
        let idx = NearestRegionIndex::build(vec![
            (-34.0, 151.0, "RegionA".into()),
            (-37.8, 144.9, "RegionB".into()),
        ]);
        assert_eq!(idx.nearest(-34.1, 151.1), Some("RegionA"));
        assert_eq!(idx.nearest(-37.9, 145.0), Some("RegionB"));
    }

    #[test]
    fn empty_index_returns_none() {
        let idx = NearestRegionIndex::build(Vec::new());
        assert!(idx.is_empty());
        assert_eq!(idx.nearest(0.0, 0.0), None);
    }

    #[test]
    fn equidistant_tie_keeps_construction_order() {
        // Two points symmetric about the query.
        let idx = NearestRegionIndex::build(vec![
            (0.0, 1.0, "First".into()),
            (0.0, -1.0, "Second".into()),
        ]);
        assert_eq!(idx.nearest(0.0, 0.0), Some("First"));

        let swapped = NearestRegionIndex::build(vec![
            (0.0, -1.0, "Second".into()),
            (0.0, 1.0, "First".into()),
        ]);
        assert_eq!(swapped.nearest(0.0, 0.0), Some("Second"));
    }
}
