//! Authoritative point-in-polygon resolution against a named boundary layer.

mod proj;
mod read;

pub use proj::{PointReprojector, WGS84_PROJ4};
pub use read::read_region_layer;

use anyhow::Result;
use geo::{BoundingRect, Intersects, MultiPolygon, Rect};
use rstar::{AABB, RTree, RTreeObject};

#[derive(Debug, Clone)]
struct BoundingBox {
    idx: usize, // index of the corresponding polygon in `geoms`
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// A containment hit. `ambiguous` flags overlapping polygons: the region is
/// then the first match in layer order, never an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Containment<'a> {
    pub region: &'a str,
    pub ambiguous: bool,
}

/// A named-polygon layer in its declared CRS, indexed by bounding box.
pub struct RegionLayer {
    names: Vec<String>,
    geoms: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    crs: String,
}

impl RegionLayer {
    /// Assemble a layer from parallel name/geometry vectors and a PROJ.4
    /// CRS string. Layer order is preserved; it is the overlap tie-break.
    pub fn from_parts(names: Vec<String>, geoms: Vec<MultiPolygon<f64>>, crs: &str) -> Self {
        let boxes = geoms
            .iter()
            .enumerate()
            .filter_map(|(idx, poly)| poly.bounding_rect().map(|bbox| BoundingBox { idx, bbox }))
            .collect();
        Self { names, geoms, rtree: RTree::bulk_load(boxes), crs: crs.to_string() }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn geoms(&self) -> &[MultiPolygon<f64>] {
        &self.geoms
    }

    /// Polygon containing `(x, y)` (layer CRS), inclusive of the boundary:
    /// a point on a polygon edge counts as inside. Multiple containing
    /// polygons resolve to the lowest layer index with `ambiguous` set.
    pub fn locate(&self, x: f64, y: f64) -> Option<Containment<'_>> {
        let pt = geo::Point::new(x, y);
        let env = AABB::from_corners([x, y], [x, y]);
        let mut hits: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&env)
            .filter(|bb| self.geoms[bb.idx].intersects(&pt))
            .map(|bb| bb.idx)
            .collect();
        hits.sort_unstable();
        let first = *hits.first()?;
        Some(Containment { region: &self.names[first], ambiguous: hits.len() > 1 })
    }
}

/// Couples a region layer with the reprojection from WGS84 input points
/// into the layer's CRS. Points are always reprojected toward the layer,
/// never the authoritative geometry toward the points.
pub struct BoundaryResolver {
    layer: RegionLayer,
    reprojector: PointReprojector,
}

impl BoundaryResolver {
    pub fn new(layer: RegionLayer) -> Result<Self> {
        let reprojector = PointReprojector::to_layer(layer.crs())?;
        Ok(Self { layer, reprojector })
    }

    pub fn layer(&self) -> &RegionLayer {
        &self.layer
    }

    /// Containing region for a WGS84 (lat, lon) point. A per-point
    /// transform failure degrades to a miss rather than aborting the batch.
    pub fn resolve(&self, lat: f64, lon: f64) -> Option<Containment<'_>> {
        match self.reprojector.project(lon, lat) {
            Ok((x, y)) => self.layer.locate(x, y),
            Err(err) => {
                log::warn!("boundary reprojection failed for ({lat}, {lon}): {err:#}");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::{Centroid, polygon};

    pub(crate) fn square(name: &str, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> (String, MultiPolygon<f64>) {
        let poly = polygon![
            (x: min_x, y: min_y),
            (x: max_x, y: min_y),
            (x: max_x, y: max_y),
            (x: min_x, y: max_y),
            (x: min_x, y: min_y),
        ];
        (name.to_string(), MultiPolygon(vec![poly]))
    }

    fn layer_of(parts: Vec<(String, MultiPolygon<f64>)>) -> RegionLayer {
        let (names, geoms) = parts.into_iter().unzip();
        RegionLayer::from_parts(names, geoms, WGS84_PROJ4)
    }

    #[test]
    fn centroid_resolves_to_its_polygon() {
        let (name, geom) = square("Illawarra", 150.7, -34.6, 151.2, -34.1);
        let centroid = geom.centroid().unwrap();
        let layer = layer_of(vec![(name, geom)]);
        let hit = layer.locate(centroid.x(), centroid.y()).unwrap();
        assert_eq!(hit.region, "Illawarra");
        assert!(!hit.ambiguous);
    }

    #[test]
    fn far_outside_all_polygons_is_a_miss() {
        let layer = layer_of(vec![square("Sydney", 150.8, -34.1, 151.4, -33.5)]);
        assert!(layer.locate(115.0, -31.9).is_none());
    }

    #[test]
    fn boundary_touching_counts_as_inside() {
        let layer = layer_of(vec![square("Newcastle", 151.4, -33.2, 151.9, -32.8)]);
        let hit = layer.locate(151.4, -33.0).unwrap();
        assert_eq!(hit.region, "Newcastle");
    }

    #[test]
    fn overlap_picks_first_layer_index_and_flags_it() {
        let layer = layer_of(vec![
            square("Second", 0.0, 0.0, 2.0, 2.0),
            square("First", 0.5, 0.5, 1.5, 1.5),
        ]);
        let hit = layer.locate(1.0, 1.0).unwrap();
        assert_eq!(hit.region, "Second"); // lowest layer index wins
        assert!(hit.ambiguous);
    }

    #[test]
    fn resolver_takes_lat_lon_in_wgs84() {
        let layer = layer_of(vec![square("South East Melbourne", 144.9, -38.2, 145.4, -37.7)]);
        let resolver = BoundaryResolver::new(layer).unwrap();
        let hit = resolver.resolve(-37.95, 145.15).unwrap();
        assert_eq!(hit.region, "South East Melbourne");
        assert!(resolver.resolve(-12.46, 130.84).is_none());
    }
}
