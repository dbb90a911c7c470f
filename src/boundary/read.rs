//! Shapefile loading for boundary layers.

use std::path::Path;

use anyhow::{Context, Result, bail};
use shapefile::{Reader, Shape, dbase::FieldValue};

use super::RegionLayer;

/// Read a named-polygon layer from a shapefile. The region name is taken
/// from `region_field`, trying the declared name first and a `_right`
/// suffixed variant second (spatial joins rename columns that way); if
/// neither exists the run aborts.
pub fn read_region_layer(path: &Path, region_field: &str, crs: &str) -> Result<RegionLayer> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("failed to open boundary shapefile: {}", path.display()))?;

    let suffixed = format!("{region_field}_right");
    let mut names = Vec::new();
    let mut geoms = Vec::new();

    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item.context("error reading shape+record")?;

        let value = record
            .get(region_field)
            .or_else(|| record.get(&suffixed));
        let Some(value) = value else {
            bail!(
                "no region-name column in {}: tried {region_field:?} and {suffixed:?}",
                path.display()
            );
        };
        let name = match value {
            FieldValue::Character(Some(s)) => s.trim().to_string(),
            FieldValue::Character(None) => String::new(),
            FieldValue::Memo(s) => s.trim().to_string(),
            other => bail!("region-name column {region_field:?} is not text: {other:?}"),
        };

        match shape {
            Shape::Polygon(p) => {
                names.push(name);
                geoms.push(polygon_to_geo(&p));
            }
            other => {
                log::warn!("skipping non-polygon shape in {}: {}", path.display(), other.shapetype());
            }
        }
    }

    log::info!("loaded {} region polygons from {}", names.len(), path.display());
    Ok(RegionLayer::from_parts(names, geoms, crs))
}

/// Convert a shapefile polygon to `geo::MultiPolygon`, grouping each
/// exterior ring (CW in shapefile convention) with the hole rings that
/// follow it.
fn polygon_to_geo(p: &shapefile::Polygon) -> geo::MultiPolygon<f64> {
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
            if first != last {
                coords.push(first);
            }
        }
    }

    // Signed area of a coordinate ring (negative = CW = exterior).
    fn signed_area(pts: &[geo::Coord<f64>]) -> f64 {
        let mut a = 0.0;
        for w in pts.windows(2) {
            a += w[0].x * w[1].y - w[1].x * w[0].y;
        }
        a / 2.0
    }

    let mut rings: Vec<(geo::LineString<f64>, bool)> = Vec::with_capacity(p.rings().len());
    for ring in p.rings() {
        let mut coords: Vec<geo::Coord<f64>> =
            ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
        ensure_closed(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        rings.push((geo::LineString(coords), is_exterior));
    }

    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes: Vec<geo::LineString<f64>> = Vec::new();
    for (ls, is_exterior) in rings {
        if is_exterior {
            if let Some(ext) = exterior.take() {
                polys.push(geo::Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(ls);
        } else {
            holes.push(ls);
        }
    }
    if let Some(ext) = exterior {
        polys.push(geo::Polygon::new(ext, holes));
    }

    geo::MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use shapefile::{Point as ShpPoint, PolygonRing};

    #[test]
    fn exterior_and_hole_group_into_one_polygon() {
        // Shapefile convention: exterior CW, hole CCW.
        let ext = vec![
            ShpPoint::new(0.0, 0.0),
            ShpPoint::new(0.0, 4.0),
            ShpPoint::new(4.0, 4.0),
            ShpPoint::new(4.0, 0.0),
            ShpPoint::new(0.0, 0.0),
        ];
        let hole = vec![
            ShpPoint::new(1.0, 1.0),
            ShpPoint::new(3.0, 1.0),
            ShpPoint::new(3.0, 3.0),
            ShpPoint::new(1.0, 3.0),
            ShpPoint::new(1.0, 1.0),
        ];
        let shp = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(ext),
            PolygonRing::Inner(hole),
        ]);
        let mp = polygon_to_geo(&shp);
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - 12.0).abs() < 1e-9); // 16 - 4
    }
}
