//! `build-reference` command: containment-join a locality polygon layer
//! against a coarse region layer to produce the exact-lookup reference
//! table, with each locality's interior point as its coordinates.

use anyhow::{Context, Result};
use geo::InteriorPoint;
use log::{info, warn};

use crate::boundary::{PointReprojector, WGS84_PROJ4, read_region_layer};
use crate::cli::BuildReferenceArgs;
use crate::io::{ReferenceRow, write_reference};

pub fn run(args: &BuildReferenceArgs) -> Result<()> {
    let crs = args.crs.as_deref().unwrap_or(WGS84_PROJ4);
    let localities = read_region_layer(&args.localities, &args.locality_field, crs)?;
    let regions = read_region_layer(&args.regions, &args.region_field, crs)?;

    // Interior points come out in the layer CRS; the reference table stores
    // WGS84 lat/lon like every other point table.
    let to_wgs84 = PointReprojector::between(crs, WGS84_PROJ4)
        .context("failed to build reprojection back to WGS84")?;

    let mut rows = Vec::with_capacity(localities.len());
    let mut unmatched = 0usize;
    for (name, geom) in localities.names().iter().zip(localities.geoms()) {
        let Some(pt) = geom.interior_point() else {
            warn!("locality {name:?} has no interior point (empty geometry)");
            unmatched += 1;
            continue;
        };
        let Some(hit) = regions.locate(pt.x(), pt.y()) else {
            unmatched += 1;
            continue;
        };
        if hit.ambiguous {
            warn!("locality {name:?} falls in overlapping regions; keeping {:?}", hit.region);
        }
        let (lon, lat) = to_wgs84.project(pt.x(), pt.y())?;
        rows.push(ReferenceRow {
            name: name.clone(),
            region: hit.region.to_string(),
            latitude: Some(lat),
            longitude: Some(lon),
        });
    }

    if unmatched > 0 {
        warn!("{unmatched} of {} localities matched no region polygon", localities.len());
    }
    write_reference(&rows, &args.output)?;
    info!("wrote {} reference rows to {}", rows.len(), args.output.display());
    Ok(())
}
