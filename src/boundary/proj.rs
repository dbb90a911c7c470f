//! Point reprojection between the WGS84 input CRS and a boundary layer's
//! declared CRS, via PROJ.4 strings.

use anyhow::{Context, Result, anyhow};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// CRS of all incoming point tables (geocoded lon/lat).
pub const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

fn is_geographic(proj4: &str) -> bool {
    proj4.contains("+proj=longlat") || proj4.contains("+proj=latlong")
}

/// Transforms single coordinates between two PROJ.4-described systems.
/// Geographic CRSs work in radians inside proj4rs, so degrees are converted
/// on the way in and, for geographic targets, back out.
pub struct PointReprojector {
    from: Proj4,
    to: Proj4,
    from_geographic: bool,
    to_geographic: bool,
}

impl PointReprojector {
    /// Reprojector from WGS84 lon/lat into `target_proj4`.
    pub fn to_layer(target_proj4: &str) -> Result<Self> {
        Self::between(WGS84_PROJ4, target_proj4)
    }

    pub fn between(source_proj4: &str, target_proj4: &str) -> Result<Self> {
        let from = Proj4::from_proj_string(source_proj4)
            .with_context(|| anyhow!("failed to build source PROJ.4: {source_proj4}"))?;
        let to = Proj4::from_proj_string(target_proj4)
            .with_context(|| anyhow!("failed to build target PROJ.4: {target_proj4}"))?;
        Ok(Self {
            from,
            to,
            from_geographic: is_geographic(source_proj4),
            to_geographic: is_geographic(target_proj4),
        })
    }

    /// Transform one `(x, y)` coordinate. Degrees in/out for geographic
    /// ends, native units (e.g. meters) otherwise.
    pub fn project(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut point = if self.from_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("CRS transform failed for ({x}, {y}): {e}"))?;
        if self.to_geographic {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }
}
