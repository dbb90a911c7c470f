//! The suburb-to-region resolution pipeline.
//!
//! Three passes over the batch:
//!  1. provisional — exact lookup, then fuzzy match, then nearest known
//!     point; first hit wins, else a `Regional {STATE}` placeholder,
//!  2. authoritative — point-in-polygon against the official boundary
//!     layer, attempted for every record with usable coordinates; a hit
//!     overwrites the provisional region and computes `was_corrected`,
//!  3. residual — records still carrying a placeholder go to the
//!     reverse-geocode fallback, whose answer is final.
//!
//! Indices are built once and shared read-only; records are independent.

use anyhow::Result;

use crate::boundary::BoundaryResolver;
use crate::geocode::{ReverseGeocodeFallback, ReverseGeocoder};
use crate::matching::{DEFAULT_FUZZY_THRESHOLD, ExactLookupIndex, NearestRegionIndex, best_match};
use crate::normalize::normalize_name;
use crate::types::{Point, RegionAssignment, ResolutionStage, UNKNOWN_REGION, is_placeholder};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum fuzzy score to accept a match.
    pub fuzzy_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD }
    }
}

/// One record mid-pipeline: the current best region plus the provisional
/// baseline `was_corrected` is computed against. Placeholders never become
/// the baseline.
struct WorkingRecord {
    region: String,
    stage: ResolutionStage,
    provisional: Option<String>,
    was_corrected: bool,
}

pub struct ResolutionPipeline<'a> {
    exact: &'a ExactLookupIndex,
    nearest: &'a NearestRegionIndex,
    boundary: Option<&'a BoundaryResolver>,
    config: PipelineConfig,
}

impl<'a> ResolutionPipeline<'a> {
    pub fn new(
        exact: &'a ExactLookupIndex,
        nearest: &'a NearestRegionIndex,
        boundary: Option<&'a BoundaryResolver>,
        config: PipelineConfig,
    ) -> Self {
        Self { exact, nearest, boundary, config }
    }

    /// Resolve the whole batch. Output order matches input order; a record
    /// is never dropped, whatever its data quality. `fallback` is `None`
    /// for offline runs.
    pub fn run<G: ReverseGeocoder>(
        &self,
        points: &[Point],
        mut fallback: Option<&mut ReverseGeocodeFallback<G>>,
    ) -> Result<Vec<RegionAssignment>> {
        let mut records: Vec<WorkingRecord> = Vec::with_capacity(points.len());

        for point in points {
            let mut rec = self.provisional_pass(point)?;
            self.boundary_pass(point, &mut rec);
            records.push(rec);
        }

        for (point, rec) in points.iter().zip(records.iter_mut()) {
            self.residual_pass(point, rec, fallback.as_deref_mut());
        }

        Ok(records
            .into_iter()
            .map(|rec| RegionAssignment {
                region: rec.region,
                stage: rec.stage,
                was_corrected: rec.was_corrected,
            })
            .collect())
    }

    /// Pass 1: exact → fuzzy → nearest, first hit wins. Misses get the
    /// `Regional {STATE}` placeholder, which is always escalated later and
    /// never treated as a legitimate terminal value.
    fn provisional_pass(&self, point: &Point) -> Result<WorkingRecord> {
        let key = normalize_name(&point.name);

        if let Some(region) = self.exact.get(&key) {
            return Ok(WorkingRecord::provisional(region, ResolutionStage::Exact));
        }

        if !self.exact.is_empty() {
            let (candidate, score) = best_match(&key, self.exact.keys_sorted())?;
            if score >= self.config.fuzzy_threshold {
                if let Some(region) = self.exact.get(candidate) {
                    log::debug!("fuzzy {:?} -> {candidate:?} ({score:.1})", point.name);
                    return Ok(WorkingRecord::provisional(region, ResolutionStage::Fuzzy));
                }
            }
        }

        if !self.nearest.is_empty() {
            if let Some((lat, lon)) = point.coords() {
                if let Some(region) = self.nearest.nearest(lat, lon) {
                    return Ok(WorkingRecord::provisional(region, ResolutionStage::Nearest));
                }
            }
        }

        Ok(WorkingRecord::placeholder(&point.state))
    }

    /// Pass 2: the authoritative stage. Always attempted when a boundary
    /// layer is configured and the record has usable coordinates; a hit
    /// overrides whatever pass 1 guessed.
    fn boundary_pass(&self, point: &Point, rec: &mut WorkingRecord) {
        let Some(boundary) = self.boundary else { return };
        let Some((lat, lon)) = point.coords() else { return };
        let Some(hit) = boundary.resolve(lat, lon) else { return };

        if hit.ambiguous {
            log::warn!(
                "overlapping boundary polygons at ({lat}, {lon}); keeping first match {:?}",
                hit.region
            );
        }
        rec.was_corrected = match &rec.provisional {
            Some(prev) => !prev.eq_ignore_ascii_case(hit.region),
            None => false,
        };
        rec.region = hit.region.to_string();
        rec.stage = ResolutionStage::Boundary;
    }

    /// Pass 3: placeholders only. The fallback's answer is final; an
    /// Unknown answer (or no fallback, or no usable coordinates) leaves the
    /// record `Unresolved` but still present in the output.
    fn residual_pass<G: ReverseGeocoder>(
        &self,
        point: &Point,
        rec: &mut WorkingRecord,
        fallback: Option<&mut ReverseGeocodeFallback<G>>,
    ) {
        if !is_placeholder(&rec.region) {
            return;
        }
        if let (Some(fallback), Some((lat, lon))) = (fallback, point.coords()) {
            let info = fallback.resolve(lat, lon);
            if let Some(region) = info.best_region() {
                rec.region = region.to_string();
                rec.stage = ResolutionStage::ReverseGeocode;
                return;
            }
        }
        rec.stage = ResolutionStage::Unresolved;
        if rec.region.trim().is_empty() {
            rec.region = UNKNOWN_REGION.to_string();
        }
    }
}

impl WorkingRecord {
    fn provisional(region: &str, stage: ResolutionStage) -> Self {
        Self {
            region: region.to_string(),
            stage,
            provisional: Some(region.to_string()),
            was_corrected: false,
        }
    }

    fn placeholder(state: &str) -> Self {
        let state = state.trim().to_uppercase();
        let region =
            if state.is_empty() { "Regional".to_string() } else { format!("Regional {state}") };
        Self { region, stage: ResolutionStage::Unresolved, provisional: None, was_corrected: false }
    }
}
