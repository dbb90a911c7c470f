//! Persistent reverse-geocode cache.
//!
//! Keyed by coordinates rounded to six decimals so keys are stable across
//! runs; collisions only happen for genuinely co-located points. Append
//! only, never evicted.

use std::fs::File;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use polars::frame::DataFrame;
use polars::io::{SerReader, SerWriter};
use polars::prelude::{CsvReader, CsvWriter, DataType, NamedFrom};
use polars::series::Series;

use super::RegionInfo;

/// Round a coordinate to the fixed 6-decimal cache precision.
pub fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

fn key(lat: f64, lon: f64) -> (i64, i64) {
    ((lat * 1e6).round() as i64, (lon * 1e6).round() as i64)
}

/// In-memory cache with CSV persistence
/// (`latitude,longitude,county,state_district,state`).
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: AHashMap<(i64, i64), RegionInfo>,
    // Insertion order, so a rewrite only ever appends rows.
    order: Vec<(f64, f64)>,
}

impl GeocodeCache {
    /// Load from `path`; a missing file is an empty (cold) cache.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open geocode cache: {}", path.display()))?;
        let df = CsvReader::new(file)
            .finish()
            .with_context(|| format!("failed to read geocode cache: {}", path.display()))?;

        let lat = df.column("latitude")?.cast(&DataType::Float64)?;
        let lon = df.column("longitude")?.cast(&DataType::Float64)?;
        let county = df.column("county")?.cast(&DataType::String)?;
        let district = df.column("state_district")?.cast(&DataType::String)?;
        let state = df.column("state")?.cast(&DataType::String)?;

        let mut cache = Self::default();
        for i in 0..df.height() {
            let (Some(lat), Some(lon)) = (lat.f64()?.get(i), lon.f64()?.get(i)) else {
                continue;
            };
            let get = |col: &polars::prelude::Column| -> Result<String> {
                Ok(col.str()?.get(i).unwrap_or_default().to_string())
            };
            let info = RegionInfo {
                county: get(&county)?,
                state_district: get(&district)?,
                state: get(&state)?,
            };
            cache.insert(round6(lat), round6(lon), info);
        }
        log::info!("loaded {} cached reverse-geocode entries from {}", cache.len(), path.display());
        Ok(cache)
    }

    pub fn get(&self, lat: f64, lon: f64) -> Option<&RegionInfo> {
        self.entries.get(&key(lat, lon))
    }

    /// Insert an entry; existing keys are kept (append-only semantics).
    pub fn insert(&mut self, lat: f64, lon: f64, info: RegionInfo) {
        let k = key(lat, lon);
        if !self.entries.contains_key(&k) {
            self.order.push((round6(lat), round6(lon)));
            self.entries.insert(k, info);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the full cache in insertion order.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create cache directory: {}", dir.display()))?;
            }
        }
        let mut lats = Vec::with_capacity(self.order.len());
        let mut lons = Vec::with_capacity(self.order.len());
        let mut counties = Vec::with_capacity(self.order.len());
        let mut districts = Vec::with_capacity(self.order.len());
        let mut states = Vec::with_capacity(self.order.len());
        for &(lat, lon) in &self.order {
            let info = &self.entries[&key(lat, lon)];
            lats.push(lat);
            lons.push(lon);
            counties.push(info.county.clone());
            districts.push(info.state_district.clone());
            states.push(info.state.clone());
        }
        let mut df = DataFrame::new(vec![
            Series::new("latitude".into(), lats).into(),
            Series::new("longitude".into(), lons).into(),
            Series::new("county".into(), counties).into(),
            Series::new("state_district".into(), districts).into(),
            Series::new("state".into(), states).into(),
        ])?;
        let file = File::create(path)
            .with_context(|| format!("failed to create geocode cache: {}", path.display()))?;
        CsvWriter::new(file)
            .finish(&mut df)
            .with_context(|| format!("failed to write geocode cache: {}", path.display()))
    }
}
