//! Per-country configuration surface.
//!
//! A JSON file maps country codes to paths and the boundary layer's
//! region-name column. Configuration problems are fatal: they abort the run
//! before any record is processed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::boundary::WGS84_PROJ4;

fn default_crs() -> String {
    WGS84_PROJ4.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryConfig {
    /// Display name, e.g. "Australia".
    pub name: String,
    /// Point table (`name,state,latitude,longitude`).
    pub input_file: PathBuf,
    /// Optional precomputed `name,region[,latitude,longitude]` table.
    #[serde(default)]
    pub reference_file: Option<PathBuf>,
    /// Official boundary shapefile.
    pub boundary_file: PathBuf,
    /// Attribute column holding the region display name.
    pub region_field: String,
    /// PROJ.4 string of the boundary layer. Defaults to WGS84 lon/lat.
    #[serde(default = "default_crs")]
    pub boundary_crs: String,
    /// Resolved output table.
    pub output_file: PathBuf,
    /// Reverse-geocode cache, shared across runs.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

/// All configured countries, keyed by lowercase country code.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct Config {
    countries: BTreeMap<String, CountryConfig>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Country lookup; an unsupported code aborts the run.
    pub fn country(&self, code: &str) -> Result<&CountryConfig> {
        let code = code.to_lowercase();
        match self.countries.get(&code) {
            Some(cfg) => Ok(cfg),
            None => {
                let known: Vec<&str> = self.countries.keys().map(String::as_str).collect();
                bail!("unsupported country code {code:?} (configured: {})", known.join(", "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "au": {
            "name": "Australia",
            "input_file": "countries/au/suburbs_geocoded.csv",
            "reference_file": "countries/au/sal_to_sa4_mapping_with_latlon.csv",
            "boundary_file": "countries/au/boundaries/SA4_2021_AUST_GDA2020.shp",
            "region_field": "SA4_NAME21",
            "output_file": "countries/au/output.csv",
            "cache_file": "cache/reverse_lookup_cache.csv"
        },
        "nz": {
            "name": "New Zealand",
            "input_file": "countries/nz/source.csv",
            "boundary_file": "countries/nz/boundaries/nz-suburbs-and-localities.shp",
            "region_field": "territoria",
            "output_file": "countries/nz/output.csv"
        }
    }"#;

    #[test]
    fn parses_countries_and_defaults() {
        let config: Config = serde_json::from_str(SAMPLE).unwrap();
        let au = config.country("AU").unwrap();
        assert_eq!(au.name, "Australia");
        assert_eq!(au.region_field, "SA4_NAME21");
        assert_eq!(au.boundary_crs, WGS84_PROJ4);

        let nz = config.country("nz").unwrap();
        assert!(nz.reference_file.is_none());
        assert!(nz.cache_file.is_none());
    }

    #[test]
    fn unsupported_country_code_is_fatal() {
        let config: Config = serde_json::from_str(SAMPLE).unwrap();
        let err = config.country("xx").unwrap_err();
        assert!(err.to_string().contains("unsupported country code"));
    }
}
