//! Nominatim reverse-geocoding client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{RegionInfo, ReverseGeocoder};
use crate::types::UNKNOWN_REGION;

const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
const USER_AGENT: &str = concat!("regionmap/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    county: Option<String>,
    state_district: Option<String>,
    region: Option<String>,
    state: Option<String>,
}

/// Blocking Nominatim client. Zoom 10 returns district-level detail.
pub struct NominatimClient {
    client: Client,
    endpoint: String,
}

impl NominatimClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build reverse-geocode HTTP client")?;
        Ok(Self { client, endpoint: endpoint.to_string() })
    }

    fn request(&self, lat: f64, lon: f64) -> Result<RegionInfo> {
        let response: ReverseResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "jsonv2".to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .context("reverse-geocode request failed")?
            .error_for_status()
            .context("reverse-geocode request rejected")?
            .json()
            .context("reverse-geocode response was not valid JSON")?;

        let addr = response.address;
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN_REGION.to_string());
        Ok(RegionInfo {
            county: or_unknown(addr.county),
            state_district: or_unknown(addr.state_district.or(addr.region)),
            state: or_unknown(addr.state),
        })
    }
}

impl ReverseGeocoder for NominatimClient {
    /// Never raises to the caller: transport and parse failures degrade to
    /// the `Unknown` sentinel so the batch keeps going.
    fn reverse_geocode(&self, lat: f64, lon: f64) -> RegionInfo {
        match self.request(lat, lon) {
            Ok(info) => info,
            Err(err) => {
                log::warn!("reverse geocode failed for ({lat}, {lon}): {err:#}");
                RegionInfo::unknown()
            }
        }
    }
}
