//! Reverse-geocoding fallback: the only stage allowed to touch the network.
//!
//! Lookups go through an append-only cache keyed by coordinates rounded to
//! six decimals, and live calls are spaced by a mandatory minimum delay.

mod cache;
mod nominatim;

pub use cache::{GeocodeCache, round6};
pub use nominatim::NominatimClient;

use std::thread;
use std::time::{Duration, Instant};

use crate::types::UNKNOWN_REGION;

/// Spacing between live reverse-geocode calls (Nominatim etiquette).
pub const MIN_CALL_DELAY: Duration = Duration::from_millis(1100);

/// Administrative names for one coordinate. Fields hold the `Unknown`
/// sentinel rather than being absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionInfo {
    pub county: String,
    pub state_district: String,
    pub state: String,
}

impl RegionInfo {
    pub fn unknown() -> Self {
        Self {
            county: UNKNOWN_REGION.to_string(),
            state_district: UNKNOWN_REGION.to_string(),
            state: UNKNOWN_REGION.to_string(),
        }
    }

    /// Region to assign from this lookup: the district when present,
    /// otherwise the county. `None` when the lookup produced nothing usable.
    pub fn best_region(&self) -> Option<&str> {
        [&self.state_district, &self.county]
            .into_iter()
            .map(String::as_str)
            .find(|v| !v.trim().is_empty() && !v.eq_ignore_ascii_case(UNKNOWN_REGION))
    }
}

/// External reverse-geocoding capability. Implementations never raise:
/// any transport or parse failure becomes the `Unknown` sentinel so one
/// bad lookup cannot abort the batch.
pub trait ReverseGeocoder {
    fn reverse_geocode(&self, lat: f64, lon: f64) -> RegionInfo;
}

/// Caching, rate-limited front of a [`ReverseGeocoder`]. A coordinate is
/// looked up live at most once per run; warm-cache hits never touch the
/// network or the rate limiter.
pub struct ReverseGeocodeFallback<G> {
    geocoder: G,
    cache: GeocodeCache,
    min_delay: Duration,
    last_call: Option<Instant>,
}

impl<G: ReverseGeocoder> ReverseGeocodeFallback<G> {
    pub fn new(geocoder: G, cache: GeocodeCache) -> Self {
        Self::with_min_delay(geocoder, cache, MIN_CALL_DELAY)
    }

    pub fn with_min_delay(geocoder: G, cache: GeocodeCache, min_delay: Duration) -> Self {
        Self { geocoder, cache, min_delay, last_call: None }
    }

    pub fn resolve(&mut self, lat: f64, lon: f64) -> RegionInfo {
        let (lat, lon) = (round6(lat), round6(lon));
        if let Some(hit) = self.cache.get(lat, lon) {
            return hit.clone();
        }
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                thread::sleep(self.min_delay - elapsed);
            }
        }
        log::debug!("reverse geocoding ({lat}, {lon})");
        let info = self.geocoder.reverse_geocode(lat, lon);
        self.last_call = Some(Instant::now());
        self.cache.insert(lat, lon, info.clone());
        info
    }

    /// Hand the cache back for persistence after the batch completes.
    pub fn into_cache(self) -> GeocodeCache {
        self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubGeocoder {
        calls: RefCell<Vec<(f64, f64, Instant)>>,
        answer: RegionInfo,
    }

    impl StubGeocoder {
        fn new(answer: RegionInfo) -> Self {
            Self { calls: RefCell::new(Vec::new()), answer }
        }
    }

    impl ReverseGeocoder for StubGeocoder {
        fn reverse_geocode(&self, lat: f64, lon: f64) -> RegionInfo {
            self.calls.borrow_mut().push((lat, lon, Instant::now()));
            self.answer.clone()
        }
    }

    fn info(district: &str) -> RegionInfo {
        RegionInfo {
            county: "Some County".into(),
            state_district: district.into(),
            state: "New South Wales".into(),
        }
    }

    #[test]
    fn best_region_prefers_district_then_county() {
        assert_eq!(info("Greater Sydney").best_region(), Some("Greater Sydney"));
        let mut i = info("Greater Sydney");
        i.state_district = UNKNOWN_REGION.into();
        assert_eq!(i.best_region(), Some("Some County"));
        assert_eq!(RegionInfo::unknown().best_region(), None);
    }

    #[test]
    fn repeated_coordinate_hits_cache_not_network() {
        let stub = StubGeocoder::new(info("Illawarra"));
        let mut fb = ReverseGeocodeFallback::with_min_delay(
            stub,
            GeocodeCache::default(),
            Duration::ZERO,
        );
        assert_eq!(fb.resolve(-34.42, 150.89).best_region(), Some("Illawarra"));
        assert_eq!(fb.resolve(-34.42, 150.89).best_region(), Some("Illawarra"));
        // Sub-rounding-precision difference maps to the same cache key.
        assert_eq!(fb.resolve(-34.4200000004, 150.89).best_region(), Some("Illawarra"));
        assert_eq!(fb.geocoder.calls.borrow().len(), 1);
    }

    #[test]
    fn live_calls_respect_minimum_delay() {
        let delay = Duration::from_millis(50);
        let stub = StubGeocoder::new(info("Hunter Valley"));
        let mut fb = ReverseGeocodeFallback::with_min_delay(stub, GeocodeCache::default(), delay);
        fb.resolve(-32.9, 151.7);
        fb.resolve(-32.8, 151.6);
        fb.resolve(-32.7, 151.5);
        let calls = fb.geocoder.calls.borrow();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1].2.duration_since(pair[0].2) >= delay);
        }
    }

    #[test]
    fn warm_cache_skips_rate_limiter() {
        let mut cache = GeocodeCache::default();
        cache.insert(-34.42, 150.89, info("Illawarra"));
        let stub = StubGeocoder::new(info("never used"));
        let mut fb =
            ReverseGeocodeFallback::with_min_delay(stub, cache, Duration::from_secs(60));
        let start = Instant::now();
        assert_eq!(fb.resolve(-34.42, 150.89).best_region(), Some("Illawarra"));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(fb.geocoder.calls.borrow().is_empty());
    }
}
