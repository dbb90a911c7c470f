//! Core record types shared by every pipeline stage.

use std::fmt;

/// Sentinel region written for records no stage could resolve.
pub const UNKNOWN_REGION: &str = "Unknown";

/// A geocoded locality awaiting region assignment. Immutable once loaded;
/// coordinates stay `None` when the source table held nothing parseable.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub name: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Point {
    /// Coordinates usable by the spatial stages: both present and in range.
    /// Out-of-range or missing values exclude the record from spatial
    /// lookups but never drop it from the output.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

/// Which strategy produced a record's final region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStage {
    Exact,
    Fuzzy,
    Nearest,
    Boundary,
    ReverseGeocode,
    Unresolved,
}

impl ResolutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Nearest => "nearest",
            Self::Boundary => "boundary",
            Self::ReverseGeocode => "reverse_geocode",
            Self::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final assignment for one point. `region` is never empty: unresolved
/// records carry an explicit sentinel or placeholder string.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAssignment {
    pub region: String,
    pub stage: ResolutionStage,
    pub was_corrected: bool,
}

/// "Not really resolved" region values that must trigger fallback
/// escalation: empty, Unknown/None, and the `Regional {STATE}` family.
pub fn is_placeholder(region: &str) -> bool {
    let r = region.trim();
    r.is_empty()
        || r.eq_ignore_ascii_case("unknown")
        || r.eq_ignore_ascii_case("none")
        || r.get(..8).is_some_and(|p| p.eq_ignore_ascii_case("regional"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_rejects_out_of_range() {
        let mut p = Point {
            name: "x".into(),
            state: "NSW".into(),
            latitude: Some(-33.8),
            longitude: Some(151.2),
        };
        assert_eq!(p.coords(), Some((-33.8, 151.2)));
        p.latitude = Some(-91.0);
        assert_eq!(p.coords(), None);
        p.latitude = None;
        assert_eq!(p.coords(), None);
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("  "));
        assert!(is_placeholder("Unknown"));
        assert!(is_placeholder("none"));
        assert!(is_placeholder("Regional NSW"));
        assert!(is_placeholder("regional vic"));
        assert!(!is_placeholder("Sydney - Inner West"));
        assert!(!is_placeholder("Region"));
    }

    #[test]
    fn stage_round_trips_as_text() {
        assert_eq!(ResolutionStage::ReverseGeocode.to_string(), "reverse_geocode");
        assert_eq!(ResolutionStage::Unresolved.as_str(), "unresolved");
    }
}
