//! Non-authoritative matching stages: exact lookup, fuzzy name matching,
//! and nearest-known-point lookup.

mod exact;
mod fuzzy;
mod nearest;

pub use exact::ExactLookupIndex;
pub use fuzzy::{DEFAULT_FUZZY_THRESHOLD, best_match, indel_ratio};
pub use nearest::NearestRegionIndex;
