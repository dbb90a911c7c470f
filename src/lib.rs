#![doc = "Suburb-to-region resolution: exact, fuzzy, nearest-point, boundary containment, and reverse-geocode fallback."]

pub mod boundary;
pub mod cli;
pub mod commands;
pub mod config;
pub mod geocode;
pub mod io;
pub mod matching;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod types;

#[doc(inline)]
pub use boundary::{BoundaryResolver, RegionLayer};

#[doc(inline)]
pub use matching::{ExactLookupIndex, NearestRegionIndex};

#[doc(inline)]
pub use pipeline::{PipelineConfig, ResolutionPipeline};

#[doc(inline)]
pub use types::{Point, RegionAssignment, ResolutionStage};
