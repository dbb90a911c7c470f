//! `resolve` command: run the full pipeline for one country.

use anyhow::{Context, Result};
use log::info;

use crate::boundary::{BoundaryResolver, read_region_layer};
use crate::cli::ResolveArgs;
use crate::config::Config;
use crate::geocode::{GeocodeCache, NominatimClient, ReverseGeocodeFallback};
use crate::io::{read_points, read_reference, write_output};
use crate::matching::{ExactLookupIndex, NearestRegionIndex};
use crate::pipeline::{PipelineConfig, ResolutionPipeline};
use crate::report::QaReport;
use crate::types::is_placeholder;

pub fn run(args: &ResolveArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let country = config.country(&args.country)?;
    info!("running pipeline for {}", country.name);

    let points = read_points(&country.input_file)?;
    info!("loaded {} points from {}", points.len(), country.input_file.display());

    // Shared read-only indices, built once before the per-record loop.
    let reference = match &country.reference_file {
        Some(path) => read_reference(path)
            .with_context(|| format!("failed to load reference table for {}", country.name))?,
        None => Vec::new(),
    };
    let exact =
        ExactLookupIndex::build(reference.iter().map(|r| (r.name.as_str(), r.region.clone())));
    let nearest = NearestRegionIndex::build(
        reference
            .iter()
            .filter(|r| !is_placeholder(&r.region))
            .filter_map(|r| Some((r.latitude?, r.longitude?, r.region.clone())))
            .collect(),
    );
    info!("reference table: {} names, {} located points", exact.len(), nearest.len());

    let layer =
        read_region_layer(&country.boundary_file, &country.region_field, &country.boundary_crs)?;
    let boundary = BoundaryResolver::new(layer)?;

    let pipeline =
        ResolutionPipeline::new(&exact, &nearest, Some(&boundary), PipelineConfig::default());

    let assignments = if args.offline {
        info!("offline run: reverse-geocode fallback disabled");
        pipeline.run::<NominatimClient>(&points, None)?
    } else {
        let cache = match &country.cache_file {
            Some(path) => GeocodeCache::load(path)?,
            None => GeocodeCache::default(),
        };
        let mut fallback = ReverseGeocodeFallback::new(NominatimClient::new()?, cache);
        let assignments = pipeline.run(&points, Some(&mut fallback))?;
        if let Some(path) = &country.cache_file {
            let cache = fallback.into_cache();
            cache.save(path)?;
            info!("persisted {} reverse-geocode cache entries", cache.len());
        }
        assignments
    };

    write_output(&points, &assignments, &country.output_file)?;
    info!("output written to {}", country.output_file.display());

    let report = QaReport::from_rows(
        assignments
            .iter()
            .map(|a| (a.region.as_str(), a.stage.as_str(), a.was_corrected)),
    );
    println!("{report}");
    Ok(())
}
