use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Suburb-to-region resolution CLI.
#[derive(Parser, Debug)]
#[command(name = "regionmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full resolution pipeline for one country
    Resolve(ResolveArgs),

    /// Build a name->region reference table from two polygon layers
    BuildReference(BuildReferenceArgs),

    /// Print aggregate QA metrics for a resolved output table
    Qa(QaArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Country code, e.g. au, nz, in
    #[arg(long)]
    pub country: String,

    /// Per-country configuration file (JSON)
    #[arg(long, value_hint = ValueHint::FilePath, default_value = "config.json")]
    pub config: PathBuf,

    /// Skip the reverse-geocode fallback (no network calls)
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args, Debug)]
pub struct BuildReferenceArgs {
    /// Fine-grained locality polygon layer (shapefile)
    #[arg(value_hint = ValueHint::FilePath)]
    pub localities: PathBuf,

    /// Attribute column holding the locality name
    #[arg(long)]
    pub locality_field: String,

    /// Coarse region polygon layer (shapefile)
    #[arg(value_hint = ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Attribute column holding the region name
    #[arg(long)]
    pub region_field: String,

    /// PROJ.4 string shared by both layers (defaults to WGS84 lon/lat)
    #[arg(long)]
    pub crs: Option<String>,

    /// Output reference CSV (name,region,latitude,longitude)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct QaArgs {
    /// Resolved output table to summarize
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,
}
