//! County proximity enrichment.
//!
//! Joins county centroids onto the master dataset, then adds the distance to
//! the nearest national park and the number of campgrounds within a radius.

mod config;
mod master;
mod sources;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geoprox::models::{GeoPoint, ProximityResult};
use geoprox::proximity::{index_all_with_progress, IndexMode, ProximityConfig, Strategy};

use crate::config::{Config, Settings};
use crate::master::MasterTable;

#[derive(Parser, Debug, Clone)]
#[command(name = "enrich")]
#[command(about = "Add park distance and campground density columns to a county dataset")]
struct Args {
    /// Master county CSV (must have a GeoID column)
    #[arg(short, long)]
    master: Option<PathBuf>,

    /// Census county gazetteer (tab separated, optionally .gz)
    #[arg(short, long)]
    gazetteer: Option<PathBuf>,

    /// National parks CSV with Name, Lat, Lon columns
    #[arg(long)]
    parks: Option<PathBuf>,

    /// Saved Overpass JSON of campgrounds
    #[arg(long)]
    campgrounds: Option<PathBuf>,

    /// Where to write the enriched CSV (defaults to overwriting the master)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file with [paths] and [proximity] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Campground search radius in miles
    #[arg(long)]
    radius_miles: Option<f64>,

    /// Sphere radius used for great-circle distances
    #[arg(long)]
    earth_radius_miles: Option<f64>,

    /// Target search strategy: brute-force or rtree
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Process counties on a single thread
    #[arg(long)]
    sequential: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let file_config = match &args.config {
        Some(path) => {
            info!("Using config file {}", path.display());
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };
    let settings = Settings::resolve(&args, file_config)?;

    info!("Geoprox County Enrichment");
    info!("Master: {}", settings.master.display());

    let mut table = MasterTable::load(&settings.master)?;
    debug!("Master columns: {}", table.headers().join(", "));
    let gazetteer = sources::load_gazetteer(&settings.gazetteer)?;
    let counties = table.reference_points(&gazetteer);
    table.set_coordinates(&counties);

    if let Some(path) = &settings.parks {
        let parks = sources::load_parks(path)?;
        info!("Calculating distances to nearest national park...");
        let results = run_batch(&counties, &parks, IndexMode::Nearest, &settings.proximity)?;
        let nearest: Vec<_> = results
            .into_iter()
            .filter_map(|r| match r {
                ProximityResult::Nearest(n) => Some(n),
                ProximityResult::RadiusCount(_) => None,
            })
            .collect();
        table.set_nearest(&nearest);
    }

    if let Some(path) = &settings.campgrounds {
        let campgrounds = sources::load_campgrounds(path)?;
        info!(
            "Counting campgrounds within {} miles of each county...",
            settings.radius_miles
        );
        let results = run_batch(&counties, &campgrounds, settings.radius, &settings.proximity)?;
        let counts: Vec<_> = results
            .into_iter()
            .filter_map(|r| match r {
                ProximityResult::RadiusCount(c) => Some(c),
                ProximityResult::Nearest(_) => None,
            })
            .collect();
        table.set_counts(&settings.count_column(), &counts);
    }

    table.write(&settings.output)?;
    info!(
        "Saved {} counties with proximity columns to {}",
        table.len(),
        settings.output.display()
    );

    Ok(())
}

/// Run one batch with a progress bar over the counties.
fn run_batch(
    counties: &[GeoPoint],
    targets: &[GeoPoint],
    mode: IndexMode,
    config: &ProximityConfig,
) -> Result<Vec<ProximityResult>> {
    let pb = ProgressBar::new(counties.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} counties")?
            .progress_chars("#>-"),
    );

    let results = index_all_with_progress(counties, targets, mode, config, |_| pb.inc(1));
    pb.finish_and_clear();

    for result in results.iter().take(5) {
        match result {
            ProximityResult::Nearest(n) => info!(
                "  {}: {} ({})",
                n.reference_id,
                n.distance_miles
                    .map(|d| format!("{:.1} mi", d))
                    .unwrap_or_else(|| "no coordinates".to_string()),
                n.matched_label().unwrap_or("-")
            ),
            ProximityResult::RadiusCount(c) => info!("  {}: {}", c.reference_id, c.count),
        }
    }

    Ok(results)
}
