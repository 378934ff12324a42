use anyhow::{bail, Context, Result};
use geoprox::proximity::{IndexMode, ProximityConfig, Sphere, Strategy, EARTH_RADIUS_MILES};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Args;

/// Campground search radius used by the county dataset.
pub const DEFAULT_RADIUS_MILES: f64 = 30.0;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub proximity: ProximitySettings,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PathsConfig {
    pub master: Option<PathBuf>,
    pub gazetteer: Option<PathBuf>,
    pub parks: Option<PathBuf>,
    pub campgrounds: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ProximitySettings {
    pub radius_miles: Option<f64>,
    pub earth_radius_miles: Option<f64>,
    pub strategy: Option<Strategy>,
    pub parallel: Option<bool>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

/// Fully resolved run settings: command line, then config file, then defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub master: PathBuf,
    pub gazetteer: PathBuf,
    pub parks: Option<PathBuf>,
    pub campgrounds: Option<PathBuf>,
    pub output: PathBuf,
    pub radius: IndexMode,
    pub radius_miles: f64,
    pub proximity: ProximityConfig,
}

impl Settings {
    pub fn resolve(args: &Args, file: Config) -> Result<Self> {
        let paths = file.paths;
        let prox = file.proximity;

        let Some(master) = args.master.clone().or(paths.master) else {
            bail!("No master dataset given (use --master or [paths].master)");
        };
        let Some(gazetteer) = args.gazetteer.clone().or(paths.gazetteer) else {
            bail!("No gazetteer file given (use --gazetteer or [paths].gazetteer)");
        };
        let parks = args.parks.clone().or(paths.parks);
        let campgrounds = args.campgrounds.clone().or(paths.campgrounds);
        if parks.is_none() && campgrounds.is_none() {
            bail!("Nothing to compute: give a parks file, a campgrounds file, or both");
        }
        let output = args
            .output
            .clone()
            .or(paths.output)
            .unwrap_or_else(|| master.clone());

        let radius_miles = args
            .radius_miles
            .or(prox.radius_miles)
            .unwrap_or(DEFAULT_RADIUS_MILES);
        let radius = IndexMode::within_radius(radius_miles)?;

        let earth_radius = args
            .earth_radius_miles
            .or(prox.earth_radius_miles)
            .unwrap_or(EARTH_RADIUS_MILES);
        if !earth_radius.is_finite() || earth_radius <= 0.0 {
            bail!("Earth radius must be a positive number of miles, got {}", earth_radius);
        }

        let proximity = ProximityConfig {
            sphere: Sphere::new(earth_radius),
            strategy: args.strategy.or(prox.strategy).unwrap_or_default(),
            parallel: !args.sequential && prox.parallel.unwrap_or(true),
        };

        Ok(Self {
            master,
            gazetteer,
            parks,
            campgrounds,
            output,
            radius,
            radius_miles,
            proximity,
        })
    }

    /// Output column for the campground count, e.g. `Campgrounds_Within_30mi`.
    pub fn count_column(&self) -> String {
        format!("Campgrounds_Within_{}mi", self.radius_miles)
    }
}
