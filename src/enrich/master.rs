//! The per-county master table the proximity columns are joined onto.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use geoprox::models::{GeoPoint, NearestMatchResult, RadiusCountResult};
use hashbrown::HashMap;
use std::path::Path;
use tracing::info;

use crate::sources::{open_input, pad_geoid};

pub const GEOID_COLUMN: &str = "GeoID";
pub const LAT_COLUMN: &str = "County_Lat";
pub const LON_COLUMN: &str = "County_Lon";
pub const DISTANCE_COLUMN: &str = "Distance_to_Park_Miles";
pub const NEAREST_COLUMN: &str = "Nearest_Park";

/// A CSV table held in memory as text.
#[derive(Debug, Clone)]
pub struct MasterTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    geoid_idx: usize,
}

impl MasterTable {
    /// Read the master CSV. GeoIDs are zero-padded to five characters.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(open_input(path)?);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let Some(geoid_idx) = headers.iter().position(|h| h == GEOID_COLUMN) else {
            bail!("Column '{}' not found in {}", GEOID_COLUMN, path.display());
        };

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.with_context(|| format!("Failed to read {}", path.display()))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            row[geoid_idx] = pad_geoid(&row[geoid_idx]);
            rows.push(row);
        }

        info!("Loaded {} counties from master dataset", rows.len());
        Ok(Self {
            headers,
            rows,
            geoid_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn geoids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[self.geoid_idx].as_str())
    }

    /// Left join against the gazetteer: one reference point per row, in row
    /// order. Rows with no gazetteer entry become partial points.
    pub fn reference_points(&self, gazetteer: &[GeoPoint]) -> Vec<GeoPoint> {
        let by_geoid: HashMap<&str, &GeoPoint> =
            gazetteer.iter().map(|p| (p.id.as_str(), p)).collect();

        let points: Vec<GeoPoint> = self
            .geoids()
            .map(|geoid| match by_geoid.get(geoid) {
                Some(point) => (*point).clone(),
                None => GeoPoint::partial(geoid),
            })
            .collect();

        let missing = points.iter().filter(|p| p.is_partial()).count();
        info!("Merged coordinates. Missing coords: {}", missing);
        points
    }

    /// Replace a column's values, appending the column if it is new.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.headers.iter().position(|h| h == name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn set_coordinates(&mut self, references: &[GeoPoint]) {
        let coords: Vec<_> = references.iter().map(GeoPoint::coordinate).collect();
        self.set_column(
            LAT_COLUMN,
            coords.iter().map(|c| fmt_opt(c.map(|c| c.lat()))).collect(),
        );
        self.set_column(
            LON_COLUMN,
            coords.iter().map(|c| fmt_opt(c.map(|c| c.lon()))).collect(),
        );
    }

    pub fn set_nearest(&mut self, results: &[NearestMatchResult]) {
        self.set_column(
            DISTANCE_COLUMN,
            results.iter().map(|r| fmt_opt(r.distance_miles)).collect(),
        );
        self.set_column(
            NEAREST_COLUMN,
            results
                .iter()
                .map(|r| r.matched_label().unwrap_or_default().to_string())
                .collect(),
        );
    }

    pub fn set_counts(&mut self, column: &str, results: &[RadiusCountResult]) {
        self.set_column(column, results.iter().map(|r| r.count.to_string()).collect());
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
