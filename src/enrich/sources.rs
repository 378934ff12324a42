//! Loaders for the county, park and campground inputs.

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use flate2::read::GzDecoder;
use geoprox::models::GeoPoint;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Open a file, transparently gunzipping `.gz` paths.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Left-pad a county GEOID with zeros to five characters.
pub fn pad_geoid(raw: &str) -> String {
    format!("{:0>5}", raw.trim())
}

/// Census gazetteer fields are ISO-8859-1; every byte maps to one char.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn column(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("Column '{}' not found", name))
}

/// Keep a point whose coordinates are out of range as partial, so one bad
/// row never aborts the whole load.
fn point_or_partial(id: String, lat: &str, lon: &str) -> GeoPoint {
    match GeoPoint::parse(id.clone(), lat, lon) {
        Ok(point) => point,
        Err(e) => {
            warn!("{}; treating as missing coordinates", e);
            GeoPoint::partial(id)
        }
    }
}

/// Load county centroids from a Census gazetteer file.
///
/// Tab separated, Latin-1 encoded, with padded header names. Uses the
/// `GEOID`, `INTPTLAT` and `INTPTLONG` columns.
pub fn load_gazetteer(path: &Path) -> Result<Vec<GeoPoint>> {
    info!("Loading county coordinates from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(open_input(path)?);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| latin1(h).trim().to_string())
        .collect();
    let geoid_idx = column(&headers, "GEOID")?;
    let lat_idx = column(&headers, "INTPTLAT")?;
    let lon_idx = column(&headers, "INTPTLONG")?;

    let mut counties = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let field = |i: usize| record.get(i).map(latin1).unwrap_or_default();
        let geoid = field(geoid_idx);
        if geoid.trim().is_empty() {
            continue;
        }
        counties.push(point_or_partial(
            pad_geoid(&geoid),
            &field(lat_idx),
            &field(lon_idx),
        ));
    }

    let missing = counties.iter().filter(|c| c.is_partial()).count();
    info!(
        "Loaded {} counties from gazetteer ({} without coordinates)",
        counties.len(),
        missing
    );
    Ok(counties)
}

/// Load national parks from a CSV with `Name`, `Lat` and `Lon` columns.
///
/// The park name doubles as its identifier.
pub fn load_parks(path: &Path) -> Result<Vec<GeoPoint>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(open_input(path)?);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let name_idx = column(&headers, "Name")?;
    let lat_idx = column(&headers, "Lat")?;
    let lon_idx = column(&headers, "Lon")?;

    let mut parks = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = record.get(name_idx).unwrap_or_default().to_string();
        let lat = record.get(lat_idx).unwrap_or_default();
        let lon = record.get(lon_idx).unwrap_or_default();
        parks.push(point_or_partial(name.clone(), lat, lon).with_name(name));
    }

    info!("Loaded {} national parks", parks.len());
    Ok(parks)
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl OverpassElement {
    /// Node position, or the computed center for ways and relations.
    fn position(&self) -> Option<(f64, f64)> {
        let (lat, lon) = match (self.lat, &self.center) {
            (Some(lat), _) => (Some(lat), self.lon),
            (None, Some(center)) => (center.lat, center.lon),
            (None, None) => (None, None),
        };
        // A zero coordinate marks a missing value in these exports
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Load campgrounds from a saved Overpass API response (`out center;`).
///
/// Elements without a usable position are dropped.
pub fn load_campgrounds(path: &Path) -> Result<Vec<GeoPoint>> {
    info!("Loading campgrounds from {}", path.display());

    let response: OverpassResponse = serde_json::from_reader(open_input(path)?)
        .with_context(|| format!("Failed to parse Overpass JSON in {}", path.display()))?;
    let total = response.elements.len();

    let campgrounds: Vec<GeoPoint> = response
        .elements
        .into_iter()
        .filter_map(|el| {
            let (lat, lon) = el.position()?;
            let id = format!("{}/{}", el.kind, el.id);
            match GeoPoint::new(id, lat, lon) {
                Ok(point) => Some(match el.tags.get("name") {
                    Some(name) => point.with_name(name.clone()),
                    None => point,
                }),
                Err(e) => {
                    debug!("Skipping campground: {}", e);
                    None
                }
            }
        })
        .collect();

    info!(
        "Processed {} valid campground locations out of {} elements",
        campgrounds.len(),
        total
    );
    Ok(campgrounds)
}
