//! Reference and target points.

use geo::Point;

/// Error raised when a coordinate value cannot describe a place on the sphere.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("latitude {lat} for '{id}' is outside [-90, 90]")]
    LatitudeOutOfRange { id: String, lat: f64 },
    #[error("longitude {lon} for '{id}' is outside [-180, 180]")]
    LongitudeOutOfRange { id: String, lon: f64 },
    #[error("radius {0} must be a finite, non-negative number of miles")]
    InvalidRadius(f64),
}

/// A validated latitude/longitude pair in decimal degrees.
///
/// Stored as a `geo::Point` with x = longitude and y = latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate(Point<f64>);

impl Coordinate {
    /// Validate and build a coordinate. `id` is only used for error messages.
    pub fn new(id: &str, lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange {
                id: id.to_string(),
                lat,
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LongitudeOutOfRange {
                id: id.to_string(),
                lon,
            });
        }
        Ok(Self(Point::new(lon, lat)))
    }

    pub fn lat(&self) -> f64 {
        self.0.y()
    }

    pub fn lon(&self) -> f64 {
        self.0.x()
    }

    pub fn point(&self) -> Point<f64> {
        self.0
    }
}

/// A keyed point, e.g. a county centroid or a national park.
///
/// A point without a coordinate is *partial*: it keeps its identifier but
/// never takes part in distance computations.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub id: String,
    pub name: Option<String>,
    coordinate: Option<Coordinate>,
}

impl GeoPoint {
    /// Create a point with a known, in-range coordinate.
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Result<Self, ValidationError> {
        let id = id.into();
        let coordinate = Coordinate::new(&id, lat, lon)?;
        Ok(Self {
            id,
            name: None,
            coordinate: Some(coordinate),
        })
    }

    /// Create a partial point (no coordinate).
    pub fn partial(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            coordinate: None,
        }
    }

    /// Build from possibly-missing values. A missing or NaN value on either
    /// axis gives a partial point; a present value out of range is an error.
    pub fn from_optional(
        id: impl Into<String>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, ValidationError> {
        match (lat.filter(|v| !v.is_nan()), lon.filter(|v| !v.is_nan())) {
            (Some(lat), Some(lon)) => Self::new(id, lat, lon),
            _ => Ok(Self::partial(id)),
        }
    }

    /// Build from raw text fields. Empty or unparseable text counts as missing.
    pub fn parse(id: impl Into<String>, lat: &str, lon: &str) -> Result<Self, ValidationError> {
        Self::from_optional(id, parse_degrees(lat), parse_degrees(lon))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn is_partial(&self) -> bool {
        self.coordinate.is_none()
    }
}

fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_point() {
        let p = GeoPoint::new("17031", 41.85, -87.65).unwrap();
        let c = p.coordinate().unwrap();
        assert_eq!(c.lat(), 41.85);
        assert_eq!(c.lon(), -87.65);
        assert!(!p.is_partial());
    }

    #[test]
    fn test_range_boundaries_are_legal() {
        assert!(GeoPoint::new("n", 90.0, 180.0).is_ok());
        assert!(GeoPoint::new("s", -90.0, -180.0).is_ok());
    }

    #[test]
    fn test_out_of_range_latitude() {
        let err = GeoPoint::new("x", 90.5, 0.0).unwrap_err();
        assert!(matches!(err, ValidationError::LatitudeOutOfRange { .. }));
    }

    #[test]
    fn test_out_of_range_longitude() {
        let err = GeoPoint::new("x", 0.0, -180.01).unwrap_err();
        assert!(matches!(err, ValidationError::LongitudeOutOfRange { .. }));
    }

    #[test]
    fn test_infinity_is_rejected_not_partial() {
        assert!(GeoPoint::from_optional("x", Some(f64::INFINITY), Some(0.0)).is_err());
    }

    #[test]
    fn test_missing_coordinate_is_partial() {
        let p = GeoPoint::from_optional("01001", Some(32.5), None).unwrap();
        assert!(p.is_partial());
        assert_eq!(p.id, "01001");

        let p = GeoPoint::from_optional("01001", Some(f64::NAN), Some(-86.6)).unwrap();
        assert!(p.is_partial());
    }

    #[test]
    fn test_parse_text() {
        let p = GeoPoint::parse("01001", " 32.532237", "-86.64644 ").unwrap();
        assert!((p.coordinate().unwrap().lat() - 32.532237).abs() < 1e-12);

        assert!(GeoPoint::parse("01001", "", "-86.6").unwrap().is_partial());
        assert!(GeoPoint::parse("01001", "n/a", "-86.6").unwrap().is_partial());
        assert!(GeoPoint::parse("01001", "123.0", "-86.6").is_err());
    }

    #[test]
    fn test_with_name() {
        let p = GeoPoint::new("yell", 44.6, -110.5)
            .unwrap()
            .with_name("Yellowstone");
        assert_eq!(p.name.as_deref(), Some("Yellowstone"));
    }
}
