//! Per-reference-point query results.

use serde::Serialize;

/// Nearest target for one reference point.
///
/// `distance_miles` and the matched fields are `None` when the reference was
/// partial or no target had a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestMatchResult {
    pub reference_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
}

impl NearestMatchResult {
    /// A result with no distance and no match.
    pub fn absent(reference_id: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            distance_miles: None,
            matched_id: None,
            matched_name: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.distance_miles.is_none()
    }

    /// Display label for the match: the target name if it has one, else its id.
    pub fn matched_label(&self) -> Option<&str> {
        self.matched_name.as_deref().or(self.matched_id.as_deref())
    }
}

/// Number of targets within a radius of one reference point.
///
/// Always an integer: a partial reference counts 0, never "missing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadiusCountResult {
    pub reference_id: String,
    pub count: usize,
}

/// Output of a batch run, one per reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProximityResult {
    Nearest(NearestMatchResult),
    RadiusCount(RadiusCountResult),
}

impl ProximityResult {
    pub fn reference_id(&self) -> &str {
        match self {
            ProximityResult::Nearest(r) => &r.reference_id,
            ProximityResult::RadiusCount(r) => &r.reference_id,
        }
    }

    pub fn as_nearest(&self) -> Option<&NearestMatchResult> {
        match self {
            ProximityResult::Nearest(r) => Some(r),
            ProximityResult::RadiusCount(_) => None,
        }
    }

    pub fn as_radius_count(&self) -> Option<&RadiusCountResult> {
        match self {
            ProximityResult::RadiusCount(r) => Some(r),
            ProximityResult::Nearest(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_result() {
        let r = NearestMatchResult::absent("06037");
        assert!(r.is_absent());
        assert!(r.matched_label().is_none());
    }

    #[test]
    fn test_matched_label_prefers_name() {
        let mut r = NearestMatchResult::absent("06037");
        r.distance_miles = Some(12.0);
        r.matched_id = Some("jotr".to_string());
        assert_eq!(r.matched_label(), Some("jotr"));
        r.matched_name = Some("Joshua Tree".to_string());
        assert_eq!(r.matched_label(), Some("Joshua Tree"));
    }

    #[test]
    fn test_serialize_tagged() {
        let r = ProximityResult::RadiusCount(RadiusCountResult {
            reference_id: "01001".to_string(),
            count: 0,
        });
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["kind"], "radius_count");
        assert_eq!(json["count"], 0);
        assert_eq!(r.reference_id(), "01001");
    }
}
