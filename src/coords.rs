//! Coordinate parsing and screening.

use crate::{config::BoundingBox, districts::CoordinatePolicy};

/// Parses a coordinate cell. Blank, non-numeric, and non-finite values are unknown.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when both coordinates are known, non-zero, and inside `bbox`.
pub fn is_plausible(latitude: Option<f64>, longitude: Option<f64>, bbox: &BoundingBox) -> bool {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => lat != 0.0 && lng != 0.0 && bbox.contains(lat, lng),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinateValidator {
    policy: CoordinatePolicy,
    bbox: BoundingBox,
}

impl CoordinateValidator {
    pub fn new(policy: CoordinatePolicy, bbox: BoundingBox) -> Self {
        Self { policy, bbox }
    }

    /// Parses both cells. Under [`CoordinatePolicy::BoundingBox`] an
    /// implausible pair is downgraded to unknown; the row itself is kept.
    pub fn validate(&self, latitude: Option<&str>, longitude: Option<&str>) -> (Option<f64>, Option<f64>) {
        let lat = latitude.and_then(parse_coordinate);
        let lng = longitude.and_then(parse_coordinate);
        match self.policy {
            CoordinatePolicy::Trusted => (lat, lng),
            CoordinatePolicy::BoundingBox if is_plausible(lat, lng, &self.bbox) => (lat, lng),
            CoordinatePolicy::BoundingBox => (None, None),
        }
    }
}
