//! Nearest-cyclone selection.

use crate::bulletin::AdvisoryRecord;
use crate::geo::{distance, CoordinatePair};
use serde::Serialize;

pub const NO_TYPHOON_NAME: &str = "No typhoon detected";
pub const NO_TYPHOON_CLASSIFICATION: &str = "None";
pub const NO_TYPHOON_DETAILS: &str = "No active typhoon detected";

/// The advisory nearest to the reference point, or the "no cyclone" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub name: String,
    pub classification: String,
    pub coordinates: Option<CoordinatePair>,
    pub details: String,
    pub movement: Option<String>,
    pub sustained_winds: Option<u32>,
    pub gustiness: Option<u32>,
    pub image_url: Option<String>,
    pub advisory_time: Option<String>,
    pub next_advisory_time: Option<String>,
    /// Absent only for the sentinel.
    pub distance_km: Option<f64>,
}

impl SelectionResult {
    /// Sentinel for "no cyclone present".
    pub fn none_detected() -> Self {
        Self {
            name: NO_TYPHOON_NAME.to_string(),
            classification: NO_TYPHOON_CLASSIFICATION.to_string(),
            coordinates: None,
            details: NO_TYPHOON_DETAILS.to_string(),
            movement: None,
            sustained_winds: None,
            gustiness: None,
            image_url: None,
            advisory_time: None,
            next_advisory_time: None,
            distance_km: None,
        }
    }

    fn from_advisory(record: &AdvisoryRecord, distance_km: f64) -> Self {
        Self {
            name: record.name.clone(),
            classification: record.classification.clone(),
            coordinates: record.coordinates,
            details: record.details.clone(),
            movement: record.movement.clone(),
            sustained_winds: record.sustained_winds,
            gustiness: record.gustiness,
            image_url: record.image_url.clone(),
            advisory_time: record.advisory_time.clone(),
            next_advisory_time: record.next_advisory_time.clone(),
            distance_km: Some(distance_km),
        }
    }

    /// True if this is a real cyclone rather than the sentinel.
    pub fn is_detected(&self) -> bool {
        self.name != NO_TYPHOON_NAME
    }
}

/// Pick the candidate nearest to `reference`.
///
/// Ties go to the earliest candidate in document order.
pub fn select_nearest(reference: CoordinatePair, candidates: &[AdvisoryRecord]) -> SelectionResult {
    let mut nearest: Option<(&AdvisoryRecord, f64)> = None;

    for candidate in candidates {
        let Some(coordinates) = candidate.coordinates else {
            continue;
        };
        let d = distance(reference, coordinates);
        if nearest.map_or(true, |(_, best)| d < best) {
            nearest = Some((candidate, d));
        }
    }

    match nearest {
        Some((record, d)) => SelectionResult::from_advisory(record, d),
        None => SelectionResult::none_detected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> CoordinatePair {
        CoordinatePair::new(0.0, 0.0).unwrap()
    }

    fn candidate(name: &str, lat: f64, lon: f64) -> AdvisoryRecord {
        AdvisoryRecord {
            name: name.to_string(),
            classification: "Typhoon".to_string(),
            coordinates: CoordinatePair::new(lat, lon),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_empty_is_sentinel() {
        let result = select_nearest(reference(), &[]);
        assert_eq!(result, SelectionResult::none_detected());
        assert_eq!(result.name, "No typhoon detected");
        assert_eq!(result.classification, "None");
        assert_eq!(result.details, "No active typhoon detected");
        assert!(result.distance_km.is_none());
        assert!(!result.is_detected());
    }

    #[test]
    fn test_select_picks_minimum_distance() {
        // Along the equator one degree is about 111 km
        let far = candidate("FAR", 0.0, 0.9);
        let near = candidate("NEAR", 0.0, 0.45);
        let result = select_nearest(reference(), &[far, near]);

        assert_eq!(result.name, "NEAR");
        assert!(result.is_detected());
        let d = result.distance_km.unwrap();
        assert!((d - 50.04).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_select_tie_keeps_first() {
        let east = candidate("EAST", 0.0, 1.0);
        let west = candidate("WEST", 0.0, -1.0);
        let result = select_nearest(reference(), &[east, west]);
        assert_eq!(result.name, "EAST");
    }

    #[test]
    fn test_select_carries_fields() {
        let mut storm = candidate("OFEL", 1.0, 1.0);
        storm.movement = Some("Westward at 15 km/h".to_string());
        storm.sustained_winds = Some(120);
        storm.gustiness = Some(150);
        let result = select_nearest(reference(), &[storm.clone()]);

        assert_eq!(result.classification, "Typhoon");
        assert_eq!(result.coordinates, storm.coordinates);
        assert_eq!(result.movement, storm.movement);
        assert_eq!(result.sustained_winds, Some(120));
        assert_eq!(result.gustiness, Some(150));
    }
}
