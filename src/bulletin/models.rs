//! Parsed advisory types.

use crate::geo::CoordinatePair;
use serde::Serialize;

/// Placeholder for a heading field that could not be read.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder narrative when a section has no paragraph text.
pub const NO_DETAILS: &str = "No details available";

/// One cyclone advisory as read from a bulletin section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryRecord {
    pub name: String,
    pub classification: String,
    /// Sections without coordinates never become candidates.
    pub coordinates: Option<CoordinatePair>,
    pub details: String,
    pub movement: Option<String>,
    /// km/h
    pub sustained_winds: Option<u32>,
    /// km/h
    pub gustiness: Option<u32>,
    pub image_url: Option<String>,
    pub advisory_time: Option<String>,
    pub next_advisory_time: Option<String>,
}

impl Default for AdvisoryRecord {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            classification: UNKNOWN.to_string(),
            coordinates: None,
            details: NO_DETAILS.to_string(),
            movement: None,
            sustained_winds: None,
            gustiness: None,
            image_url: None,
            advisory_time: None,
            next_advisory_time: None,
        }
    }
}
