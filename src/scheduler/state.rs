//! Retained poll state and the published record built from it.

use crate::geo::CoordinatePair;
use crate::selection::SelectionResult;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Longest narrative carried in the published record, in characters.
pub const MAX_PUBLISHED_DETAILS: usize = 255;

/// Distance changes smaller than this count as steady.
const TREND_EPSILON_KM: f64 = 0.5;

/// State retained across poll cycles.
#[derive(Debug, Clone)]
pub struct PollState {
    pub reference_point: CoordinatePair,
    pub last_known_distance: Option<f64>,
    pub current_record: SelectionResult,
    pub last_cycle_succeeded: bool,
    pub last_success: Option<DateTime<Utc>>,
}

impl PollState {
    pub fn new(reference_point: CoordinatePair) -> Self {
        Self {
            reference_point,
            last_known_distance: None,
            current_record: SelectionResult::none_detected(),
            last_cycle_succeeded: false,
            last_success: None,
        }
    }

    /// Merge a successful cycle's selection.
    ///
    /// The outgoing record's distance becomes the last known distance. The
    /// very first observed distance seeds it so it is never absent next to a
    /// present current distance.
    pub fn apply_success(&mut self, selection: SelectionResult, at: DateTime<Utc>) {
        if let Some(previous) = self.current_record.distance_km {
            self.last_known_distance = Some(previous);
        }
        if self.last_known_distance.is_none() {
            self.last_known_distance = selection.distance_km;
        }

        self.current_record = selection;
        self.last_cycle_succeeded = true;
        self.last_success = Some(at);
    }

    /// Record a failed cycle. History in `last_known_distance` is kept.
    pub fn apply_failure(&mut self) {
        self.current_record = SelectionResult::none_detected();
        self.last_cycle_succeeded = false;
    }

    /// Snapshot for presentation.
    pub fn publish(&self) -> PublishedRecord {
        let record = &self.current_record;

        PublishedRecord {
            name: record.name.clone(),
            classification: record.classification.clone(),
            coordinates: record.coordinates,
            details: truncate_details(&record.details, MAX_PUBLISHED_DETAILS),
            movement: record.movement.clone(),
            sustained_winds: record.sustained_winds,
            gustiness: record.gustiness,
            image_url: record.image_url.clone(),
            advisory_time: record.advisory_time.clone(),
            next_advisory_time: record.next_advisory_time.clone(),
            distance_km: record.distance_km.map(round2),
            last_known_distance_km: self.last_known_distance.map(round2),
            distance_trend: DistanceTrend::between(self.last_known_distance, record.distance_km),
            last_cycle_succeeded: self.last_cycle_succeeded,
            last_updated: self.last_success,
        }
    }
}

/// Direction of travel relative to the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceTrend {
    Approaching,
    Receding,
    Steady,
}

impl DistanceTrend {
    pub fn between(last: Option<f64>, current: Option<f64>) -> Option<Self> {
        let delta = current? - last?;
        Some(if delta < -TREND_EPSILON_KM {
            Self::Approaching
        } else if delta > TREND_EPSILON_KM {
            Self::Receding
        } else {
            Self::Steady
        })
    }
}

/// What presentation sees after each cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedRecord {
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
    pub distance_km: Option<f64>,
    pub last_known_distance_km: Option<f64>,
    pub distance_trend: Option<DistanceTrend>,
    pub last_cycle_succeeded: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate_details(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
