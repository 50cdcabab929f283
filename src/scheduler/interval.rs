//! Adaptive poll interval.

use crate::geo::CoordinatePair;
use crate::selection::SelectionResult;

use std::time::Duration;
use url::Url;

/// Settings for the poll coordinator and its background loop.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub bulletin_url: String,
    pub image_host: Url,
    pub fetch_timeout: Duration,
    pub reference_point: CoordinatePair,
    pub base_interval: Duration,
    pub idle_interval: Duration,
    pub smart_polling_enabled: bool,
    pub near_distance_km: Option<f64>,
}

/// Wait before the next scheduled cycle, given the record it just produced.
pub fn next_interval(settings: &PollSettings, record: &SelectionResult) -> Duration {
    if !settings.smart_polling_enabled {
        return settings.base_interval;
    }
    if !record.is_detected() {
        return settings.idle_interval;
    }

    match (settings.near_distance_km, record.distance_km) {
        (Some(near), Some(d)) if d > near => settings.idle_interval,
        _ => settings.base_interval,
    }
}
