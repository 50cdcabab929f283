//! Configuration module for the typhoon tracker.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::geo::CoordinatePair;
use crate::scheduler::PollSettings;

use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BULLETIN_URL: &str =
    "https://bagong.pagasa.dost.gov.ph/tropical-cyclone/severe-weather-bulletin";
pub const DEFAULT_IMAGE_HOST: &str = "https://pubfiles.pagasa.dost.gov.ph";

/// Manila.
pub const DEFAULT_REFERENCE: CoordinatePair = CoordinatePair {
    latitude: 14.5995,
    longitude: 120.9842,
};

/// Shortest accepted poll interval.
pub const MIN_INTERVAL_MINUTES: u64 = 5;

/// Longest accepted poll interval, one week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Longest accepted fetch timeout.
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Bulletin page to poll
    pub bulletin_url: String,
    /// Host that relative image paths are resolved against
    pub image_host: Url,
    pub reference_latitude: f64,
    pub reference_longitude: f64,
    /// Poll interval while a cyclone is being tracked (default: 30)
    pub base_interval_minutes: u64,
    /// Stretch the interval while nothing is active (default: true)
    pub smart_polling_enabled: bool,
    /// Poll interval while no cyclone is active (default: 120)
    pub idle_interval_minutes: u64,
    /// Cyclones farther than this count as idle, when set
    pub near_distance_km: Option<f64>,
    /// Bulletin fetch timeout (default: 10)
    pub fetch_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            bulletin_url: DEFAULT_BULLETIN_URL.to_string(),
            image_host: Url::parse(DEFAULT_IMAGE_HOST).expect("default image host is a valid URL"),
            reference_latitude: DEFAULT_REFERENCE.latitude,
            reference_longitude: DEFAULT_REFERENCE.longitude,
            base_interval_minutes: 30,
            smart_polling_enabled: true,
            idle_interval_minutes: 120,
            near_distance_km: None,
            fetch_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TYPHOON_HTTP_PORT`: HTTP port (default: 8080)
    /// - `TYPHOON_BULLETIN_URL`: bulletin page URL
    /// - `TYPHOON_IMAGE_HOST`: base URL for relative image paths
    /// - `TYPHOON_REFERENCE_LAT`, `TYPHOON_REFERENCE_LON`: reference point (default: Manila)
    /// - `TYPHOON_POLL_INTERVAL_MINUTES`: base interval (default: 30, minimum 5)
    /// - `TYPHOON_SMART_POLLING`: adaptive interval on/off (default: true)
    /// - `TYPHOON_IDLE_INTERVAL_MINUTES`: idle interval (default: 120)
    /// - `TYPHOON_NEAR_DISTANCE_KM`: distance beyond which a cyclone counts as idle
    /// - `TYPHOON_FETCH_TIMEOUT_SECS`: fetch timeout (default: 10)
    pub fn load() -> Self {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn load_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port) = parse_var(&lookup, "TYPHOON_HTTP_PORT") {
            cfg.http_port = port;
        }

        if let Some(url) = parse_var::<Url, _>(&lookup, "TYPHOON_BULLETIN_URL") {
            cfg.bulletin_url = url.to_string();
        }

        if let Some(host) = parse_var(&lookup, "TYPHOON_IMAGE_HOST") {
            cfg.image_host = host;
        }

        let lat = parse_var(&lookup, "TYPHOON_REFERENCE_LAT").unwrap_or(cfg.reference_latitude);
        let lon = parse_var(&lookup, "TYPHOON_REFERENCE_LON").unwrap_or(cfg.reference_longitude);
        match CoordinatePair::new(lat, lon) {
            Some(point) => {
                cfg.reference_latitude = point.latitude;
                cfg.reference_longitude = point.longitude;
            }
            None => tracing::warn!(
                "Reference point ({}, {}) is out of range, using default",
                lat,
                lon
            ),
        }

        if let Some(minutes) = parse_var(&lookup, "TYPHOON_POLL_INTERVAL_MINUTES") {
            cfg.base_interval_minutes = minutes;
        }
        cfg.base_interval_minutes = clamp_max(
            "TYPHOON_POLL_INTERVAL_MINUTES",
            cfg.base_interval_minutes.max(MIN_INTERVAL_MINUTES),
            MAX_INTERVAL_MINUTES,
        );

        if let Some(raw) = lookup("TYPHOON_SMART_POLLING") {
            match parse_bool(&raw) {
                Some(enabled) => cfg.smart_polling_enabled = enabled,
                None => tracing::warn!("Ignoring TYPHOON_SMART_POLLING={:?}", raw),
            }
        }

        if let Some(minutes) = parse_var(&lookup, "TYPHOON_IDLE_INTERVAL_MINUTES") {
            cfg.idle_interval_minutes = minutes;
        }
        cfg.idle_interval_minutes = clamp_max(
            "TYPHOON_IDLE_INTERVAL_MINUTES",
            cfg.idle_interval_minutes,
            MAX_INTERVAL_MINUTES,
        )
        .max(cfg.base_interval_minutes);

        if let Some(km) = parse_var::<f64, _>(&lookup, "TYPHOON_NEAR_DISTANCE_KM") {
            if km.is_finite() && km > 0.0 {
                cfg.near_distance_km = Some(km);
            } else {
                tracing::warn!("Ignoring non-positive TYPHOON_NEAR_DISTANCE_KM={}", km);
            }
        }

        if let Some(secs) = parse_var(&lookup, "TYPHOON_FETCH_TIMEOUT_SECS") {
            cfg.fetch_timeout_secs = secs;
        }
        cfg.fetch_timeout_secs = clamp_max(
            "TYPHOON_FETCH_TIMEOUT_SECS",
            cfg.fetch_timeout_secs.max(1),
            MAX_FETCH_TIMEOUT_SECS,
        );

        cfg
    }

    /// The reference point distances are measured from.
    pub fn reference_point(&self) -> CoordinatePair {
        CoordinatePair::new(self.reference_latitude, self.reference_longitude)
            .unwrap_or(DEFAULT_REFERENCE)
    }

    /// Settings for the poll coordinator.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            bulletin_url: self.bulletin_url.clone(),
            image_host: self.image_host.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            reference_point: self.reference_point(),
            base_interval: Duration::from_secs(self.base_interval_minutes.saturating_mul(60)),
            idle_interval: Duration::from_secs(self.idle_interval_minutes.saturating_mul(60)),
            smart_polling_enabled: self.smart_polling_enabled,
            near_distance_km: self.near_distance_km,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

fn clamp_max(key: &str, value: u64, max: u64) -> u64 {
    if value > max {
        tracing::warn!("{}={} is above the maximum, using {}", key, value, max);
        max
    } else {
        value
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::load_from(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.bulletin_url, DEFAULT_BULLETIN_URL);
        assert_eq!(cfg.base_interval_minutes, 30);
        assert_eq!(cfg.idle_interval_minutes, 120);
        assert!(cfg.smart_polling_enabled);
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert_eq!(cfg.reference_point(), DEFAULT_REFERENCE);
    }

    #[test]
    fn test_load_overrides() {
        let cfg = load(&[
            ("TYPHOON_HTTP_PORT", "9090"),
            ("TYPHOON_REFERENCE_LAT", "10.3157"),
            ("TYPHOON_REFERENCE_LON", "123.8854"),
            ("TYPHOON_POLL_INTERVAL_MINUTES", "15"),
            ("TYPHOON_SMART_POLLING", "off"),
            ("TYPHOON_IDLE_INTERVAL_MINUTES", "60"),
            ("TYPHOON_NEAR_DISTANCE_KM", "800"),
        ]);
        assert_eq!(cfg.http_port, 9090);
        assert_eq!(cfg.reference_latitude, 10.3157);
        assert_eq!(cfg.reference_longitude, 123.8854);
        assert_eq!(cfg.base_interval_minutes, 15);
        assert!(!cfg.smart_polling_enabled);
        assert_eq!(cfg.idle_interval_minutes, 60);
        assert_eq!(cfg.near_distance_km, Some(800.0));
    }

    #[test]
    fn test_load_ignores_invalid_values() {
        let cfg = load(&[
            ("TYPHOON_HTTP_PORT", "not-a-port"),
            ("TYPHOON_REFERENCE_LAT", "123.0"),
            ("TYPHOON_SMART_POLLING", "maybe"),
            ("TYPHOON_IMAGE_HOST", "::nope::"),
            ("TYPHOON_NEAR_DISTANCE_KM", "-5"),
        ]);
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.reference_point(), DEFAULT_REFERENCE);
        assert!(cfg.smart_polling_enabled);
        assert_eq!(cfg.image_host.as_str(), "https://pubfiles.pagasa.dost.gov.ph/");
        assert!(cfg.near_distance_km.is_none());
    }

    #[test]
    fn test_intervals_are_clamped() {
        let cfg = load(&[
            ("TYPHOON_POLL_INTERVAL_MINUTES", "1"),
            ("TYPHOON_IDLE_INTERVAL_MINUTES", "2"),
            ("TYPHOON_FETCH_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(cfg.base_interval_minutes, MIN_INTERVAL_MINUTES);
        assert_eq!(cfg.idle_interval_minutes, MIN_INTERVAL_MINUTES);
        assert_eq!(cfg.fetch_timeout_secs, 1);

        let settings = cfg.poll_settings();
        assert_eq!(settings.base_interval, Duration::from_secs(300));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_oversized_values_are_capped() {
        let huge = u64::MAX.to_string();
        let cfg = load(&[
            ("TYPHOON_POLL_INTERVAL_MINUTES", huge.as_str()),
            ("TYPHOON_IDLE_INTERVAL_MINUTES", huge.as_str()),
            ("TYPHOON_FETCH_TIMEOUT_SECS", huge.as_str()),
        ]);
        assert_eq!(cfg.base_interval_minutes, MAX_INTERVAL_MINUTES);
        assert_eq!(cfg.idle_interval_minutes, MAX_INTERVAL_MINUTES);
        assert_eq!(cfg.fetch_timeout_secs, MAX_FETCH_TIMEOUT_SECS);

        let settings = cfg.poll_settings();
        assert_eq!(settings.base_interval, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(settings.idle_interval, settings.base_interval);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(300));
    }
}
