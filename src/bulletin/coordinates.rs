//! Coordinate extraction from free-text bulletin fragments.
//!
//! Bulletins state the cyclone position in more than one way. Each format
//! gets its own strategy; strategies are tried in order and the first one
//! yielding a valid pair wins.

use crate::geo::CoordinatePair;
use regex::Regex;
use std::sync::OnceLock;

type Strategy = fn(&str) -> Option<CoordinatePair>;

/// Strategies in priority order.
const STRATEGIES: [Strategy; 2] = [parenthesized_degrees, labeled_lat_lon];

/// Extract a latitude/longitude pair from `text`, if any strategy matches.
pub fn extract_coordinates(text: &str) -> Option<CoordinatePair> {
    STRATEGIES.iter().find_map(|strategy| strategy(text))
}

/// Panel format: `(12.30°N, 123.40°E)`.
pub fn parenthesized_degrees(text: &str) -> Option<CoordinatePair> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\(\s*(?P<lat>[^°()]+?)\s*°\s*N\s*,\s*(?P<lon>[^°()]+?)\s*°\s*E\s*\)").unwrap()
    });

    re.captures_iter(text).find_map(|caps| {
        let lat = caps.name("lat")?.as_str().parse().ok()?;
        let lon = caps.name("lon")?.as_str().parse().ok()?;
        CoordinatePair::new(lat, lon)
    })
}

/// Line format: `Lat: 12.3, Lon: 123.4`.
///
/// Latitude runs from `Lat:` to the next comma; longitude from `Lon:` to the
/// end of the line.
pub fn labeled_lat_lon(text: &str) -> Option<CoordinatePair> {
    text.lines()
        .filter(|line| line.contains("Lat:") && line.contains("Lon:"))
        .find_map(|line| {
            let (_, after_lat) = line.split_once("Lat:")?;
            let (lat, _) = after_lat.split_once(',')?;
            let (_, lon) = line.split_once("Lon:")?;

            let lat = lat.trim().parse().ok()?;
            let lon = lon.trim().parse().ok()?;
            CoordinatePair::new(lat, lon)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_pair(pair: Option<CoordinatePair>, lat: f64, lon: f64) {
        let pair = pair.expect("expected coordinates");
        assert!((pair.latitude - lat).abs() < 1e-9, "lat {}", pair.latitude);
        assert!((pair.longitude - lon).abs() < 1e-9, "lon {}", pair.longitude);
    }

    #[test]
    fn test_parenthesized_format() {
        assert_pair(extract_coordinates("(12.30°N, 123.40°E)"), 12.30, 123.40);
    }

    #[test]
    fn test_parenthesized_format_inside_narrative() {
        let text = "The center of the eye was estimated based on all available data \
                    at 1,035 km East of Eastern Visayas (12.3 °N, 136.1 °E).";
        assert_pair(extract_coordinates(text), 12.3, 136.1);
    }

    #[test]
    fn test_labeled_format() {
        assert_pair(extract_coordinates("Lat: 12.3, Lon: 123.4"), 12.3, 123.4);
    }

    #[test]
    fn test_labeled_format_on_later_line() {
        let text = "Location of center\nLat: 18.75, Lon: 129.1\nMovement: west";
        assert_pair(extract_coordinates(text), 18.75, 129.1);
    }

    #[test]
    fn test_no_coordinates() {
        assert!(extract_coordinates("no coordinates here").is_none());
        assert!(extract_coordinates("").is_none());
    }

    #[test]
    fn test_malformed_primary_falls_through_to_labeled() {
        let text = "(about 12°N, far east°E)\nLat: 12.5, Lon: 125.0";
        assert!(parenthesized_degrees(text).is_none());
        assert_pair(extract_coordinates(text), 12.5, 125.0);
    }

    #[test]
    fn test_malformed_labeled_is_absent() {
        assert!(extract_coordinates("Lat: twelve, Lon: 123.4").is_none());
        assert!(extract_coordinates("Lat: 12.3 Lon: 123.4").is_none());
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(extract_coordinates("(95.0°N, 123.0°E)").is_none());
        assert!(extract_coordinates("Lat: 12.0, Lon: 200.0").is_none());
    }
}
