//! Location resolution and great-circle distance
//!
//! Place names are resolved against a closed static table; unknown names get
//! the `(0, 0)` sentinel instead of an error, which degrades distance-based
//! matching but never crashes a turn. Resolution lives behind [`resolve`] so
//! a strict mode (fail instead of defaulting) would be a one-place change.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Sentinel for place names the resolver does not know
    pub const UNKNOWN: Coordinates = Coordinates { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether this is the unknown-place sentinel
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

/// Known place names and their coordinates
///
/// Stands in for a geocoding service; the table is intentionally closed.
const PLACE_TABLE: &[(&str, Coordinates)] = &[
    ("台北車站", Coordinates { lat: 25.0478, lon: 121.5170 }),
    ("松山機場", Coordinates { lat: 25.0634, lon: 121.5520 }),
    ("台大", Coordinates { lat: 25.0169, lon: 121.5346 }),
];

/// Resolve a place name to coordinates
///
/// Unknown names resolve to [`Coordinates::UNKNOWN`]. Pure and deterministic.
pub fn resolve(name: &str) -> Coordinates {
    PLACE_TABLE
        .iter()
        .find(|(place, _)| *place == name)
        .map(|(_, coord)| *coord)
        .unwrap_or(Coordinates::UNKNOWN)
}

/// Great-circle distance between two coordinates in kilometers (haversine)
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_place() {
        let coord = resolve("台北車站");
        assert_eq!(coord, Coordinates::new(25.0478, 121.5170));
        assert!(!coord.is_unknown());
    }

    #[test]
    fn test_resolve_unknown_place_is_sentinel() {
        let coord = resolve("Mars Base");
        assert_eq!(coord, Coordinates::UNKNOWN);
        assert!(coord.is_unknown());
    }

    #[test]
    fn test_resolve_empty_name_is_sentinel() {
        assert!(resolve("").is_unknown());
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let coord = resolve("台大");
        assert!(distance_km(coord, coord) < 1e-9);
    }

    #[test]
    fn test_distance_station_to_airport() {
        // 台北車站 -> 松山機場 is roughly 3.9 km great-circle
        let d = distance_km(resolve("台北車站"), resolve("松山機場"));
        assert!((d - 3.93).abs() < 0.05, "distance was {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = resolve("台北車站");
        let b = resolve("台大");
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_sentinel_distance_is_large() {
        // A real Taipei origin against the sentinel lands in the Gulf of
        // Guinea, thousands of kilometers away. Documented limitation.
        let d = distance_km(resolve("台北車站"), Coordinates::UNKNOWN);
        assert!(d > 10_000.0);
    }
}
