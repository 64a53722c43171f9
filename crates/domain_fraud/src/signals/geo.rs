//! Distance between free-text addresses using a static gazetteer

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use super::GeoDistance;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// (name, latitude, longitude)
const KNOWN_PLACES: &[(&str, f64, f64)] = &[
    ("new york", 40.7128, -74.0060),
    ("nyc", 40.7128, -74.0060),
    ("manhattan", 40.7831, -73.9712),
    ("brooklyn", 40.6782, -73.9442),
    ("jersey city", 40.7178, -74.0431),
    ("newark", 40.7357, -74.1724),
    ("philadelphia", 39.9526, -75.1652),
    ("boston", 42.3601, -71.0589),
    ("washington, dc", 38.9072, -77.0369),
    ("washington dc", 38.9072, -77.0369),
    ("washington, d.c.", 38.9072, -77.0369),
    ("chicago", 41.8781, -87.6298),
    ("houston", 29.7604, -95.3698),
    ("dallas", 32.7767, -96.7970),
    ("san antonio", 29.4241, -98.4936),
    ("phoenix", 33.4484, -112.0740),
    ("denver", 39.7392, -104.9903),
    ("atlanta", 33.7490, -84.3880),
    ("miami", 25.7617, -80.1918),
    ("seattle", 47.6062, -122.3321),
    ("san francisco", 37.7749, -122.4194),
    ("los angeles", 34.0522, -118.2437),
    ("san diego", 32.7157, -117.1611),
    ("las vegas", 36.1699, -115.1398),
];

/// Resolves addresses against a fixed table of known cities
///
/// Comma-separated parts are tried left to right, so the city in
/// "Seattle, Washington" wins over anything named later. Within a part the
/// longest known name wins ("Jersey City" over "New York"). Names that span a
/// comma, such as "Washington, DC", are matched against the whole address
/// last. Unknown addresses yield `None`.
#[derive(Debug, Clone, Default)]
pub struct GazetteerGeoDistance;

impl GazetteerGeoDistance {
    pub fn new() -> Self {
        Self
    }

    fn resolve(address: &str) -> Option<(f64, f64)> {
        let normalized = address.to_lowercase();
        normalized
            .split(',')
            .find_map(longest_place_in)
            .or_else(|| longest_place_in(&normalized))
    }
}

impl DomainPort for GazetteerGeoDistance {}

#[async_trait]
impl GeoDistance for GazetteerGeoDistance {
    async fn distance(&self, from: &str, to: &str) -> Result<Option<f64>, PortError> {
        Ok(match (Self::resolve(from), Self::resolve(to)) {
            (Some(a), Some(b)) => Some(haversine_miles(a, b)),
            _ => None,
        })
    }
}

fn longest_place_in(text: &str) -> Option<(f64, f64)> {
    KNOWN_PLACES
        .iter()
        .filter(|(name, _, _)| text.contains(name))
        .max_by_key(|(name, _, _)| name.len())
        .map(|(_, lat, lon)| (*lat, *lon))
}

/// Great-circle distance between two (lat, lon) points in miles
pub fn haversine_miles((lat1, lon1): (f64, f64), (lat2, lon2): (f64, f64)) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_coast_to_coast_distance() {
        let miles = GazetteerGeoDistance::new()
            .distance("Los Angeles, CA", "New York, NY")
            .await
            .unwrap()
            .unwrap();
        assert!((2400.0..2500.0).contains(&miles), "got {miles}");
    }

    #[tokio::test]
    async fn test_same_city_is_zero() {
        let miles = GazetteerGeoDistance::new()
            .distance("5th Ave, New York", "New York, NY")
            .await
            .unwrap();
        assert_eq!(miles, Some(0.0));
    }

    #[tokio::test]
    async fn test_unknown_address_is_none() {
        let miles = GazetteerGeoDistance::new()
            .distance("Atlantis", "New York, NY")
            .await
            .unwrap();
        assert_eq!(miles, None);
    }

    #[tokio::test]
    async fn test_state_name_does_not_shadow_city() {
        assert_eq!(
            GazetteerGeoDistance::resolve("Seattle, Washington"),
            Some((47.6062, -122.3321))
        );
        let miles = GazetteerGeoDistance::new()
            .distance("Seattle, Washington", "Seattle, WA")
            .await
            .unwrap();
        assert_eq!(miles, Some(0.0));
    }

    #[test]
    fn test_district_of_columbia_resolves() {
        let dc = Some((38.9072, -77.0369));
        assert_eq!(GazetteerGeoDistance::resolve("Washington, DC"), dc);
        assert_eq!(GazetteerGeoDistance::resolve("1600 Pennsylvania Ave, Washington DC"), dc);
        assert_eq!(GazetteerGeoDistance::resolve("Spokane, Washington"), None);
    }

    #[test]
    fn test_longest_match_wins() {
        assert_eq!(
            GazetteerGeoDistance::resolve("Jersey City, across from New York"),
            Some((40.7178, -74.0431))
        );
    }
}
