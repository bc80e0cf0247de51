use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

impl Coordinate {
    /// Great-circle distance to another coordinate, in kilometers.
    #[inline]
    pub fn distance_km(&self, other: Coordinate) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Calculate a bounding box around a center point
///
/// This is much faster than Haversine for pre-filtering candidates; both
/// storage backends constrain on the box before the exact radius check.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    // 1 degree latitude is approximately 111 km
    let lat_delta = radius_km / 111.0;

    // 1 degree longitude varies by latitude
    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lon >= bbox.min_lon && lon <= bbox.max_lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Chennai city centre to SRM Potheri (approximately 40 km)
        let chennai_lat = 13.0827;
        let chennai_lon = 80.2707;
        let potheri_lat = 12.8230;
        let potheri_lon = 80.0444;

        let distance = haversine_distance(chennai_lat, chennai_lon, potheri_lat, potheri_lon);
        assert!(
            distance > 30.0 && distance < 45.0,
            "Distance should be ~40km, got {}",
            distance
        );
    }

    #[test]
    fn test_haversine_identical_points() {
        let distance = haversine_distance(12.8230, 80.0444, 12.8230, 80.0444);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let forward = haversine_distance(12.8230, 80.0444, 13.0827, 80.2707);
        let backward = haversine_distance(13.0827, 80.2707, 12.8230, 80.0444);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_distance_helper() {
        let a = Coordinate { latitude: 12.8230, longitude: 80.0444 };
        let b = Coordinate { latitude: 12.8231, longitude: 80.0442 };

        let distance = a.distance_km(b);
        assert!(distance < 0.05, "Adjacent points should be ~0.02km apart");
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(12.8230, 80.0444, 10.0);

        assert!(bbox.min_lat < 12.8230);
        assert!(bbox.max_lat > 12.8230);
        assert!(bbox.min_lon < 80.0444);
        assert!(bbox.max_lon > 80.0444);

        // Check approximate size (20km / 111km per degree = ~0.18 degrees)
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(12.8230, 80.0444, 10.0);

        // Center point should be within
        assert!(is_within_bounding_box(12.8230, 80.0444, &bbox));

        // Close point should be within
        assert!(is_within_bounding_box(12.83, 80.05, &bbox));

        // Far point should not be within
        assert!(!is_within_bounding_box(13.5, 81.0, &bbox));
    }
}
