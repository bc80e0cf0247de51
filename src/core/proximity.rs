use crate::models::{Coordinate, Donation, Recipient};

/// An entity that may carry a location.
///
/// Entities without a coordinate are excluded from proximity results, never
/// treated as an error.
pub trait Locatable {
    fn coordinate(&self) -> Option<Coordinate>;
}

impl Locatable for Donation {
    fn coordinate(&self) -> Option<Coordinate> {
        Donation::coordinate(self)
    }
}

impl Locatable for Recipient {
    fn coordinate(&self) -> Option<Coordinate> {
        Recipient::coordinate(self)
    }
}

/// Filter candidates down to those within `radius_km` of `center`,
/// nearest first.
///
/// Candidates with no coordinate are dropped. A radius of zero keeps only
/// exact-coincident points. Status eligibility (e.g. only `Available`
/// donations) is the candidate supplier's responsibility.
pub fn within_radius<T: Locatable>(center: Coordinate, radius_km: f64, candidates: Vec<T>) -> Vec<T> {
    let mut located: Vec<(T, f64)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let coordinate = candidate.coordinate()?;
            let distance = center.distance_km(coordinate);
            (distance <= radius_km).then_some((candidate, distance))
        })
        .collect();

    located.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    located.into_iter().map(|(candidate, _)| candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DonationStatus;
    use chrono::Utc;

    fn donation_at(id: i32, lat: Option<f64>, lon: Option<f64>) -> Donation {
        Donation {
            id,
            donor_id: 1,
            recipient_id: None,
            title: format!("Donation {}", id),
            description: None,
            food_type: "Vegetarian".to_string(),
            quantity: "10 servings".to_string(),
            status: DonationStatus::Available,
            expiry_date: None,
            tracking_id: format!("track-{}", id),
            latitude: lat,
            longitude: lon,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn center() -> Coordinate {
        Coordinate { latitude: 12.8230, longitude: 80.0444 }
    }

    #[test]
    fn test_within_radius_excludes_far_points() {
        let candidates = vec![
            donation_at(1, Some(12.8231), Some(80.0442)), // ~0.02 km
            donation_at(2, Some(12.9568), Some(80.0444)), // ~15 km north
        ];

        let result = within_radius(center(), 10.0, candidates);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn test_within_radius_excludes_missing_coordinates() {
        let candidates = vec![
            donation_at(1, Some(12.8231), Some(80.0442)),
            donation_at(2, None, None),
            donation_at(3, Some(12.8230), None),
        ];

        let result = within_radius(center(), 10.0, candidates);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn test_within_radius_sorts_nearest_first() {
        let candidates = vec![
            donation_at(1, Some(12.8600), Some(80.0444)), // ~4 km
            donation_at(2, Some(12.8231), Some(80.0442)), // ~0.02 km
            donation_at(3, Some(12.8400), Some(80.0444)), // ~2 km
        ];

        let result = within_radius(center(), 10.0, candidates);

        let ids: Vec<i32> = result.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_zero_radius_keeps_only_coincident_points() {
        let candidates = vec![
            donation_at(1, Some(12.8230), Some(80.0444)), // exact center
            donation_at(2, Some(12.8231), Some(80.0442)),
        ];

        let result = within_radius(center(), 0.0, candidates);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }
}
