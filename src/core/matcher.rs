use crate::core::scoring::{calculate_match_score, PreferenceWeight};
use crate::models::{
    Coordinate, DonationMatch, RecipientMatch, RecipientPreferenceDetail, ScoringWeights,
};
use crate::services::{Storage, StorageError};
use std::collections::HashSet;
use thiserror::Error;

/// Default search radius when the caller does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Errors from the matching orchestrator.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The anchor recipient does not exist. A recipient without a location
    /// is not an error; it yields an empty result.
    #[error("recipient {0} not found")]
    RecipientNotFound(i32),

    /// The anchor donation does not exist.
    #[error("donation {0} not found")]
    DonationNotFound(i32),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Matching orchestrator for the two symmetric lookups: donations for a
/// recipient and recipients for a donation.
///
/// # Pipeline
/// 1. Load the anchor; missing anchor is an error, missing location an
///    empty success.
/// 2. Load the anchor's preferences (recipient) or attributes (donation).
/// 3. Fetch in-radius candidates from storage, nearest first.
/// 4. Score each candidate against the anchor's attribute profile.
/// 5. Stable sort by score descending; ties keep proximity order.
///
/// Stateless apart from the configured weights; safe to share across
/// requests.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Find available donations within `radius_km` of the recipient, ranked
    /// by match score.
    ///
    /// When the recipient has no preferences, every in-radius donation is
    /// returned with a zero score in proximity order.
    pub async fn matching_donations_for_recipient(
        &self,
        storage: &dyn Storage,
        recipient_id: i32,
        radius_km: f64,
    ) -> Result<Vec<DonationMatch>, MatchError> {
        let recipient = storage
            .get_recipient(recipient_id)
            .await?
            .ok_or(MatchError::RecipientNotFound(recipient_id))?;

        let Some(anchor) = recipient.coordinate() else {
            return Ok(Vec::new());
        };

        let preferences = preference_weights(&storage.get_recipient_preferences(recipient_id).await?);

        let candidates = storage
            .get_nearby_donations(anchor.latitude, anchor.longitude, radius_km)
            .await?;

        if candidates.is_empty() || preferences.is_empty() {
            return Ok(candidates
                .into_iter()
                .map(|donation| {
                    let distance_km = candidate_distance(anchor, donation.coordinate());
                    DonationMatch { donation, match_score: 0, distance_km }
                })
                .collect());
        }

        let mut matches = Vec::with_capacity(candidates.len());
        for donation in candidates {
            let attribute_ids: HashSet<i32> = storage
                .get_donation_attributes(donation.id)
                .await?
                .iter()
                .map(|detail| detail.association.attribute_id)
                .collect();

            let distance_km = candidate_distance(anchor, donation.coordinate());
            let match_score = calculate_match_score(
                distance_km,
                radius_km,
                &attribute_ids,
                &preferences,
                &self.weights,
            );

            matches.push(DonationMatch { donation, match_score, distance_km });
        }

        // Stable sort keeps proximity order among equal scores
        matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        Ok(matches)
    }

    /// Find recipients within `radius_km` of the donation, ranked by match
    /// score.
    ///
    /// When the donation has no attributes recorded, every in-radius
    /// recipient is returned with a zero score in proximity order.
    pub async fn matching_recipients_for_donation(
        &self,
        storage: &dyn Storage,
        donation_id: i32,
        radius_km: f64,
    ) -> Result<Vec<RecipientMatch>, MatchError> {
        let donation = storage
            .get_donation(donation_id)
            .await?
            .ok_or(MatchError::DonationNotFound(donation_id))?;

        let Some(anchor) = donation.coordinate() else {
            return Ok(Vec::new());
        };

        let attribute_ids: HashSet<i32> = storage
            .get_donation_attributes(donation_id)
            .await?
            .iter()
            .map(|detail| detail.association.attribute_id)
            .collect();

        let candidates = storage
            .get_nearby_recipients(anchor.latitude, anchor.longitude, radius_km)
            .await?;

        if candidates.is_empty() || attribute_ids.is_empty() {
            return Ok(candidates
                .into_iter()
                .map(|recipient| {
                    let distance_km = candidate_distance(anchor, recipient.coordinate());
                    RecipientMatch { recipient, match_score: 0, distance_km }
                })
                .collect());
        }

        let mut matches = Vec::with_capacity(candidates.len());
        for recipient in candidates {
            let preferences =
                preference_weights(&storage.get_recipient_preferences(recipient.id).await?);

            let distance_km = candidate_distance(anchor, recipient.coordinate());
            let match_score = calculate_match_score(
                distance_km,
                radius_km,
                &attribute_ids,
                &preferences,
                &self.weights,
            );

            matches.push(RecipientMatch { recipient, match_score, distance_km });
        }

        matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        Ok(matches)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn preference_weights(details: &[RecipientPreferenceDetail]) -> Vec<PreferenceWeight> {
    details
        .iter()
        .map(|detail| PreferenceWeight {
            attribute_id: detail.preference.attribute_id,
            importance: detail.preference.importance,
        })
        .collect()
}

/// Storage returns only located candidates; a candidate somehow missing its
/// coordinate maps to an out-of-radius distance.
fn candidate_distance(anchor: Coordinate, candidate: Option<Coordinate>) -> f64 {
    candidate.map_or(f64::MAX, |coordinate| anchor.distance_km(coordinate))
}
