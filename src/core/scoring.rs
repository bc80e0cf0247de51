use crate::models::ScoringWeights;
use std::collections::HashSet;

/// A recipient preference reduced to what the scorer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceWeight {
    pub attribute_id: i32,
    pub importance: i32,
}

/// Calculate a match score (0-100) for a candidate.
///
/// Scoring formula:
/// ```text
/// distance_score   = max(0, 100 * (1 - distance_km / radius_km))
/// preference_score = achieved_importance / max_possible_importance * 100
/// match_score      = round(distance_score * 0.4 + preference_score * 0.6)
/// ```
/// Each preference's importance always counts toward the possible total and
/// counts toward the achieved total only when the candidate carries that
/// attribute.
///
/// When the preference list is empty or the candidate has no attributes
/// recorded, the score is 0 regardless of distance. This mirrors the
/// production matching behavior: an unprofiled pairing never outranks a
/// scored one.
pub fn calculate_match_score(
    distance_km: f64,
    radius_km: f64,
    candidate_attribute_ids: &HashSet<i32>,
    preferences: &[PreferenceWeight],
    weights: &ScoringWeights,
) -> u8 {
    if preferences.is_empty() || candidate_attribute_ids.is_empty() {
        return 0;
    }

    let distance_score = calculate_distance_score(distance_km, radius_km);
    let preference_score = calculate_preference_score(candidate_attribute_ids, preferences);

    let blended = distance_score * weights.distance + preference_score * weights.preference;

    blended.round().clamp(0.0, 100.0) as u8
}

/// Distance score (0-100): linear decay from 100 at the center to 0 at the
/// radius edge. Upstream filtering excludes candidates beyond the radius,
/// but clamp anyway.
#[inline]
pub fn calculate_distance_score(distance_km: f64, radius_km: f64) -> f64 {
    (100.0 * (1.0 - distance_km / radius_km)).max(0.0)
}

/// Preference overlap score (0-100), weighted by importance.
#[inline]
pub fn calculate_preference_score(
    candidate_attribute_ids: &HashSet<i32>,
    preferences: &[PreferenceWeight],
) -> f64 {
    let mut achieved_score = 0i64;
    let mut max_possible_score = 0i64;

    for preference in preferences {
        if candidate_attribute_ids.contains(&preference.attribute_id) {
            achieved_score += preference.importance as i64;
        }
        max_possible_score += preference.importance as i64;
    }

    if max_possible_score > 0 {
        (achieved_score as f64 / max_possible_score as f64) * 100.0
    } else {
        0.0
    }
}
