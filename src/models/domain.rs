use serde::{Deserialize, Serialize};

/// A point on the globe, in degrees.
///
/// Entities store their location as nullable lat/lon pairs; a `Coordinate`
/// only exists once both components are known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reference data describing a food property (e.g. "Vegetarian", "Produce").
///
/// Created administratively and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodAttribute {
    pub id: i32,
    pub name: String,
    /// Free-form grouping such as "dietary" or "category".
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert payload for a new food attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFoodAttribute {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Association of a food attribute to a donation, with an optional free-text
/// value. At most one association per (donation, attribute) pair in correct
/// usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationAttribute {
    #[serde(rename = "donationId")]
    pub donation_id: i32,
    #[serde(rename = "attributeId")]
    pub attribute_id: i32,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A donation attribute joined with the attribute it references.
///
/// The storage boundary guarantees the referenced `FoodAttribute` exists;
/// a dangling reference surfaces as a data-integrity error, never as a
/// silently dropped row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationAttributeDetail {
    #[serde(flatten)]
    pub association: DonationAttribute,
    pub attribute: FoodAttribute,
}

/// How much a recipient cares about a food attribute.
///
/// Importance is an integer 0 (indifferent) to 5 (critical). Exactly one
/// row exists per (recipient, attribute) pair; writes to an existing pair
/// update in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientPreference {
    #[serde(rename = "recipientId")]
    pub recipient_id: i32,
    #[serde(rename = "attributeId")]
    pub attribute_id: i32,
    pub importance: i32,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A recipient preference joined with the attribute it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientPreferenceDetail {
    #[serde(flatten)]
    pub preference: RecipientPreference,
    pub attribute: FoodAttribute,
}

/// Lifecycle state of a donation.
///
/// Only `Available` donations are eligible matching candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
pub enum DonationStatus {
    Available,
    Claimed,
    Completed,
}

/// A food donation posted by a donor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: i32,
    #[serde(rename = "donorId")]
    pub donor_id: i32,
    /// Set when a recipient claims the donation.
    #[serde(rename = "recipientId", default)]
    pub recipient_id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "foodType")]
    pub food_type: String,
    pub quantity: String,
    pub status: DonationStatus,
    #[serde(rename = "expiryDate", default)]
    pub expiry_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "trackingId")]
    pub tracking_id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Donation {
    /// Location of the donation, if the donor has set one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate { latitude, longitude }),
            _ => None,
        }
    }

    /// Whether this donation can still be claimed.
    pub fn available(&self) -> bool {
        self.status == DonationStatus::Available
    }
}

/// Insert payload for a new donation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDonation {
    #[serde(rename = "donorId")]
    pub donor_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "foodType")]
    pub food_type: String,
    pub quantity: String,
    #[serde(rename = "expiryDate", default)]
    pub expiry_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A recipient organization (food bank, shelter, community kitchen).
///
/// Authentication and contact handling live outside this service; only the
/// fields the matching core reads are modelled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(rename = "organizationType")]
    pub organization_type: String,
    #[serde(rename = "verificationStatus")]
    pub verification_status: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Recipient {
    /// Location of the recipient, if one has been set.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate { latitude, longitude }),
            _ => None,
        }
    }
}

/// Insert payload for a new recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipient {
    pub name: String,
    pub email: String,
    #[serde(rename = "organizationType")]
    pub organization_type: String,
}

/// A donation annotated with its match score against a recipient.
///
/// Ephemeral: computed per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationMatch {
    #[serde(flatten)]
    pub donation: Donation,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// A recipient annotated with its match score against a donation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientMatch {
    #[serde(flatten)]
    pub recipient: Recipient,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Blend weights for the final match score.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub distance: f64,
    pub preference: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            distance: 0.4,
            preference: 0.6,
        }
    }
}
