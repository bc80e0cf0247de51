use crate::models::{
    Donation, DonationAttribute, DonationAttributeDetail, DonationStatus, FoodAttribute,
    NewDonation, NewFoodAttribute, NewRecipient, Recipient, RecipientPreference,
    RecipientPreferenceDetail,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// An association row references a food attribute that does not exist.
    ///
    /// Surfaced instead of silently dropping the row: a dropped association
    /// would corrupt the preference-score denominator.
    #[error("food attribute {attribute_id} referenced by an association does not exist")]
    MissingAttribute { attribute_id: i32 },

    /// The backing database is unavailable or rejected the operation.
    /// Propagated to the caller as retryable; storage performs no retries.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The storage collaborator consumed by the matching core.
///
/// Implementations provide the narrow read/write interface below; all
/// matching logic lives in [`crate::core`] and is shared across backends.
/// Concurrent preference upserts for the same (recipient, attribute) pair
/// must serialize so the last write wins; different pairs never interfere.
#[async_trait]
pub trait Storage: Send + Sync {
    // Recipients
    async fn get_recipient(&self, id: i32) -> Result<Option<Recipient>, StorageError>;
    async fn create_recipient(&self, new: NewRecipient) -> Result<Recipient, StorageError>;
    async fn update_recipient_location(
        &self,
        id: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Recipient>, StorageError>;

    /// Recipients with a known location within `radius_km`, nearest first.
    async fn get_nearby_recipients(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Recipient>, StorageError>;

    // Donations
    async fn get_donation(&self, id: i32) -> Result<Option<Donation>, StorageError>;
    async fn create_donation(&self, new: NewDonation) -> Result<Donation, StorageError>;
    async fn update_donation_status(
        &self,
        id: i32,
        status: DonationStatus,
        recipient_id: Option<i32>,
    ) -> Result<Option<Donation>, StorageError>;
    async fn update_donation_location(
        &self,
        id: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Donation>, StorageError>;

    /// Available donations with a known location within `radius_km`,
    /// nearest first.
    async fn get_nearby_donations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Donation>, StorageError>;

    /// Available donations expiring within the next `hours_threshold` hours.
    async fn get_expiring_donations(
        &self,
        hours_threshold: i64,
    ) -> Result<Vec<Donation>, StorageError>;

    // Food attributes (reference data)
    async fn create_food_attribute(
        &self,
        new: NewFoodAttribute,
    ) -> Result<FoodAttribute, StorageError>;
    async fn get_food_attributes(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<FoodAttribute>, StorageError>;
    async fn get_food_attribute(&self, id: i32) -> Result<Option<FoodAttribute>, StorageError>;

    // Donation attributes
    async fn add_donation_attribute(
        &self,
        donation_id: i32,
        attribute_id: i32,
        value: Option<String>,
    ) -> Result<DonationAttribute, StorageError>;

    /// Attributes attached to a donation, joined with their reference data.
    /// Empty when the donation has none.
    async fn get_donation_attributes(
        &self,
        donation_id: i32,
    ) -> Result<Vec<DonationAttributeDetail>, StorageError>;

    // Recipient preferences
    /// Create the preference if absent (importance defaults to 5 when
    /// omitted), otherwise update the stored importance in place. An omitted
    /// importance on an existing pair leaves the stored value untouched.
    async fn upsert_recipient_preference(
        &self,
        recipient_id: i32,
        attribute_id: i32,
        importance: Option<i32>,
    ) -> Result<RecipientPreference, StorageError>;

    /// Preferences of a recipient, joined with their reference data.
    /// Empty when the recipient has none.
    async fn get_recipient_preferences(
        &self,
        recipient_id: i32,
    ) -> Result<Vec<RecipientPreferenceDetail>, StorageError>;

    /// Backend liveness probe.
    async fn health_check(&self) -> Result<bool, StorageError>;
}
