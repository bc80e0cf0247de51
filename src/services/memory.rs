use crate::core::proximity::within_radius;
use crate::models::{
    Coordinate, Donation, DonationAttribute, DonationAttributeDetail, DonationStatus,
    FoodAttribute, NewDonation, NewFoodAttribute, NewRecipient, Recipient, RecipientPreference,
    RecipientPreferenceDetail,
};
use crate::services::storage::{Storage, StorageError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory storage backend.
///
/// Tables are maps guarded by a single `RwLock`; the association tables are
/// keyed by their composite `(left, right)` id pair, which serializes
/// concurrent upserts to the same pair while leaving different pairs
/// independent. Used as the test double for the matching core and as a
/// zero-dependency backend for local development.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    recipients: HashMap<i32, Recipient>,
    donations: HashMap<i32, Donation>,
    food_attributes: HashMap<i32, FoodAttribute>,
    donation_attributes: HashMap<(i32, i32), DonationAttribute>,
    recipient_preferences: HashMap<(i32, i32), RecipientPreference>,
    recipient_next_id: i32,
    donation_next_id: i32,
    attribute_next_id: i32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_recipient(&self, id: i32) -> Result<Option<Recipient>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables.recipients.get(&id).cloned())
    }

    async fn create_recipient(&self, new: NewRecipient) -> Result<Recipient, StorageError> {
        let mut tables = self.inner.write().await;
        tables.recipient_next_id += 1;
        let recipient = Recipient {
            id: tables.recipient_next_id,
            name: new.name,
            email: new.email,
            organization_type: new.organization_type,
            verification_status: "pending".to_string(),
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        };
        tables.recipients.insert(recipient.id, recipient.clone());
        Ok(recipient)
    }

    async fn update_recipient_location(
        &self,
        id: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Recipient>, StorageError> {
        let mut tables = self.inner.write().await;
        Ok(tables.recipients.get_mut(&id).map(|recipient| {
            recipient.latitude = Some(latitude);
            recipient.longitude = Some(longitude);
            recipient.clone()
        }))
    }

    async fn get_nearby_recipients(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Recipient>, StorageError> {
        let tables = self.inner.read().await;
        let candidates: Vec<Recipient> = tables.recipients.values().cloned().collect();
        drop(tables);

        let center = Coordinate { latitude, longitude };
        Ok(within_radius(center, radius_km, candidates))
    }

    async fn get_donation(&self, id: i32) -> Result<Option<Donation>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables.donations.get(&id).cloned())
    }

    async fn create_donation(&self, new: NewDonation) -> Result<Donation, StorageError> {
        let mut tables = self.inner.write().await;
        tables.donation_next_id += 1;
        let now = Utc::now();
        let donation = Donation {
            id: tables.donation_next_id,
            donor_id: new.donor_id,
            recipient_id: None,
            title: new.title,
            description: new.description,
            food_type: new.food_type,
            quantity: new.quantity,
            status: DonationStatus::Available,
            expiry_date: new.expiry_date,
            tracking_id: uuid::Uuid::new_v4().to_string(),
            latitude: new.latitude,
            longitude: new.longitude,
            created_at: now,
            updated_at: now,
        };
        tables.donations.insert(donation.id, donation.clone());
        Ok(donation)
    }

    async fn update_donation_status(
        &self,
        id: i32,
        status: DonationStatus,
        recipient_id: Option<i32>,
    ) -> Result<Option<Donation>, StorageError> {
        let mut tables = self.inner.write().await;
        Ok(tables.donations.get_mut(&id).map(|donation| {
            donation.status = status;
            if recipient_id.is_some() {
                donation.recipient_id = recipient_id;
            }
            donation.updated_at = Utc::now();
            donation.clone()
        }))
    }

    async fn update_donation_location(
        &self,
        id: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Donation>, StorageError> {
        let mut tables = self.inner.write().await;
        Ok(tables.donations.get_mut(&id).map(|donation| {
            donation.latitude = Some(latitude);
            donation.longitude = Some(longitude);
            donation.updated_at = Utc::now();
            donation.clone()
        }))
    }

    async fn get_nearby_donations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Donation>, StorageError> {
        let tables = self.inner.read().await;
        let candidates: Vec<Donation> = tables
            .donations
            .values()
            .filter(|donation| donation.available())
            .cloned()
            .collect();
        drop(tables);

        let center = Coordinate { latitude, longitude };
        Ok(within_radius(center, radius_km, candidates))
    }

    async fn get_expiring_donations(
        &self,
        hours_threshold: i64,
    ) -> Result<Vec<Donation>, StorageError> {
        let threshold = Utc::now() + Duration::hours(hours_threshold);
        let tables = self.inner.read().await;
        Ok(tables
            .donations
            .values()
            .filter(|donation| {
                donation.available()
                    && donation
                        .expiry_date
                        .map_or(false, |expiry| expiry <= threshold)
            })
            .cloned()
            .collect())
    }

    async fn create_food_attribute(
        &self,
        new: NewFoodAttribute,
    ) -> Result<FoodAttribute, StorageError> {
        let mut tables = self.inner.write().await;
        tables.attribute_next_id += 1;
        let attribute = FoodAttribute {
            id: tables.attribute_next_id,
            name: new.name,
            category: new.category,
            description: new.description,
            created_at: Utc::now(),
        };
        tables.food_attributes.insert(attribute.id, attribute.clone());
        Ok(attribute)
    }

    async fn get_food_attributes(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<FoodAttribute>, StorageError> {
        let tables = self.inner.read().await;
        let mut attributes: Vec<FoodAttribute> = tables
            .food_attributes
            .values()
            .filter(|attribute| category.map_or(true, |c| attribute.category == c))
            .cloned()
            .collect();
        attributes.sort_by_key(|attribute| attribute.id);
        Ok(attributes)
    }

    async fn get_food_attribute(&self, id: i32) -> Result<Option<FoodAttribute>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables.food_attributes.get(&id).cloned())
    }

    async fn add_donation_attribute(
        &self,
        donation_id: i32,
        attribute_id: i32,
        value: Option<String>,
    ) -> Result<DonationAttribute, StorageError> {
        let mut tables = self.inner.write().await;
        if !tables.donations.contains_key(&donation_id) {
            return Err(StorageError::NotFound { entity: "donation", id: donation_id });
        }
        if !tables.food_attributes.contains_key(&attribute_id) {
            return Err(StorageError::NotFound { entity: "food attribute", id: attribute_id });
        }

        let association = DonationAttribute {
            donation_id,
            attribute_id,
            value,
            created_at: Utc::now(),
        };
        tables
            .donation_attributes
            .insert((donation_id, attribute_id), association.clone());
        Ok(association)
    }

    async fn get_donation_attributes(
        &self,
        donation_id: i32,
    ) -> Result<Vec<DonationAttributeDetail>, StorageError> {
        let tables = self.inner.read().await;
        let mut details = Vec::new();
        for association in tables
            .donation_attributes
            .values()
            .filter(|association| association.donation_id == donation_id)
        {
            let attribute = tables
                .food_attributes
                .get(&association.attribute_id)
                .cloned()
                .ok_or(StorageError::MissingAttribute {
                    attribute_id: association.attribute_id,
                })?;
            details.push(DonationAttributeDetail {
                association: association.clone(),
                attribute,
            });
        }
        details.sort_by_key(|detail| detail.association.attribute_id);
        Ok(details)
    }

    async fn upsert_recipient_preference(
        &self,
        recipient_id: i32,
        attribute_id: i32,
        importance: Option<i32>,
    ) -> Result<RecipientPreference, StorageError> {
        let mut tables = self.inner.write().await;
        if !tables.recipients.contains_key(&recipient_id) {
            return Err(StorageError::NotFound { entity: "recipient", id: recipient_id });
        }
        if !tables.food_attributes.contains_key(&attribute_id) {
            return Err(StorageError::NotFound { entity: "food attribute", id: attribute_id });
        }

        let key = (recipient_id, attribute_id);
        let preference = match tables.recipient_preferences.entry(key) {
            Entry::Occupied(mut entry) => {
                // Importance only defaults on creation; omitted on update
                // leaves the stored value untouched
                if let Some(importance) = importance {
                    entry.get_mut().importance = importance;
                }
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry
                .insert(RecipientPreference {
                    recipient_id,
                    attribute_id,
                    importance: importance.unwrap_or(5),
                    created_at: Utc::now(),
                })
                .clone(),
        };
        Ok(preference)
    }

    async fn get_recipient_preferences(
        &self,
        recipient_id: i32,
    ) -> Result<Vec<RecipientPreferenceDetail>, StorageError> {
        let tables = self.inner.read().await;
        let mut details = Vec::new();
        for preference in tables
            .recipient_preferences
            .values()
            .filter(|preference| preference.recipient_id == recipient_id)
        {
            let attribute = tables
                .food_attributes
                .get(&preference.attribute_id)
                .cloned()
                .ok_or(StorageError::MissingAttribute {
                    attribute_id: preference.attribute_id,
                })?;
            details.push(RecipientPreferenceDetail {
                preference: preference.clone(),
                attribute,
            });
        }
        details.sort_by_key(|detail| detail.preference.attribute_id);
        Ok(details)
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }
}
