use crate::core::proximity::within_radius;
use crate::models::{
    Coordinate, Donation, DonationAttribute, DonationAttributeDetail, DonationStatus,
    FoodAttribute, NewDonation, NewFoodAttribute, NewRecipient, Recipient, RecipientPreference,
    RecipientPreferenceDetail,
};
use crate::services::storage::{Storage, StorageError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

/// PostgreSQL storage backend.
///
/// Candidate queries constrain on a bounding box in SQL (lat/lon BETWEEN)
/// and the exact radius check runs in the core proximity filter, so both
/// backends share one distance computation. The preference upsert uses
/// `INSERT ... ON CONFLICT ... DO UPDATE`, which serializes concurrent
/// writes to the same (recipient, attribute) pair at the row level.
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Create a new PostgreSQL storage backend from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;

        Ok(Self { pool })
    }

    /// Create a new storage backend from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    async fn ensure_recipient(&self, id: i32) -> Result<(), StorageError> {
        let exists = sqlx::query("SELECT 1 FROM recipients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound { entity: "recipient", id }),
        }
    }

    async fn ensure_donation(&self, id: i32) -> Result<(), StorageError> {
        let exists = sqlx::query("SELECT 1 FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound { entity: "donation", id }),
        }
    }

    async fn ensure_attribute(&self, id: i32) -> Result<(), StorageError> {
        let exists = sqlx::query("SELECT 1 FROM food_attributes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound { entity: "food attribute", id }),
        }
    }
}

fn recipient_from_row(row: &PgRow) -> Recipient {
    Recipient {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        organization_type: row.get("organization_type"),
        verification_status: row.get("verification_status"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        created_at: row.get("created_at"),
    }
}

fn donation_from_row(row: &PgRow) -> Donation {
    Donation {
        id: row.get("id"),
        donor_id: row.get("donor_id"),
        recipient_id: row.get("recipient_id"),
        title: row.get("title"),
        description: row.get("description"),
        food_type: row.get("food_type"),
        quantity: row.get("quantity"),
        status: row.get("status"),
        expiry_date: row.get("expiry_date"),
        tracking_id: row.get("tracking_id"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn attribute_from_row(row: &PgRow) -> FoodAttribute {
    FoodAttribute {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

/// Joined attribute columns come back nullable from the LEFT JOIN; a NULL
/// means the association references a deleted attribute.
fn joined_attribute(row: &PgRow, attribute_id: i32) -> Result<FoodAttribute, StorageError> {
    let id: Option<i32> = row.get("fa_id");
    match id {
        Some(id) => Ok(FoodAttribute {
            id,
            name: row.get("fa_name"),
            category: row.get("fa_category"),
            description: row.get("fa_description"),
            created_at: row.get("fa_created_at"),
        }),
        None => Err(StorageError::MissingAttribute { attribute_id }),
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn get_recipient(&self, id: i32) -> Result<Option<Recipient>, StorageError> {
        let row = sqlx::query("SELECT * FROM recipients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(recipient_from_row))
    }

    async fn create_recipient(&self, new: NewRecipient) -> Result<Recipient, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO recipients (name, email, organization_type, verification_status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.organization_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(recipient_from_row(&row))
    }

    async fn update_recipient_location(
        &self,
        id: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Recipient>, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE recipients
            SET latitude = $2, longitude = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(recipient_from_row))
    }

    async fn get_nearby_recipients(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Recipient>, StorageError> {
        let bbox = crate::core::distance::calculate_bounding_box(latitude, longitude, radius_km);

        let rows = sqlx::query(
            r#"
            SELECT * FROM recipients
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
            "#,
        )
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lon)
        .bind(bbox.max_lon)
        .fetch_all(&self.pool)
        .await?;

        let candidates: Vec<Recipient> = rows.iter().map(recipient_from_row).collect();

        tracing::debug!(
            "Bounding box kept {} recipient candidates around ({}, {})",
            candidates.len(),
            latitude,
            longitude
        );

        let center = Coordinate { latitude, longitude };
        Ok(within_radius(center, radius_km, candidates))
    }

    async fn get_donation(&self, id: i32) -> Result<Option<Donation>, StorageError> {
        let row = sqlx::query("SELECT * FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(donation_from_row))
    }

    async fn create_donation(&self, new: NewDonation) -> Result<Donation, StorageError> {
        let tracking_id = uuid::Uuid::new_v4().to_string();

        let row = sqlx::query(
            r#"
            INSERT INTO donations
                (donor_id, title, description, food_type, quantity, status,
                 expiry_date, tracking_id, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, 'available', $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.donor_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.food_type)
        .bind(&new.quantity)
        .bind(new.expiry_date)
        .bind(&tracking_id)
        .bind(new.latitude)
        .bind(new.longitude)
        .fetch_one(&self.pool)
        .await?;

        Ok(donation_from_row(&row))
    }

    async fn update_donation_status(
        &self,
        id: i32,
        status: DonationStatus,
        recipient_id: Option<i32>,
    ) -> Result<Option<Donation>, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE donations
            SET status = $2,
                recipient_id = COALESCE($3, recipient_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(donation_from_row))
    }

    async fn update_donation_location(
        &self,
        id: i32,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Donation>, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE donations
            SET latitude = $2, longitude = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(donation_from_row))
    }

    async fn get_nearby_donations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Donation>, StorageError> {
        let bbox = crate::core::distance::calculate_bounding_box(latitude, longitude, radius_km);

        let rows = sqlx::query(
            r#"
            SELECT * FROM donations
            WHERE status = 'available'
              AND latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
            "#,
        )
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lon)
        .bind(bbox.max_lon)
        .fetch_all(&self.pool)
        .await?;

        let candidates: Vec<Donation> = rows.iter().map(donation_from_row).collect();

        tracing::debug!(
            "Bounding box kept {} donation candidates around ({}, {})",
            candidates.len(),
            latitude,
            longitude
        );

        let center = Coordinate { latitude, longitude };
        Ok(within_radius(center, radius_km, candidates))
    }

    async fn get_expiring_donations(
        &self,
        hours_threshold: i64,
    ) -> Result<Vec<Donation>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM donations
            WHERE status = 'available'
              AND expiry_date IS NOT NULL
              AND expiry_date <= NOW() + $1 * INTERVAL '1 hour'
            ORDER BY expiry_date
            "#,
        )
        .bind(hours_threshold as f64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(donation_from_row).collect())
    }

    async fn create_food_attribute(
        &self,
        new: NewFoodAttribute,
    ) -> Result<FoodAttribute, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO food_attributes (name, category, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.category)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(attribute_from_row(&row))
    }

    async fn get_food_attributes(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<FoodAttribute>, StorageError> {
        let rows = match category {
            Some(category) => {
                sqlx::query("SELECT * FROM food_attributes WHERE category = $1 ORDER BY id")
                    .bind(category)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM food_attributes ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.iter().map(attribute_from_row).collect())
    }

    async fn get_food_attribute(&self, id: i32) -> Result<Option<FoodAttribute>, StorageError> {
        let row = sqlx::query("SELECT * FROM food_attributes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(attribute_from_row))
    }

    async fn add_donation_attribute(
        &self,
        donation_id: i32,
        attribute_id: i32,
        value: Option<String>,
    ) -> Result<DonationAttribute, StorageError> {
        self.ensure_donation(donation_id).await?;
        self.ensure_attribute(attribute_id).await?;

        // At most one value per (donation, attribute) pair
        let row = sqlx::query(
            r#"
            INSERT INTO donation_attributes (donation_id, attribute_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (donation_id, attribute_id)
            DO UPDATE SET value = EXCLUDED.value
            RETURNING *
            "#,
        )
        .bind(donation_id)
        .bind(attribute_id)
        .bind(&value)
        .fetch_one(&self.pool)
        .await?;

        Ok(DonationAttribute {
            donation_id: row.get("donation_id"),
            attribute_id: row.get("attribute_id"),
            value: row.get("value"),
            created_at: row.get("created_at"),
        })
    }

    async fn get_donation_attributes(
        &self,
        donation_id: i32,
    ) -> Result<Vec<DonationAttributeDetail>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT da.donation_id, da.attribute_id, da.value, da.created_at,
                   fa.id AS fa_id, fa.name AS fa_name, fa.category AS fa_category,
                   fa.description AS fa_description, fa.created_at AS fa_created_at
            FROM donation_attributes da
            LEFT JOIN food_attributes fa ON fa.id = da.attribute_id
            WHERE da.donation_id = $1
            ORDER BY da.attribute_id
            "#,
        )
        .bind(donation_id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(rows.len());
        for row in &rows {
            let attribute_id: i32 = row.get("attribute_id");
            let attribute = joined_attribute(row, attribute_id)?;
            details.push(DonationAttributeDetail {
                association: DonationAttribute {
                    donation_id: row.get("donation_id"),
                    attribute_id,
                    value: row.get("value"),
                    created_at: row.get("created_at"),
                },
                attribute,
            });
        }

        Ok(details)
    }

    async fn upsert_recipient_preference(
        &self,
        recipient_id: i32,
        attribute_id: i32,
        importance: Option<i32>,
    ) -> Result<RecipientPreference, StorageError> {
        self.ensure_recipient(recipient_id).await?;
        self.ensure_attribute(attribute_id).await?;

        // COALESCE keeps the stored importance when the update omits one;
        // the default of 5 applies on creation only
        let row = sqlx::query(
            r#"
            INSERT INTO recipient_preferences (recipient_id, attribute_id, importance)
            VALUES ($1, $2, COALESCE($3, 5))
            ON CONFLICT (recipient_id, attribute_id)
            DO UPDATE SET importance = COALESCE($3, recipient_preferences.importance)
            RETURNING *
            "#,
        )
        .bind(recipient_id)
        .bind(attribute_id)
        .bind(importance)
        .fetch_one(&self.pool)
        .await?;

        Ok(RecipientPreference {
            recipient_id: row.get("recipient_id"),
            attribute_id: row.get("attribute_id"),
            importance: row.get("importance"),
            created_at: row.get("created_at"),
        })
    }

    async fn get_recipient_preferences(
        &self,
        recipient_id: i32,
    ) -> Result<Vec<RecipientPreferenceDetail>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT rp.recipient_id, rp.attribute_id, rp.importance, rp.created_at,
                   fa.id AS fa_id, fa.name AS fa_name, fa.category AS fa_category,
                   fa.description AS fa_description, fa.created_at AS fa_created_at
            FROM recipient_preferences rp
            LEFT JOIN food_attributes fa ON fa.id = rp.attribute_id
            WHERE rp.recipient_id = $1
            ORDER BY rp.attribute_id
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(rows.len());
        for row in &rows {
            let attribute_id: i32 = row.get("attribute_id");
            let attribute = joined_attribute(row, attribute_id)?;
            details.push(RecipientPreferenceDetail {
                preference: RecipientPreference {
                    recipient_id: row.get("recipient_id"),
                    attribute_id,
                    importance: row.get("importance"),
                    created_at: row.get("created_at"),
                },
                attribute,
            });
        }

        Ok(details)
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
