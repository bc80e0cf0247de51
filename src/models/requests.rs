use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for the matching endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchQuery {
    /// Search radius in kilometers; the configured default applies when
    /// omitted.
    #[validate(range(min = 0.001))]
    #[serde(default)]
    pub radius: Option<f64>,
}

/// Query parameters for listing food attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeQuery {
    #[serde(default)]
    pub category: Option<String>,
}

/// Request to create or update a recipient preference.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertPreferenceRequest {
    #[serde(alias = "attribute_id", rename = "attributeId")]
    pub attribute_id: i32,
    /// 0 = indifferent, 5 = critical. Defaults to 5 on creation when omitted.
    #[validate(range(min = 0, max = 5))]
    #[serde(default)]
    pub importance: Option<i32>,
}

/// Request to update the importance of an existing preference.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePreferenceRequest {
    #[validate(range(min = 0, max = 5))]
    pub importance: i32,
}

/// Request to attach a food attribute to a donation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddDonationAttributeRequest {
    #[serde(alias = "attribute_id", rename = "attributeId")]
    pub attribute_id: i32,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub value: Option<String>,
}
