// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, Coordinate, Donation, DonationAttribute, DonationAttributeDetail, DonationMatch,
    DonationStatus, FoodAttribute, NewDonation, NewFoodAttribute, NewRecipient, Recipient,
    RecipientMatch, RecipientPreference, RecipientPreferenceDetail, ScoringWeights,
};
pub use requests::{
    AddDonationAttributeRequest, AttributeQuery, MatchQuery, UpdatePreferenceRequest,
    UpsertPreferenceRequest,
};
pub use responses::{ErrorResponse, HealthResponse};
