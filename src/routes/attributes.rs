use crate::models::{
    AddDonationAttributeRequest, AttributeQuery, ErrorResponse, NewFoodAttribute,
    UpdatePreferenceRequest, UpsertPreferenceRequest,
};
use crate::routes::matches::{storage_error_response, AppState};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure attribute and preference routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/food-attributes", web::get().to(list_food_attributes))
        .route("/food-attributes", web::post().to(create_food_attribute))
        .route(
            "/recipients/{id}/preferences",
            web::get().to(get_recipient_preferences),
        )
        .route(
            "/recipients/{id}/preferences",
            web::post().to(add_recipient_preference),
        )
        .route(
            "/recipients/{recipient_id}/preferences/{attribute_id}",
            web::put().to(update_recipient_preference),
        )
        .route(
            "/donations/{id}/attributes",
            web::get().to(get_donation_attributes),
        )
        .route(
            "/donations/{id}/attributes",
            web::post().to(add_donation_attribute),
        );
}

/// List food attributes, optionally filtered by category
///
/// GET /api/v1/food-attributes?category=dietary
async fn list_food_attributes(
    state: web::Data<AppState>,
    query: web::Query<AttributeQuery>,
) -> impl Responder {
    match state
        .storage
        .get_food_attributes(query.category.as_deref())
        .await
    {
        Ok(attributes) => HttpResponse::Ok().json(attributes),
        Err(error) => storage_error_response(error),
    }
}

/// Create a food attribute (administrative)
///
/// POST /api/v1/food-attributes
async fn create_food_attribute(
    state: web::Data<AppState>,
    req: web::Json<NewFoodAttribute>,
) -> impl Responder {
    match state.storage.create_food_attribute(req.into_inner()).await {
        Ok(attribute) => HttpResponse::Created().json(attribute),
        Err(error) => storage_error_response(error),
    }
}

/// Preferences of a recipient, joined with their attributes
///
/// GET /api/v1/recipients/{id}/preferences
async fn get_recipient_preferences(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> impl Responder {
    match state
        .storage
        .get_recipient_preferences(path.into_inner())
        .await
    {
        Ok(preferences) => HttpResponse::Ok().json(preferences),
        Err(error) => storage_error_response(error),
    }
}

/// Create or update a recipient preference
///
/// POST /api/v1/recipients/{id}/preferences
///
/// Importance defaults to 5 when omitted and the preference does not exist
/// yet; an existing pair is updated in place, never duplicated.
async fn add_recipient_preference(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    req: web::Json<UpsertPreferenceRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state
        .storage
        .upsert_recipient_preference(path.into_inner(), req.attribute_id, req.importance)
        .await
    {
        Ok(preference) => HttpResponse::Created().json(preference),
        Err(error) => storage_error_response(error),
    }
}

/// Update the importance of a recipient preference
///
/// PUT /api/v1/recipients/{recipientId}/preferences/{attributeId}
async fn update_recipient_preference(
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
    req: web::Json<UpdatePreferenceRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let (recipient_id, attribute_id) = path.into_inner();

    match state
        .storage
        .upsert_recipient_preference(recipient_id, attribute_id, Some(req.importance))
        .await
    {
        Ok(preference) => HttpResponse::Ok().json(preference),
        Err(error) => storage_error_response(error),
    }
}

/// Attributes attached to a donation, joined with their reference data
///
/// GET /api/v1/donations/{id}/attributes
async fn get_donation_attributes(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> impl Responder {
    match state.storage.get_donation_attributes(path.into_inner()).await {
        Ok(attributes) => HttpResponse::Ok().json(attributes),
        Err(error) => storage_error_response(error),
    }
}

/// Attach a food attribute to a donation
///
/// POST /api/v1/donations/{id}/attributes
async fn add_donation_attribute(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    req: web::Json<AddDonationAttributeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request = req.into_inner();
    match state
        .storage
        .add_donation_attribute(path.into_inner(), request.attribute_id, request.value)
        .await
    {
        Ok(attribute) => HttpResponse::Created().json(attribute),
        Err(error) => storage_error_response(error),
    }
}
