use crate::core::{MatchError, Matcher, DEFAULT_RADIUS_KM};
use crate::models::{ErrorResponse, HealthResponse, MatchQuery};
use crate::services::{Storage, StorageError};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Search radii above this are rejected outright.
const MAX_RADIUS_KM: f64 = 100.0;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub matcher: Matcher,
    pub default_radius_km: f64,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, matcher: Matcher) -> Self {
        Self {
            storage,
            matcher,
            default_radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

/// Configure matching routes and the health probe
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route(
            "/recipients/{id}/matching-donations",
            web::get().to(matching_donations),
        )
        .route(
            "/donations/{id}/matching-recipients",
            web::get().to(matching_recipients),
        );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let storage_healthy = state.storage.health_check().await.unwrap_or(false);

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn resolve_radius(query: &MatchQuery, state: &AppState) -> Result<f64, HttpResponse> {
    if let Err(errors) = query.validate() {
        return Err(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let radius = query.radius.unwrap_or(state.default_radius_km);
    if radius > MAX_RADIUS_KM {
        return Err(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Radius too large".to_string(),
            message: format!("Radius must be at most {} km", MAX_RADIUS_KM),
            status_code: 400,
        }));
    }

    Ok(radius)
}

fn match_error_response(error: MatchError) -> HttpResponse {
    match error {
        MatchError::RecipientNotFound(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Recipient not found".to_string(),
            message: format!("No recipient with id {}", id),
            status_code: 404,
        }),
        MatchError::DonationNotFound(id) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Donation not found".to_string(),
            message: format!("No donation with id {}", id),
            status_code: 404,
        }),
        MatchError::Storage(error) => storage_error_response(error),
    }
}

pub(crate) fn storage_error_response(error: StorageError) -> HttpResponse {
    match error {
        StorageError::NotFound { entity, id } => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("{} not found", entity),
            message: format!("No {} with id {}", entity, id),
            status_code: 404,
        }),
        StorageError::MissingAttribute { attribute_id } => {
            tracing::error!(
                "Data integrity failure: dangling food attribute reference {}",
                attribute_id
            );
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Data integrity error".to_string(),
                message: format!("Association references missing attribute {}", attribute_id),
                status_code: 500,
            })
        }
        StorageError::Database(error) => {
            tracing::error!("Storage unavailable: {}", error);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Storage unavailable".to_string(),
                message: "The backing store failed to answer; retry later".to_string(),
                status_code: 500,
            })
        }
    }
}

/// Matching donations endpoint
///
/// GET /api/v1/recipients/{id}/matching-donations?radius=<km>
///
/// Returns in-radius available donations ranked by match score. A recipient
/// without a location yields an empty list; an unknown recipient is a 404.
async fn matching_donations(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    query: web::Query<MatchQuery>,
) -> impl Responder {
    let recipient_id = path.into_inner();
    let radius_km = match resolve_radius(&query, &state) {
        Ok(radius) => radius,
        Err(response) => return response,
    };

    tracing::info!(
        "Finding matching donations for recipient {} within {} km",
        recipient_id,
        radius_km
    );

    match state
        .matcher
        .matching_donations_for_recipient(state.storage.as_ref(), recipient_id, radius_km)
        .await
    {
        Ok(matches) => {
            tracing::info!(
                "Returning {} donation matches for recipient {}",
                matches.len(),
                recipient_id
            );
            HttpResponse::Ok().json(matches)
        }
        Err(error) => match_error_response(error),
    }
}

/// Matching recipients endpoint
///
/// GET /api/v1/donations/{id}/matching-recipients?radius=<km>
async fn matching_recipients(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    query: web::Query<MatchQuery>,
) -> impl Responder {
    let donation_id = path.into_inner();
    let radius_km = match resolve_radius(&query, &state) {
        Ok(radius) => radius,
        Err(response) => return response,
    };

    tracing::info!(
        "Finding matching recipients for donation {} within {} km",
        donation_id,
        radius_km
    );

    match state
        .matcher
        .matching_recipients_for_donation(state.storage.as_ref(), donation_id, radius_km)
        .await
    {
        Ok(matches) => {
            tracing::info!(
                "Returning {} recipient matches for donation {}",
                matches.len(),
                donation_id
            );
            HttpResponse::Ok().json(matches)
        }
        Err(error) => match_error_response(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_radius_validation_rejects_nonpositive() {
        let query = MatchQuery { radius: Some(0.0) };
        assert!(query.validate().is_err());

        let query = MatchQuery { radius: Some(-5.0) };
        assert!(query.validate().is_err());

        let query = MatchQuery { radius: Some(10.0) };
        assert!(query.validate().is_ok());
    }
}
