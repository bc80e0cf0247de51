// HTTP surface tests over the in-memory backend

use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use foodshare_algo::models::{NewDonation, NewFoodAttribute, NewRecipient};
use foodshare_algo::routes::{self, matches::AppState};
use foodshare_algo::{Matcher, MemoryStorage, Storage};
use std::sync::Arc;

async fn seeded_state() -> (Arc<MemoryStorage>, AppState) {
    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::new(storage.clone(), Matcher::with_default_weights());
    (storage, state)
}

#[actix_web::test]
async fn test_health_endpoint() {
    let (_storage, state) = seeded_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_matching_donations_unknown_recipient_is_404() {
    let (_storage, state) = seeded_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/recipients/999/matching-donations")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_matching_donations_returns_scored_candidates() {
    let (storage, state) = seeded_state().await;

    let recipient = storage
        .create_recipient(NewRecipient {
            name: "Potheri Shelter".to_string(),
            email: "shelter@example.com".to_string(),
            organization_type: "Shelter".to_string(),
        })
        .await
        .unwrap();
    storage
        .update_recipient_location(recipient.id, 12.8230, 80.0444)
        .await
        .unwrap();

    let attribute = storage
        .create_food_attribute(NewFoodAttribute {
            name: "Vegetarian".to_string(),
            category: "dietary".to_string(),
            description: None,
        })
        .await
        .unwrap();
    storage
        .upsert_recipient_preference(recipient.id, attribute.id, Some(5))
        .await
        .unwrap();

    let donation = storage
        .create_donation(NewDonation {
            donor_id: 1,
            title: "South Indian Food".to_string(),
            description: None,
            food_type: "Vegetarian".to_string(),
            quantity: "10 servings".to_string(),
            expiry_date: Some(Utc::now() + Duration::hours(6)),
            latitude: Some(12.8231),
            longitude: Some(80.0442),
        })
        .await
        .unwrap();
    storage
        .add_donation_attribute(donation.id, attribute.id, None)
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/recipients/{}/matching-donations?radius=10",
            recipient.id
        ))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let matches = body.as_array().expect("response is an array");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["matchScore"], 100);
    assert_eq!(matches[0]["id"], donation.id);
    assert_eq!(matches[0]["status"], "available");
}

#[actix_web::test]
async fn test_invalid_radius_is_400() {
    let (storage, state) = seeded_state().await;

    let recipient = storage
        .create_recipient(NewRecipient {
            name: "Shelter".to_string(),
            email: "shelter@example.com".to_string(),
            organization_type: "Shelter".to_string(),
        })
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/recipients/{}/matching-donations?radius=-3",
            recipient.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_preference_roundtrip_over_http() {
    let (storage, state) = seeded_state().await;

    let recipient = storage
        .create_recipient(NewRecipient {
            name: "Shelter".to_string(),
            email: "shelter@example.com".to_string(),
            organization_type: "Shelter".to_string(),
        })
        .await
        .unwrap();
    let attribute = storage
        .create_food_attribute(NewFoodAttribute {
            name: "Vegetarian".to_string(),
            category: "dietary".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    // Create without importance: defaults to 5
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/recipients/{}/preferences", recipient.id))
        .set_json(serde_json::json!({ "attributeId": attribute.id }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["importance"], 5);

    // Update in place
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/v1/recipients/{}/preferences/{}",
            recipient.id, attribute.id
        ))
        .set_json(serde_json::json!({ "importance": 2 }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["importance"], 2);

    // Out-of-range importance is rejected
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/recipients/{}/preferences", recipient.id))
        .set_json(serde_json::json!({ "attributeId": attribute.id, "importance": 9 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let preferences = storage.get_recipient_preferences(recipient.id).await.unwrap();
    assert_eq!(preferences.len(), 1);
    assert_eq!(preferences[0].preference.importance, 2);
}

#[actix_web::test]
async fn test_food_attribute_listing_by_category() {
    let (storage, state) = seeded_state().await;

    storage
        .create_food_attribute(NewFoodAttribute {
            name: "Vegetarian".to_string(),
            category: "dietary".to_string(),
            description: Some("Suitable for vegetarians".to_string()),
        })
        .await
        .unwrap();
    storage
        .create_food_attribute(NewFoodAttribute {
            name: "Bakery".to_string(),
            category: "category".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/food-attributes?category=dietary")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let attributes = body.as_array().expect("response is an array");
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0]["name"], "Vegetarian");
}
