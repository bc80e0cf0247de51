// Criterion benchmarks for the FoodShare matching core

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foodshare_algo::core::{
    distance::{calculate_bounding_box, haversine_distance},
    proximity::within_radius,
    scoring::{calculate_match_score, PreferenceWeight},
};
use foodshare_algo::models::{Coordinate, Donation, DonationStatus, ScoringWeights};
use std::collections::HashSet;

fn create_donation(id: i32, lat: f64, lon: f64) -> Donation {
    Donation {
        id,
        donor_id: 1 + id % 20,
        recipient_id: None,
        title: format!("Donation {}", id),
        description: None,
        food_type: "Vegetarian".to_string(),
        quantity: "10 servings".to_string(),
        status: DonationStatus::Available,
        expiry_date: None,
        tracking_id: format!("track-{}", id),
        latitude: Some(lat),
        longitude: Some(lon),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_candidates(count: i32) -> Vec<Donation> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.5;
            let lon_offset = (i as f64 * 0.001) % 0.5;
            create_donation(i, 12.8230 + lat_offset, 80.0444 + lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(12.8230),
                black_box(80.0444),
                black_box(12.8231),
                black_box(80.0442),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| calculate_bounding_box(black_box(12.8230), black_box(80.0444), black_box(10.0)));
    });
}

fn bench_match_score(c: &mut Criterion) {
    let weights = ScoringWeights::default();
    let attributes: HashSet<i32> = (1..=8).collect();
    let preferences: Vec<PreferenceWeight> = (1..=12)
        .map(|attribute_id| PreferenceWeight {
            attribute_id,
            importance: 1 + (attribute_id % 5),
        })
        .collect();

    c.bench_function("calculate_match_score", |b| {
        b.iter(|| {
            calculate_match_score(
                black_box(3.4),
                black_box(10.0),
                black_box(&attributes),
                black_box(&preferences),
                black_box(&weights),
            )
        });
    });
}

fn bench_proximity_filter(c: &mut Criterion) {
    let center = Coordinate {
        latitude: 12.8230,
        longitude: 80.0444,
    };

    let mut group = c.benchmark_group("proximity");

    for candidate_count in [10, 100, 1000, 10000].iter() {
        let candidates = create_candidates(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("within_radius", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    within_radius(
                        black_box(center),
                        black_box(10.0),
                        black_box(candidates.clone()),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_match_score,
    bench_proximity_filter
);

criterion_main!(benches);
