// Integration tests for the Feasto engine

use feasto_engine::core::{Matcher, MatcherConfig, NearbyQuery};
use feasto_engine::models::{
    CourierCandidate, GeoPoint, Location, NameSearch, PageRequest, RestaurantCandidate,
    ScoringWeights, SortStrategy,
};
use feasto_engine::services::{assign_with_retry, AssignmentError, MemoryStore};
use std::future::ready;

// ~1 km of latitude at R = 6371 km
const KM_IN_DEGREES: f64 = 1.0 / 111.19492664455873;

fn restaurant(id: i64, name: &str, lat: f64, lon: f64, rating: Option<f64>) -> RestaurantCandidate {
    RestaurantCandidate {
        id,
        name: Some(name.to_string()),
        is_active: true,
        location: Some(Location::new(lat, lon)),
        rating,
    }
}

fn courier(id: i64, lat: f64, lon: f64, rating: f64) -> CourierCandidate {
    CourierCandidate {
        id,
        name: Some(format!("Partner {}", id)),
        available: true,
        location: Some(Location::new(lat, lon)),
        rating: Some(rating),
    }
}

fn center() -> GeoPoint {
    GeoPoint::new(12.90, 77.60).unwrap()
}

fn nearby_query(radius_km: f64, sort: SortStrategy) -> NearbyQuery {
    NearbyQuery {
        center: center(),
        radius_km: Some(radius_km),
        sort,
        page: PageRequest::new(0, 10),
    }
}

#[test]
fn test_integration_nearby_end_to_end() {
    let store = MemoryStore::new(
        vec![
            restaurant(1, "Far Biryani", 12.90 + 4.9 * KM_IN_DEGREES, 77.60, Some(4.8)),
            restaurant(2, "Near Dosa", 12.90 + 1.0 * KM_IN_DEGREES, 77.60, Some(3.9)),
            restaurant(3, "Outside Idli", 12.90 + 6.0 * KM_IN_DEGREES, 77.60, Some(5.0)),
        ],
        vec![],
    );

    let matcher = Matcher::with_default_config();
    let page = matcher
        .find_nearby(&store, &nearby_query(5.0, SortStrategy::Distance))
        .unwrap();

    assert_eq!(page.total_count, 2);
    let ids: Vec<i64> = page.items.iter().map(|r| r.entity.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!((page.items[0].score - 1.0).abs() < 1e-3);
    assert!((page.items[1].score - 4.9).abs() < 1e-3);
}

#[test]
fn test_nearby_excludes_inactive_and_unlocated() {
    let mut inactive = restaurant(1, "Closed", 12.901, 77.601, Some(5.0));
    inactive.is_active = false;
    let mut unlocated = restaurant(2, "Nowhere", 0.0, 0.0, Some(5.0));
    unlocated.location = None;

    let store = MemoryStore::new(
        vec![inactive, unlocated, restaurant(3, "Open", 12.902, 77.602, None)],
        vec![],
    );

    let page = Matcher::with_default_config()
        .find_nearby(&store, &nearby_query(5.0, SortStrategy::Distance))
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].entity.id, 3);
}

#[test]
fn test_nearby_rating_sort_and_paging() {
    let restaurants = (1..=25)
        .map(|id| {
            restaurant(
                id,
                &format!("R{}", id),
                12.90 + (id as f64) * 0.001,
                77.60,
                Some((id % 5) as f64),
            )
        })
        .collect();
    let store = MemoryStore::new(restaurants, vec![]);
    let matcher = Matcher::with_default_config();

    let mut query = nearby_query(10.0, SortStrategy::Rating);
    query.page = PageRequest::new(2, 10);
    let page = matcher.find_nearby(&store, &query).unwrap();

    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 5);
    // Rating 0 restaurants (ids 5, 10, ..., 25) end the list in input order
    let ids: Vec<i64> = page.items.iter().map(|r| r.entity.id).collect();
    assert_eq!(ids, vec![5, 10, 15, 20, 25]);
}

#[test]
fn test_nearby_non_positive_radius_uses_default() {
    // ~30 km north, inside the 50 km default
    let store = MemoryStore::new(
        vec![restaurant(1, "Suburb", 12.90 + 30.0 * KM_IN_DEGREES, 77.60, None)],
        vec![],
    );

    let page = Matcher::with_default_config()
        .find_nearby(&store, &nearby_query(0.0, SortStrategy::Distance))
        .unwrap();

    assert_eq!(page.total_count, 1);
}

#[test]
fn test_courier_assignment_prefers_proximity() {
    let matcher = Matcher::with_default_config();
    let pickup = center();
    let couriers = vec![
        // 5 km away, perfect rating: 0.7 * 0.5 + 0.3 * 1.0 = 0.65
        courier(1, 12.90 + 5.0 * KM_IN_DEGREES, 77.60, 5.0),
        // At the pickup, average rating: 0.7 * 1.0 + 0.3 * 0.6 = 0.88
        courier(2, 12.90, 77.60, 3.0),
    ];

    let selection = matcher.assign_best_courier(Some(&pickup), &couriers);
    assert_eq!(selection.courier().map(|c| c.id), Some(2));
}

#[test]
fn test_courier_assignment_with_custom_weights() {
    let matcher = Matcher::new(MatcherConfig {
        weights: ScoringWeights {
            proximity_weight: 0.0,
            rating_weight: 1.0,
            max_distance_km: 10.0,
        },
        ..MatcherConfig::default()
    });
    let pickup = center();
    let couriers = vec![courier(1, 12.90, 77.60, 3.0), courier(2, 13.5, 78.0, 4.9)];

    let selection = matcher.assign_best_courier(Some(&pickup), &couriers);
    assert_eq!(selection.courier().map(|c| c.id), Some(2));
}

#[tokio::test]
async fn test_assignment_through_memory_store() {
    let store = MemoryStore::new(
        vec![],
        vec![courier(1, 12.90, 77.60, 4.0), courier(2, 12.95, 77.60, 4.0)],
    );
    let matcher = Matcher::with_default_config();
    let pickup = center();

    let first = assign_with_retry(
        &matcher,
        100,
        Some(&pickup),
        store.available_couriers().unwrap(),
        3,
        |courier_id, _| ready(store.commit_assignment(100, courier_id)),
    )
    .await
    .unwrap();
    assert_eq!(first.courier.id, 1);

    let second = assign_with_retry(
        &matcher,
        101,
        Some(&pickup),
        store.available_couriers().unwrap(),
        3,
        |courier_id, _| ready(store.commit_assignment(101, courier_id)),
    )
    .await
    .unwrap();
    assert_eq!(second.courier.id, 2);

    let third = assign_with_retry(
        &matcher,
        102,
        Some(&pickup),
        store.available_couriers().unwrap(),
        3,
        |courier_id, _| ready(store.commit_assignment(102, courier_id)),
    )
    .await;
    assert!(matches!(third, Err(AssignmentError::NoneAvailable)));
}

#[tokio::test]
async fn test_stale_snapshot_retries_on_conflict() {
    let store = MemoryStore::new(
        vec![],
        vec![courier(1, 12.90, 77.60, 4.0), courier(2, 12.95, 77.60, 4.0)],
    );
    let matcher = Matcher::with_default_config();
    let pickup = center();

    // Snapshot taken before another order claims courier 1
    let snapshot = store.available_couriers().unwrap();
    store.commit_assignment(99, 1).unwrap();

    let assignment = assign_with_retry(
        &matcher,
        100,
        Some(&pickup),
        snapshot,
        3,
        |courier_id, _| ready(store.commit_assignment(100, courier_id)),
    )
    .await
    .unwrap();

    assert_eq!(assignment.courier.id, 2);
    assert_eq!(store.assignment_for(100).unwrap(), Some(2));
}

#[test]
fn test_exact_search_then_fuzzy_fallback() {
    let store = MemoryStore::new(
        vec![
            restaurant(1, "Pizza Hut", 12.9, 77.6, None),
            restaurant(2, "Burger King", 12.9, 77.6, None),
            restaurant(3, "Pasta Street", 12.9, 77.6, None),
        ],
        vec![],
    );
    let matcher = Matcher::with_default_config();
    let page = PageRequest::new(0, 10);

    let Ok(NameSearch::Exact(exact)) = matcher.search_by_name(&store, "pizza", page) else {
        panic!("expected exact hits for a substring of a name");
    };
    assert_eq!(exact.total_count, 1);
    assert_eq!(exact.items[0].id, 1);

    let Ok(NameSearch::Fuzzy(fuzzy)) = matcher.search_by_name(&store, "  piza hut ", page) else {
        panic!("expected a fuzzy page for a misspelt name");
    };
    assert_eq!(fuzzy.total_count, 3);
    assert_eq!(fuzzy.items[0].entity.id, 1);
    assert_eq!(fuzzy.items[0].score, 1);
}

#[test]
fn test_name_search_past_last_exact_page_goes_fuzzy() {
    let store = MemoryStore::new(
        vec![
            restaurant(1, "Pizza Hut", 12.9, 77.6, None),
            restaurant(2, "Burger King", 12.9, 77.6, None),
            restaurant(3, "Pasta Street", 12.9, 77.6, None),
        ],
        vec![],
    );
    let matcher = Matcher::with_default_config();

    // One exact hit exists, but page 1 of size 1 holds nothing
    let result = matcher
        .search_by_name(&store, "pizza", PageRequest::new(1, 1))
        .unwrap();
    assert!(result.is_fuzzy());
    assert_eq!(result.total_count(), 3);

    let result = matcher
        .search_by_name(&store, "pizza", PageRequest::new(0, 1))
        .unwrap();
    assert!(!result.is_fuzzy());
    assert_eq!(result.total_count(), 1);
}
