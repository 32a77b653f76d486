//! Feasto engine - matching and ranking for the Feasto food delivery platform
//!
//! Finds restaurants near a customer, ranks them by distance or rating,
//! auto-assigns the best available delivery courier to an order and falls
//! back to edit-distance matching when a restaurant name search has no
//! exact hits.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{
    distance::{bounding_box, haversine_distance},
    Matcher, MatcherConfig, NearbyQuery,
};
pub use self::models::{
    BoundingBox, CourierCandidate, CourierSelection, GeoPoint, Location, Page, PageRequest,
    RestaurantCandidate, ScoredResult, ScoringWeights, SortStrategy,
};
