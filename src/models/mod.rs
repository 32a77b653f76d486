// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, CourierCandidate, CourierSelection, GeoPoint, Location, NameSearch, Page, PageRequest,
    RestaurantCandidate, ScoredResult, ScoringWeights, SortStrategy,
};
pub use requests::{AssignCourierRequest, NearbyParams, SearchParams};
pub use responses::{
    AssignmentResponse, ErrorResponse, HealthResponse, NearbyRestaurant, SearchHit, SearchMode,
    SearchResponse,
};
