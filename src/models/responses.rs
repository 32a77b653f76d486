use serde::{Deserialize, Serialize};
use crate::models::domain::{CourierCandidate, NameSearch, Page, RestaurantCandidate, ScoredResult};

/// Restaurant with its distance from the search center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyRestaurant {
    #[serde(flatten)]
    pub restaurant: RestaurantCandidate,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

impl From<ScoredResult<RestaurantCandidate>> for NearbyRestaurant {
    fn from(result: ScoredResult<RestaurantCandidate>) -> Self {
        Self {
            restaurant: result.entity,
            distance_km: result.score,
        }
    }
}

/// Which strategy produced a search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Exact,
    Fuzzy,
}

/// Restaurant returned by name search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub restaurant: RestaurantCandidate,
    /// Only set for fuzzy matches
    #[serde(rename = "editDistance", skip_serializing_if = "Option::is_none", default)]
    pub edit_distance: Option<usize>,
}

impl From<RestaurantCandidate> for SearchHit {
    fn from(restaurant: RestaurantCandidate) -> Self {
        Self {
            restaurant,
            edit_distance: None,
        }
    }
}

impl From<ScoredResult<RestaurantCandidate, usize>> for SearchHit {
    fn from(result: ScoredResult<RestaurantCandidate, usize>) -> Self {
        Self {
            restaurant: result.entity,
            edit_distance: Some(result.score),
        }
    }
}

/// Response for the name search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub mode: SearchMode,
    #[serde(flatten)]
    pub page: Page<SearchHit>,
}

impl From<NameSearch<RestaurantCandidate>> for SearchResponse {
    fn from(result: NameSearch<RestaurantCandidate>) -> Self {
        match result {
            NameSearch::Exact(page) => Self {
                mode: SearchMode::Exact,
                page: page.map(SearchHit::from),
            },
            NameSearch::Fuzzy(page) => Self {
                mode: SearchMode::Fuzzy,
                page: page.map(SearchHit::from),
            },
        }
    }
}

/// Response for a committed courier assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    #[serde(rename = "orderId")]
    pub order_id: i64,
    pub courier: CourierCandidate,
    pub score: f64,
    #[serde(rename = "assignedAt")]
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
        }
    }
}
