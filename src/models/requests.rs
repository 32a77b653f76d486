use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the nearby-restaurants endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub mylat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub mylon: f64,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
}

/// Query string of the restaurant name search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Request to auto-assign a courier to an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignCourierRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "restaurant_id", rename = "restaurantId")]
    pub restaurant_id: i64,
}
