use serde::{Deserialize, Serialize};

/// A validated point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Self { latitude, longitude })
    }
}

/// Stored coordinates as they come out of the data store.
///
/// Either half may be missing. A location only becomes a [`GeoPoint`] when
/// both halves are present and in range; anything else is "location unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn point(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude?, self.longitude?)
    }
}

/// Restaurant snapshot handed to the engine by the data store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantCandidate {
    #[serde(rename = "restaurantId")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Delivery courier snapshot ("delivery partner")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierCandidate {
    #[serde(rename = "deliveryPartnerId")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub available: bool,
    #[serde(rename = "currentLocation", default)]
    pub location: Option<Location>,
    #[serde(rename = "averageRating", default)]
    pub rating: Option<f64>,
}

/// An entity paired with the score a ranking call gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult<T, S = f64> {
    pub entity: T,
    pub score: S,
}

impl<T, S> ScoredResult<T, S> {
    pub fn new(entity: T, score: S) -> Self {
        Self { entity, score }
    }
}

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "pageIndex")]
    pub page_index: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    /// Size of the full candidate set before slicing
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Wrap an already sliced page of a collection holding `total_count` items
    pub fn new(items: Vec<T>, page: PageRequest, total_count: usize) -> Self {
        let total_pages = match usize::try_from(page.size) {
            Ok(size) if size > 0 => total_count.div_ceil(size),
            _ => 0,
        };

        Self {
            items,
            page_index: page.index,
            page_size: page.size,
            total_count,
            total_pages,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Requested page coordinates, exactly as the caller supplied them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(index: i64, size: i64) -> Self {
        Self { index, size }
    }

    /// Slice bounds into a collection of `total` items, `None` when the page is empty
    pub fn bounds(&self, total: usize) -> Option<(usize, usize)> {
        if self.index < 0 || self.size < 1 {
            return None;
        }

        let start = usize::try_from(self.index.checked_mul(self.size)?).ok()?;
        if start >= total {
            return None;
        }

        let size = usize::try_from(self.size).ok()?;
        Some((start, start.saturating_add(size).min(total)))
    }
}

/// Ordering used when ranking nearby results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    /// Ascending by distance
    Distance,
    /// Descending by rating, unknown rating counts as 0.0
    Rating,
}

impl SortStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::Distance => "distance",
            SortStrategy::Rating => "rating",
        }
    }
}

impl From<&str> for SortStrategy {
    fn from(token: &str) -> Self {
        match token {
            "distance" => SortStrategy::Distance,
            _ => SortStrategy::Rating,
        }
    }
}

impl From<Option<&str>> for SortStrategy {
    fn from(token: Option<&str>) -> Self {
        token.map(SortStrategy::from).unwrap_or(SortStrategy::Rating)
    }
}

/// Geospatial bounding box in degrees.
///
/// Longitudes are left unwrapped, so a box around the antimeridian may have
/// `min_lon < -180` or `max_lon > 180`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Courier scoring configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub proximity_weight: f64,
    pub rating_weight: f64,
    pub max_distance_km: f64,
}

impl ScoringWeights {
    /// Smallest normalisation distance accepted by the scorer
    pub const MIN_MAX_DISTANCE_KM: f64 = 0.0001;

    pub fn effective_max_distance(&self) -> f64 {
        if self.max_distance_km.is_finite() {
            self.max_distance_km.max(Self::MIN_MAX_DISTANCE_KM)
        } else {
            Self::MIN_MAX_DISTANCE_KM
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            proximity_weight: 0.7,
            rating_weight: 0.3,
            max_distance_km: 10.0,
        }
    }
}

/// Outcome of a name search: exact substring hits, or the edit-distance fallback
#[derive(Debug, Clone, PartialEq)]
pub enum NameSearch<T> {
    Exact(Page<T>),
    Fuzzy(Page<ScoredResult<T, usize>>),
}

impl<T> NameSearch<T> {
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, NameSearch::Fuzzy(_))
    }

    pub fn total_count(&self) -> usize {
        match self {
            NameSearch::Exact(page) => page.total_count,
            NameSearch::Fuzzy(page) => page.total_count,
        }
    }
}

/// Outcome of an assignment decision
#[derive(Debug, Clone, PartialEq)]
pub enum CourierSelection {
    Selected(ScoredResult<CourierCandidate>),
    NoneAvailable,
}

impl CourierSelection {
    pub fn courier(&self) -> Option<&CourierCandidate> {
        match self {
            CourierSelection::Selected(winner) => Some(&winner.entity),
            CourierSelection::NoneAvailable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_requires_both_halves() {
        let partial = Location {
            latitude: Some(12.9),
            longitude: None,
        };
        assert!(partial.point().is_none());
        assert!(Location::default().point().is_none());
        assert!(Location::new(12.9, 77.6).point().is_some());
    }

    #[test]
    fn test_location_rejects_out_of_range() {
        assert!(Location::new(91.0, 0.0).point().is_none());
        assert!(Location::new(0.0, -180.5).point().is_none());
        assert!(Location::new(f64::NAN, 0.0).point().is_none());
    }

    #[test]
    fn test_sort_strategy_tokens() {
        assert_eq!(SortStrategy::from("distance"), SortStrategy::Distance);
        assert_eq!(SortStrategy::from("rating"), SortStrategy::Rating);
        assert_eq!(SortStrategy::from("Distance"), SortStrategy::Rating);
        assert_eq!(SortStrategy::from("popularity"), SortStrategy::Rating);
        assert_eq!(SortStrategy::from(None), SortStrategy::Rating);
    }

    #[test]
    fn test_page_request_bounds() {
        assert_eq!(PageRequest::new(0, 10).bounds(25), Some((0, 10)));
        assert_eq!(PageRequest::new(2, 10).bounds(25), Some((20, 25)));
        assert_eq!(PageRequest::new(3, 10).bounds(25), None);
        assert_eq!(PageRequest::new(-1, 10).bounds(25), None);
        assert_eq!(PageRequest::new(0, 0).bounds(25), None);
        assert_eq!(PageRequest::new(i64::MAX, i64::MAX).bounds(25), None);
    }

    #[test]
    fn test_max_distance_floor() {
        let mut weights = ScoringWeights::default();
        assert_eq!(weights.effective_max_distance(), 10.0);

        weights.max_distance_km = 0.0;
        assert_eq!(weights.effective_max_distance(), ScoringWeights::MIN_MAX_DISTANCE_KM);

        weights.max_distance_km = -5.0;
        assert_eq!(weights.effective_max_distance(), ScoringWeights::MIN_MAX_DISTANCE_KM);
    }
}
