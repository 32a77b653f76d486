use crate::core::{
    filters::{self, BoundingBoxSource, DEFAULT_SEARCH_RADIUS_KM},
    fuzzy::{fuzzy_rank, NameSearchSource, Named},
    ranking::rank_page,
    scoring::select_best_courier,
};
use crate::models::{
    BoundingBox, CourierCandidate, CourierSelection, GeoPoint, NameSearch, Page, PageRequest,
    RestaurantCandidate, ScoredResult, ScoringWeights, SortStrategy,
};

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Tunables for the three engine entry points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub weights: ScoringWeights,
    pub default_radius_km: f64,
    pub default_page_size: i64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            default_radius_km: DEFAULT_SEARCH_RADIUS_KM,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Parameters of a nearby-restaurant search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_km: Option<f64>,
    pub sort: SortStrategy,
    pub page: PageRequest,
}

/// Matching & ranking orchestrator
///
/// # Entry points
/// 1. `find_nearby` - bounding box fetch, exact distance, rank, page
/// 2. `assign_best_courier` - weighted proximity/rating selection
/// 3. `fuzzy_search_by_name` - edit-distance fallback for name search
///
/// Holds configuration only, so it is cheap to clone into every worker.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self {
            config: MatcherConfig::default(),
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Build a page request, filling in the configured default size
    pub fn page_request(&self, page: Option<i64>, page_size: Option<i64>) -> PageRequest {
        PageRequest::new(
            page.unwrap_or(0),
            page_size.unwrap_or(self.config.default_page_size),
        )
    }

    /// Effective radius for a requested one
    pub fn radius_km(&self, requested_km: Option<f64>) -> f64 {
        filters::resolve_radius(requested_km, self.config.default_radius_km)
    }

    /// Box to hand to an asynchronous store before calling [`Matcher::rank_nearby`]
    pub fn search_box(&self, center: &GeoPoint, requested_km: Option<f64>) -> BoundingBox {
        filters::search_box(center, self.radius_km(requested_km))
    }

    /// Refine box-fetched restaurants with exact distances, then rank and page them
    pub fn rank_nearby(
        &self,
        query: &NearbyQuery,
        fetched: Vec<RestaurantCandidate>,
    ) -> Page<ScoredResult<RestaurantCandidate>> {
        let fetched_count = fetched.len();
        let located = filters::with_exact_distances(&query.center, fetched);

        tracing::debug!(
            "Nearby search kept {} of {} fetched restaurants (sort: {})",
            located.len(),
            fetched_count,
            query.sort.as_str()
        );

        rank_page(located, query.sort, query.page)
    }

    /// Find restaurants near a point through a synchronous store
    pub fn find_nearby<S>(
        &self,
        source: &S,
        query: &NearbyQuery,
    ) -> Result<Page<ScoredResult<RestaurantCandidate>>, S::Error>
    where
        S: BoundingBoxSource<RestaurantCandidate>,
    {
        let radius_km = self.radius_km(query.radius_km);
        let located = filters::nearby_candidates(source, &query.center, radius_km)?;
        Ok(rank_page(located, query.sort, query.page))
    }

    /// Choose the best available courier for a pickup point.
    ///
    /// The result is advisory: the caller still has to flip the courier's
    /// availability through a compare-and-set commit.
    pub fn assign_best_courier(
        &self,
        pickup: Option<&GeoPoint>,
        couriers: &[CourierCandidate],
    ) -> CourierSelection {
        let selection = select_best_courier(pickup, couriers, &self.config.weights);

        match &selection {
            CourierSelection::Selected(winner) => tracing::debug!(
                "Selected courier {} with score {:.4} from {} candidates",
                winner.entity.id,
                winner.score,
                couriers.len()
            ),
            CourierSelection::NoneAvailable => {
                tracing::debug!("No available courier among {} candidates", couriers.len())
            }
        }

        selection
    }

    /// Approximate name search over candidates; the query is trimmed first
    pub fn fuzzy_search_by_name<T: Named>(
        &self,
        query: &str,
        candidates: Vec<T>,
        page: PageRequest,
    ) -> Page<ScoredResult<T, usize>> {
        fuzzy_rank(query.trim(), candidates, page)
    }

    /// Keep an exact page only when it has content.
    ///
    /// An empty requested page falls back to fuzzy matching even when other
    /// pages of the exact result set would have hits.
    pub fn accept_exact<T>(&self, exact: Page<T>) -> Option<NameSearch<T>> {
        if exact.is_empty() {
            None
        } else {
            Some(NameSearch::Exact(exact))
        }
    }

    /// Fuzzy page for a query whose exact page came back empty
    pub fn fuzzy_fallback<T: Named>(
        &self,
        query: &str,
        candidates: Vec<T>,
        page: PageRequest,
    ) -> NameSearch<T> {
        tracing::debug!(
            "No exact hits for {:?}, fuzzy matching over {} candidates",
            query,
            candidates.len()
        );
        NameSearch::Fuzzy(self.fuzzy_search_by_name(query, candidates, page))
    }

    /// Name search through a synchronous store: exact substring first,
    /// edit-distance ranking when the requested page is empty
    pub fn search_by_name<T, S>(
        &self,
        source: &S,
        query: &str,
        page: PageRequest,
    ) -> Result<NameSearch<T>, S::Error>
    where
        T: Named,
        S: NameSearchSource<T>,
    {
        let exact = source.search_exact(query, page)?;
        if let Some(result) = self.accept_exact(exact) {
            return Ok(result);
        }

        let candidates = source.fetch_all_named()?;
        Ok(self.fuzzy_fallback(query, candidates, page))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}
