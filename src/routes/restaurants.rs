use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{Matcher, NearbyQuery};
use crate::models::{
    ErrorResponse, GeoPoint, NearbyParams, NearbyRestaurant, Page, PageRequest, SearchParams,
    SearchResponse, SortStrategy,
};
use crate::routes::AppState;
use crate::services::CacheKey;

/// Sort applied when the caller omits `sort`
const DEFAULT_SORT: &str = "distance";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/restaurants/nearby", web::get().to(nearby_restaurants))
        .route("/restaurants/search", web::get().to(search_restaurants));
}

/// Page request with the size capped at `max_page_size`
fn capped_page(matcher: &Matcher, page: Option<i64>, limit: Option<i64>, max_page_size: i64) -> PageRequest {
    let request = matcher.page_request(page, limit);
    PageRequest::new(request.index, request.size.min(max_page_size))
}

fn sort_strategy(sort: Option<&str>) -> SortStrategy {
    SortStrategy::from(sort.unwrap_or(DEFAULT_SORT))
}

/// Nearby restaurants endpoint
///
/// GET /api/v1/restaurants/nearby?mylat=..&mylon=..&page=0&limit=10&sort=distance&maxDistanceKm=50
async fn nearby_restaurants(
    state: web::Data<AppState>,
    params: web::Query<NearbyParams>,
) -> impl Responder {
    if let Err(errors) = params.validate() {
        tracing::info!("Validation failed for nearby request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let Some(center) = GeoPoint::new(params.mylat, params.mylon) else {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            "mylat and mylon must be finite coordinates",
            400,
        ));
    };

    let radius_km = state.matcher.radius_km(params.max_distance_km);
    let query = NearbyQuery {
        center,
        radius_km: Some(radius_km),
        sort: sort_strategy(params.sort.as_deref()),
        page: capped_page(&state.matcher, params.page, params.limit, state.search.max_page_size),
    };

    let cache_key = CacheKey::nearby(&center, radius_km, query.sort, query.page.index, query.page.size);
    if let Ok(cached) = state.cache.get::<Page<NearbyRestaurant>>(&cache_key).await {
        tracing::debug!("Serving nearby page from cache: {}", cache_key);
        return HttpResponse::Ok().json(cached);
    }

    let bbox = state.matcher.search_box(&center, query.radius_km);
    let fetched = match state.postgres.fetch_restaurants_in_box(&bbox).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::error!("Failed to fetch restaurants near ({}, {}): {}", center.latitude, center.longitude, e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to fetch restaurants",
                e.to_string(),
                500,
            ));
        }
    };

    let page = state.matcher.rank_nearby(&query, fetched).map(NearbyRestaurant::from);

    tracing::info!(
        "Returning {} of {} nearby restaurants (radius {} km, sort {})",
        page.items.len(),
        page.total_count,
        radius_km,
        query.sort.as_str()
    );

    if let Err(e) = state.cache.set(&cache_key, &page).await {
        tracing::warn!("Failed to cache nearby page: {}", e);
    }

    HttpResponse::Ok().json(page)
}

/// Restaurant name search endpoint
///
/// GET /api/v1/restaurants/search?name=..&page=0&limit=10
///
/// Exact case-insensitive substring matches win; when the requested exact
/// page is empty the query is matched approximately against every active
/// restaurant.
async fn search_restaurants(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> impl Responder {
    if let Err(errors) = params.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let page = capped_page(&state.matcher, params.page, params.limit, state.search.max_page_size);

    let exact = match state.postgres.search_restaurants_by_name(&params.name, page).await {
        Ok(exact) => exact,
        Err(e) => {
            tracing::error!("Name search failed for {:?}: {}", params.name, e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to search restaurants",
                e.to_string(),
                500,
            ));
        }
    };

    if let Some(result) = state.matcher.accept_exact(exact) {
        return HttpResponse::Ok().json(SearchResponse::from(result));
    }

    let candidates = match state.postgres.fetch_active_restaurants().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to load restaurants for fuzzy search: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to search restaurants",
                e.to_string(),
                500,
            ));
        }
    };

    let result = state.matcher.fuzzy_fallback(&params.name, candidates, page);

    HttpResponse::Ok().json(SearchResponse::from(result))
}
