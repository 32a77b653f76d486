use std::cmp::Ordering;

use crate::models::{CourierCandidate, Page, PageRequest, RestaurantCandidate, ScoredResult, SortStrategy};

/// Entities carrying an optional average rating
pub trait Rated {
    fn rating(&self) -> Option<f64>;

    /// Rating used for ordering; unknown or non-finite ratings count as 0.0
    fn rating_or_zero(&self) -> f64 {
        self.rating().filter(|r| r.is_finite()).unwrap_or(0.0)
    }
}

impl Rated for RestaurantCandidate {
    fn rating(&self) -> Option<f64> {
        self.rating
    }
}

impl Rated for CourierCandidate {
    fn rating(&self) -> Option<f64> {
        self.rating
    }
}

/// Order `(entity, distance)` pairs by the chosen strategy.
///
/// Both orderings are stable, so ties keep input order.
pub fn rank<T: Rated>(mut results: Vec<ScoredResult<T>>, sort: SortStrategy) -> Vec<ScoredResult<T>> {
    match sort {
        SortStrategy::Distance => results.sort_by(|a, b| {
            a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)
        }),
        SortStrategy::Rating => results.sort_by(|a, b| {
            b.entity
                .rating_or_zero()
                .partial_cmp(&a.entity.rating_or_zero())
                .unwrap_or(Ordering::Equal)
        }),
    }
    results
}

/// Slice an ordered collection into one page.
///
/// Never fails: out-of-range or malformed page coordinates produce an empty
/// page whose `total_count` still reports the full collection.
pub fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total_count = items.len();

    let items = match page.bounds(total_count) {
        Some((start, end)) => items.into_iter().skip(start).take(end - start).collect(),
        None => Vec::new(),
    };

    Page::new(items, page, total_count)
}

/// Rank then paginate in one step
pub fn rank_page<T: Rated>(
    results: Vec<ScoredResult<T>>,
    sort: SortStrategy,
    page: PageRequest,
) -> Page<ScoredResult<T>> {
    paginate(rank(results, sort), page)
}
