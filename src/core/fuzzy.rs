//! Approximate name matching used when exact substring search finds nothing.
//!
//! Candidates are scored by Levenshtein distance between the lower-cased
//! query and their lower-cased name. Lower is better, ties keep input order.

use crate::core::ranking::paginate;
use crate::models::{CourierCandidate, Page, PageRequest, RestaurantCandidate, ScoredResult};

/// Entities with an optional display name
pub trait Named {
    fn name(&self) -> Option<&str>;
}

impl Named for RestaurantCandidate {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Named for CourierCandidate {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Data collaborator behind name search.
///
/// `search_exact` is a case-insensitive substring match over eligible
/// entities, already paged by the store. `fetch_all_named` returns every
/// eligible entity as the candidate set for the approximate fallback.
pub trait NameSearchSource<T> {
    type Error;

    fn search_exact(&self, name: &str, page: PageRequest) -> Result<Page<T>, Self::Error>;

    fn fetch_all_named(&self) -> Result<Vec<T>, Self::Error>;
}

/// Levenshtein distance with unit insert/delete/substitute costs.
///
/// Single-row dynamic programming over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut costs: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = costs[0];
        costs[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let substitute = if ca == *cb { diagonal } else { diagonal + 1 };
            let insert_or_delete = 1 + costs[j].min(costs[j + 1]);

            diagonal = costs[j + 1];
            costs[j + 1] = substitute.min(insert_or_delete);
        }
    }

    costs[b.len()]
}

/// Score every candidate against `query` and return the requested page.
///
/// A missing name is matched as the empty string, so with an empty query
/// the shortest names come first.
pub fn fuzzy_rank<T: Named>(
    query: &str,
    candidates: Vec<T>,
    page: PageRequest,
) -> Page<ScoredResult<T, usize>> {
    let query = query.to_lowercase();

    let mut scored: Vec<ScoredResult<T, usize>> = candidates
        .into_iter()
        .map(|candidate| {
            let name = candidate.name().unwrap_or_default().to_lowercase();
            let distance = levenshtein(&name, &query);
            ScoredResult::new(candidate, distance)
        })
        .collect();

    scored.sort_by_key(|result| result.score);

    paginate(scored, page)
}
