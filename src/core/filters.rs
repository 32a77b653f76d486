use crate::core::distance::{bounding_box, distance_km};
use crate::models::{BoundingBox, CourierCandidate, GeoPoint, RestaurantCandidate, ScoredResult};

/// Radius used when the caller omits one or passes a non-positive value
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 50.0;

/// Something the engine can place on the map and filter for eligibility
pub trait Candidate {
    /// Validated position, `None` when the location is unknown or malformed
    fn position(&self) -> Option<GeoPoint>;

    /// Whether the candidate may take part in a search at all
    fn is_eligible(&self) -> bool;
}

impl Candidate for RestaurantCandidate {
    fn position(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(|l| l.point())
    }

    fn is_eligible(&self) -> bool {
        self.is_active
    }
}

impl Candidate for CourierCandidate {
    fn position(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(|l| l.point())
    }

    fn is_eligible(&self) -> bool {
        self.available
    }
}

/// Data collaborator able to return candidates stored inside a box.
///
/// Implementations are expected to filter on stored coordinates only; the
/// engine refines the result with exact distances afterwards.
pub trait BoundingBoxSource<T> {
    type Error;

    fn fetch_by_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<T>, Self::Error>;
}

/// Resolve the requested search radius, falling back to `default_km`
pub fn resolve_radius(requested_km: Option<f64>, default_km: f64) -> f64 {
    match requested_km {
        Some(radius) if radius.is_finite() && radius > 0.0 => radius,
        _ => default_km,
    }
}

/// Stage 1: the coarse box handed to the data collaborator
pub fn search_box(center: &GeoPoint, radius_km: f64) -> BoundingBox {
    bounding_box(center, radius_km)
}

/// Stage 2: attach the exact distance to every eligible, located candidate.
///
/// Candidates without a usable location are dropped, never placed at 0 km.
/// No radius cutoff is applied here; the box is the selection boundary.
pub fn with_exact_distances<T: Candidate>(
    center: &GeoPoint,
    candidates: Vec<T>,
) -> Vec<ScoredResult<T>> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.is_eligible())
        .filter_map(|candidate| {
            let position = candidate.position()?;
            let distance = distance_km(center, &position);
            Some(ScoredResult::new(candidate, distance))
        })
        .collect()
}

/// Both stages against a synchronous collaborator
pub fn nearby_candidates<T, S>(
    source: &S,
    center: &GeoPoint,
    radius_km: f64,
) -> Result<Vec<ScoredResult<T>>, S::Error>
where
    T: Candidate,
    S: BoundingBoxSource<T>,
{
    let bbox = search_box(center, radius_km);
    let fetched = source.fetch_by_bounding_box(&bbox)?;

    tracing::debug!(
        "Fetched {} candidates inside box [{:.4}, {:.4}] x [{:.4}, {:.4}]",
        fetched.len(),
        bbox.min_lat,
        bbox.max_lat,
        bbox.min_lon,
        bbox.max_lon
    );

    Ok(with_exact_distances(center, fetched))
}
