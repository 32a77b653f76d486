use crate::core::{distance::distance_km, filters::Candidate, ranking::Rated};
use crate::models::{CourierCandidate, CourierSelection, GeoPoint, ScoredResult, ScoringWeights};

/// Highest rating a courier can hold
pub const MAX_RATING: f64 = 5.0;

/// Calculate the assignment score for one courier
///
/// Scoring formula:
/// score = (
///     proximity_score * proximity_weight +  # 1 at the pickup, 0 at max distance
///     rating_score * rating_weight          # rating / 5, clamped to [0, 1]
/// )
///
/// A courier or pickup with unknown location scores 0 on proximity rather
/// than being excluded.
pub fn courier_score(
    courier: &CourierCandidate,
    pickup: Option<&GeoPoint>,
    weights: &ScoringWeights,
) -> f64 {
    let proximity = match (courier.position(), pickup) {
        (Some(position), Some(pickup)) => {
            proximity_score(distance_km(&position, pickup), weights.effective_max_distance())
        }
        _ => 0.0,
    };

    let rating = rating_score(courier.rating_or_zero());

    weights.proximity_weight * proximity + weights.rating_weight * rating
}

/// Linear proximity score (0-1)
#[inline]
fn proximity_score(distance_km: f64, max_distance_km: f64) -> f64 {
    1.0 - (distance_km / max_distance_km).min(1.0)
}

/// Normalised rating score (0-1)
#[inline]
fn rating_score(rating: f64) -> f64 {
    (rating / MAX_RATING).clamp(0.0, 1.0)
}

/// Pick the single best available courier for a pickup point.
///
/// Only strictly higher scores replace the current best, so the first
/// courier in input order wins a tie. Unavailable couriers are skipped.
pub fn select_best_courier(
    pickup: Option<&GeoPoint>,
    couriers: &[CourierCandidate],
    weights: &ScoringWeights,
) -> CourierSelection {
    let mut best: Option<(&CourierCandidate, f64)> = None;

    for courier in couriers.iter().filter(|c| c.is_eligible()) {
        let score = courier_score(courier, pickup, weights);
        let replaces = match best {
            Some((_, best_score)) => score > best_score,
            None => true,
        };
        if replaces {
            best = Some((courier, score));
        }
    }

    match best {
        Some((courier, score)) => CourierSelection::Selected(ScoredResult::new(courier.clone(), score)),
        None => CourierSelection::NoneAvailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn courier(id: i64, location: Option<Location>, rating: Option<f64>) -> CourierCandidate {
        CourierCandidate {
            id,
            name: Some(format!("Courier {}", id)),
            available: true,
            location,
            rating,
        }
    }

    fn pickup() -> GeoPoint {
        GeoPoint::new(12.90, 77.60).unwrap()
    }

    #[test]
    fn test_proximity_score() {
        assert_eq!(proximity_score(0.0, 10.0), 1.0);
        assert_eq!(proximity_score(5.0, 10.0), 0.5);
        assert_eq!(proximity_score(10.0, 10.0), 0.0);
        assert_eq!(proximity_score(25.0, 10.0), 0.0);
    }

    #[test]
    fn test_rating_score_is_clamped() {
        assert_eq!(rating_score(5.0), 1.0);
        assert_eq!(rating_score(2.5), 0.5);
        assert_eq!(rating_score(7.0), 1.0);
        assert_eq!(rating_score(-1.0), 0.0);
    }

    #[test]
    fn test_blend_is_additive() {
        let weights = ScoringWeights::default();
        let near_unrated = courier(1, Some(Location::new(12.90, 77.60)), Some(0.0));
        // ~111km north, well past max distance
        let far_top_rated = courier(2, Some(Location::new(13.90, 77.60)), Some(5.0));

        let near = courier_score(&near_unrated, Some(&pickup()), &weights);
        let far = courier_score(&far_top_rated, Some(&pickup()), &weights);

        assert!((near - 0.7).abs() < 1e-12);
        assert!((far - 0.3).abs() < 1e-12);

        let selection = select_best_courier(Some(&pickup()), &[far_top_rated, near_unrated], &weights);
        assert_eq!(selection.courier().map(|c| c.id), Some(1));
    }

    #[test]
    fn test_unknown_location_scores_zero_proximity() {
        let weights = ScoringWeights::default();
        let lost = courier(1, None, Some(5.0));

        assert!((courier_score(&lost, Some(&pickup()), &weights) - 0.3).abs() < 1e-12);

        let located = courier(2, Some(Location::new(12.90, 77.60)), Some(5.0));
        assert!((courier_score(&located, None, &weights) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_zero_max_distance_uses_floor() {
        let weights = ScoringWeights {
            max_distance_km: 0.0,
            ..ScoringWeights::default()
        };
        let here = courier(1, Some(Location::new(12.90, 77.60)), None);
        let score = courier_score(&here, Some(&pickup()), &weights);

        assert!(score.is_finite());
        assert!((score - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_first() {
        let weights = ScoringWeights::default();
        let couriers = vec![courier(7, None, None), courier(3, None, None)];

        match select_best_courier(Some(&pickup()), &couriers, &weights) {
            CourierSelection::Selected(winner) => {
                assert_eq!(winner.entity.id, 7);
                assert_eq!(winner.score, 0.0);
            }
            CourierSelection::NoneAvailable => panic!("tie at zero must still select a courier"),
        }
    }

    #[test]
    fn test_empty_list_has_no_candidate() {
        let selection = select_best_courier(Some(&pickup()), &[], &ScoringWeights::default());
        assert_eq!(selection, CourierSelection::NoneAvailable);
    }

    #[test]
    fn test_unavailable_couriers_are_skipped() {
        let mut busy = courier(1, Some(Location::new(12.90, 77.60)), Some(5.0));
        busy.available = false;

        let selection = select_best_courier(Some(&pickup()), &[busy], &ScoringWeights::default());
        assert_eq!(selection, CourierSelection::NoneAvailable);
    }
}
