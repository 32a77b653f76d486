use std::future::Future;

use thiserror::Error;

use crate::core::Matcher;
use crate::models::{CourierCandidate, CourierSelection, GeoPoint};

/// Result of trying to claim a courier for an order in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Courier flipped to unavailable and the assignment was recorded
    Committed {
        assigned_at: chrono::DateTime<chrono::Utc>,
    },
    /// Courier was no longer available when the commit ran
    Conflict,
    /// Order already has a courier
    OrderAlreadyAssigned,
}

/// Errors that can end an assignment attempt
#[derive(Debug, Error)]
pub enum AssignmentError<E> {
    #[error("No delivery partner available")]
    NoneAvailable,

    #[error("Order {0} is already assigned to a delivery partner")]
    OrderAlreadyAssigned(i64),

    #[error("Every selected delivery partner was claimed concurrently ({0} attempts)")]
    Exhausted(u32),

    #[error("Store error: {0}")]
    Store(#[source] E),
}

/// A committed courier assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub order_id: i64,
    pub courier: CourierCandidate,
    pub score: f64,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// Select a courier and commit the claim, re-selecting on conflict.
///
/// `commit` receives the winning courier id and its score and must perform
/// the available -> unavailable flip as a compare-and-set. A courier that
/// loses the race is dropped before the next selection.
pub async fn assign_with_retry<F, Fut, E>(
    matcher: &Matcher,
    order_id: i64,
    pickup: Option<&GeoPoint>,
    mut couriers: Vec<CourierCandidate>,
    max_attempts: u32,
    mut commit: F,
) -> Result<Assignment, AssignmentError<E>>
where
    F: FnMut(i64, f64) -> Fut,
    Fut: Future<Output = Result<CommitOutcome, E>>,
{
    for attempt in 1..=max_attempts {
        let winner = match matcher.assign_best_courier(pickup, &couriers) {
            CourierSelection::Selected(winner) => winner,
            CourierSelection::NoneAvailable => return Err(AssignmentError::NoneAvailable),
        };

        let courier_id = winner.entity.id;
        match commit(courier_id, winner.score).await.map_err(AssignmentError::Store)? {
            CommitOutcome::Committed { assigned_at } => {
                tracing::info!(
                    "Assigned delivery partner {} to order {} (score {:.4}, attempt {})",
                    courier_id,
                    order_id,
                    winner.score,
                    attempt
                );
                return Ok(Assignment {
                    order_id,
                    courier: winner.entity,
                    score: winner.score,
                    assigned_at,
                });
            }
            CommitOutcome::Conflict => {
                tracing::warn!(
                    "Delivery partner {} was claimed concurrently for order {}, reselecting",
                    courier_id,
                    order_id
                );
                couriers.retain(|c| c.id != courier_id);
            }
            CommitOutcome::OrderAlreadyAssigned => {
                return Err(AssignmentError::OrderAlreadyAssigned(order_id));
            }
        }
    }

    Err(AssignmentError::Exhausted(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use std::convert::Infallible;
    use std::future::ready;

    fn courier(id: i64, lat: f64, rating: f64) -> CourierCandidate {
        CourierCandidate {
            id,
            name: None,
            available: true,
            location: Some(Location::new(lat, 77.60)),
            rating: Some(rating),
        }
    }

    fn pickup() -> GeoPoint {
        GeoPoint::new(12.90, 77.60).unwrap()
    }

    #[tokio::test]
    async fn test_commits_first_choice() {
        let matcher = Matcher::with_default_config();
        let couriers = vec![courier(1, 12.95, 4.0), courier(2, 12.90, 4.0)];

        let assignment = assign_with_retry(&matcher, 10, Some(&pickup()), couriers, 3, |_, _| {
            ready(Ok::<_, Infallible>(CommitOutcome::Committed {
                assigned_at: chrono::Utc::now(),
            }))
        })
        .await
        .unwrap();

        assert_eq!(assignment.courier.id, 2);
        assert_eq!(assignment.order_id, 10);
    }

    #[tokio::test]
    async fn test_conflict_falls_back_to_runner_up() {
        let matcher = Matcher::with_default_config();
        let couriers = vec![courier(1, 12.95, 4.0), courier(2, 12.90, 4.0)];
        let mut attempted = Vec::new();

        let assignment = assign_with_retry(&matcher, 10, Some(&pickup()), couriers, 3, |id, _| {
            attempted.push(id);
            let outcome = if id == 2 {
                CommitOutcome::Conflict
            } else {
                CommitOutcome::Committed {
                    assigned_at: chrono::Utc::now(),
                }
            };
            ready(Ok::<_, Infallible>(outcome))
        })
        .await
        .unwrap();

        assert_eq!(attempted, vec![2, 1]);
        assert_eq!(assignment.courier.id, 1);
    }

    #[tokio::test]
    async fn test_no_couriers() {
        let matcher = Matcher::with_default_config();

        let result = assign_with_retry(&matcher, 10, Some(&pickup()), vec![], 3, |_, _| {
            ready(Ok::<_, Infallible>(CommitOutcome::Conflict))
        })
        .await;

        assert!(matches!(result, Err(AssignmentError::NoneAvailable)));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let matcher = Matcher::with_default_config();
        let couriers = (1..=5).map(|id| courier(id, 12.90, 4.0)).collect();

        let result = assign_with_retry(&matcher, 10, Some(&pickup()), couriers, 2, |_, _| {
            ready(Ok::<_, Infallible>(CommitOutcome::Conflict))
        })
        .await;

        assert!(matches!(result, Err(AssignmentError::Exhausted(2))));
    }

    #[tokio::test]
    async fn test_order_already_assigned() {
        let matcher = Matcher::with_default_config();
        let couriers = vec![courier(1, 12.90, 4.0)];

        let result = assign_with_retry(&matcher, 10, Some(&pickup()), couriers, 3, |_, _| {
            ready(Ok::<_, Infallible>(CommitOutcome::OrderAlreadyAssigned))
        })
        .await;

        assert!(matches!(result, Err(AssignmentError::OrderAlreadyAssigned(10))));
    }

    #[tokio::test]
    async fn test_store_error_is_propagated() {
        let matcher = Matcher::with_default_config();
        let couriers = vec![courier(1, 12.90, 4.0)];

        let result = assign_with_retry(&matcher, 10, Some(&pickup()), couriers, 3, |_, _| {
            ready(Err::<CommitOutcome, _>(std::io::Error::other("connection reset")))
        })
        .await;

        match result {
            Err(AssignmentError::Store(e)) => assert_eq!(e.to_string(), "connection reset"),
            other => panic!("expected store error, got {:?}", other),
        }
    }
}
