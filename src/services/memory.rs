use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::core::{BoundingBoxSource, NameSearchSource};
use crate::models::{BoundingBox, CourierCandidate, Page, PageRequest, RestaurantCandidate};
use crate::services::assignment::CommitOutcome;

/// Errors that can occur with the in-memory store
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct CourierState {
    couriers: Vec<CourierCandidate>,
    // order id -> courier id
    assignments: HashMap<i64, i64>,
}

/// In-process snapshot store
///
/// Holds restaurants read-only and guards courier availability behind a
/// single lock, so `commit_assignment` is an atomic compare-and-set just
/// like the database transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    restaurants: Vec<RestaurantCandidate>,
    couriers: Mutex<CourierState>,
}

impl MemoryStore {
    pub fn new(restaurants: Vec<RestaurantCandidate>, couriers: Vec<CourierCandidate>) -> Self {
        Self {
            restaurants,
            couriers: Mutex::new(CourierState {
                couriers,
                assignments: HashMap::new(),
            }),
        }
    }

    pub fn active_restaurants(&self) -> Vec<RestaurantCandidate> {
        self.restaurants.iter().filter(|r| r.is_active).cloned().collect()
    }

    /// Case-insensitive substring search over active restaurants
    pub fn search_by_name(&self, name: &str, page: PageRequest) -> Page<RestaurantCandidate> {
        let needle = name.to_lowercase();
        let matches: Vec<RestaurantCandidate> = self
            .restaurants
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| {
                r.name
                    .as_deref()
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        crate::core::paginate(matches, page)
    }

    pub fn available_couriers(&self) -> Result<Vec<CourierCandidate>, MemoryStoreError> {
        let state = self.couriers.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(state.couriers.iter().filter(|c| c.available).cloned().collect())
    }

    pub fn courier(&self, id: i64) -> Result<Option<CourierCandidate>, MemoryStoreError> {
        let state = self.couriers.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(state.couriers.iter().find(|c| c.id == id).cloned())
    }

    pub fn assignment_for(&self, order_id: i64) -> Result<Option<i64>, MemoryStoreError> {
        let state = self.couriers.lock().map_err(|_| MemoryStoreError::Poisoned)?;
        Ok(state.assignments.get(&order_id).copied())
    }

    /// Flip the courier to unavailable and record the assignment, atomically
    pub fn commit_assignment(
        &self,
        order_id: i64,
        courier_id: i64,
    ) -> Result<CommitOutcome, MemoryStoreError> {
        let mut state = self.couriers.lock().map_err(|_| MemoryStoreError::Poisoned)?;

        if state.assignments.contains_key(&order_id) {
            return Ok(CommitOutcome::OrderAlreadyAssigned);
        }

        let Some(courier) = state
            .couriers
            .iter_mut()
            .find(|c| c.id == courier_id && c.available)
        else {
            return Ok(CommitOutcome::Conflict);
        };

        courier.available = false;
        state.assignments.insert(order_id, courier_id);

        Ok(CommitOutcome::Committed {
            assigned_at: chrono::Utc::now(),
        })
    }
}

impl BoundingBoxSource<RestaurantCandidate> for MemoryStore {
    type Error = MemoryStoreError;

    fn fetch_by_bounding_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<RestaurantCandidate>, Self::Error> {
        Ok(self
            .restaurants
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| {
                r.location
                    .and_then(|l| l.point())
                    .map(|p| bbox.contains(&p))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

impl NameSearchSource<RestaurantCandidate> for MemoryStore {
    type Error = MemoryStoreError;

    fn search_exact(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<RestaurantCandidate>, Self::Error> {
        Ok(self.search_by_name(name, page))
    }

    fn fetch_all_named(&self) -> Result<Vec<RestaurantCandidate>, Self::Error> {
        Ok(self.active_restaurants())
    }
}
