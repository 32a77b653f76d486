// Service exports
pub mod assignment;
pub mod cache;
pub mod memory;
pub mod postgres;

pub use assignment::{assign_with_retry, Assignment, AssignmentError, CommitOutcome};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::{MemoryStore, MemoryStoreError};
pub use postgres::{PostgresClient, PostgresError};
