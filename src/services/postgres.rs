use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::{BoundingBox, CourierCandidate, Location, Page, PageRequest, RestaurantCandidate};
use crate::services::assignment::CommitOutcome;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

const RESTAURANT_COLUMNS: &str = "restaurant_id, name, is_active, latitude, longitude, rating";
const COURIER_COLUMNS: &str = "delivery_partner_id, name, available, latitude, longitude, average_rating";

/// PostgreSQL store for restaurant and courier snapshots
///
/// Provides the box-constrained geo read, the exact name search and the
/// transactional availability flip the engine relies on. Rows come back
/// ordered by id so ranking ties resolve the same way on every call.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Active restaurants whose stored coordinates fall inside the box
    pub async fn fetch_restaurants_in_box(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<RestaurantCandidate>, PostgresError> {
        let query = format!(
            r#"
            SELECT {RESTAURANT_COLUMNS}
            FROM restaurants
            WHERE is_active = TRUE
              AND latitude BETWEEN $1 AND $2
              AND (longitude BETWEEN $3 AND $4 OR longitude BETWEEN $5 AND $6)
            ORDER BY restaurant_id
            "#
        );

        let ranges = bbox.longitude_ranges();
        let (west_min, west_max) = ranges[0];
        let (east_min, east_max) = ranges.get(1).copied().unwrap_or(ranges[0]);

        let rows = sqlx::query(&query)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(west_min)
            .bind(west_max)
            .bind(east_min)
            .bind(east_max)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Bounding box query returned {} restaurants", rows.len());

        rows.iter().map(restaurant_from_row).collect::<Result<_, _>>().map_err(Into::into)
    }

    pub async fn fetch_restaurant(&self, id: i64) -> Result<Option<RestaurantCandidate>, PostgresError> {
        let query = format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE restaurant_id = $1");

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(restaurant_from_row).transpose().map_err(Into::into)
    }

    /// Every active restaurant, the candidate set for fuzzy name matching
    pub async fn fetch_active_restaurants(&self) -> Result<Vec<RestaurantCandidate>, PostgresError> {
        let query = format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE is_active = TRUE ORDER BY restaurant_id"
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(restaurant_from_row).collect::<Result<_, _>>().map_err(Into::into)
    }

    /// Case-insensitive substring search over active restaurants, paged in SQL
    pub async fn search_restaurants_by_name(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<RestaurantCandidate>, PostgresError> {
        let pattern = format!("%{}%", escape_like(name));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM restaurants
            WHERE is_active = TRUE AND name ILIKE $1 ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let total = usize::try_from(total).unwrap_or(0);
        let Some((start, end)) = page.bounds(total) else {
            return Ok(Page::new(Vec::new(), page, total));
        };

        let query = format!(
            r#"
            SELECT {RESTAURANT_COLUMNS}
            FROM restaurants
            WHERE is_active = TRUE AND name ILIKE $1 ESCAPE '\'
            ORDER BY restaurant_id
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&query)
            .bind(&pattern)
            .bind((end - start) as i64)
            .bind(start as i64)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(restaurant_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page, total))
    }

    pub async fn fetch_available_couriers(&self) -> Result<Vec<CourierCandidate>, PostgresError> {
        let query = format!(
            "SELECT {COURIER_COLUMNS} FROM delivery_partners WHERE available = TRUE ORDER BY delivery_partner_id"
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(courier_from_row).collect::<Result<_, _>>().map_err(Into::into)
    }

    /// Claim a courier for an order
    ///
    /// The availability flip is a compare-and-set inside a transaction: it
    /// only succeeds while the courier is still available, so two concurrent
    /// assignments can never both win the same courier.
    pub async fn commit_assignment(
        &self,
        order_id: i64,
        courier_id: i64,
        score: f64,
    ) -> Result<CommitOutcome, PostgresError> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE delivery_partners
            SET available = FALSE, updated_at = NOW()
            WHERE delivery_partner_id = $1 AND available = TRUE
            "#,
        )
        .bind(courier_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(CommitOutcome::Conflict);
        }

        let assigned_at: Option<chrono::DateTime<chrono::Utc>> = sqlx::query_scalar(
            r#"
            INSERT INTO courier_assignments (order_id, delivery_partner_id, score, assigned_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (order_id) DO NOTHING
            RETURNING assigned_at
            "#,
        )
        .bind(order_id)
        .bind(courier_id)
        .bind(score)
        .fetch_optional(&mut *tx)
        .await?;

        match assigned_at {
            Some(assigned_at) => {
                tx.commit().await?;
                Ok(CommitOutcome::Committed { assigned_at })
            }
            None => {
                tx.rollback().await?;
                Ok(CommitOutcome::OrderAlreadyAssigned)
            }
        }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn location_from_row(row: &PgRow) -> Result<Location, sqlx::Error> {
    Ok(Location {
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

fn restaurant_from_row(row: &PgRow) -> Result<RestaurantCandidate, sqlx::Error> {
    Ok(RestaurantCandidate {
        id: row.try_get("restaurant_id")?,
        name: row.try_get("name")?,
        is_active: row.try_get("is_active")?,
        location: Some(location_from_row(row)?),
        rating: row.try_get("rating")?,
    })
}

fn courier_from_row(row: &PgRow) -> Result<CourierCandidate, sqlx::Error> {
    Ok(CourierCandidate {
        id: row.try_get("delivery_partner_id")?,
        name: row.try_get("name")?,
        available: row.try_get("available")?,
        location: Some(location_from_row(row)?),
        rating: row.try_get("average_rating")?,
    })
}

/// Escape LIKE wildcards so user input is matched literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("pizza"), "pizza");
        assert_eq!(escape_like("100%_veg"), "100\\%\\_veg");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_commit_assignment_is_compare_and_set() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let client = PostgresClient::from_settings(&url, Some(2), Some(1), None, None)
            .await
            .expect("Failed to connect");

        let courier_id: i64 = sqlx::query_scalar(
            "INSERT INTO delivery_partners (name, available) VALUES ('cas-test', TRUE) RETURNING delivery_partner_id",
        )
        .fetch_one(&client.pool)
        .await
        .unwrap();

        let first = client.commit_assignment(-courier_id, courier_id, 0.5).await.unwrap();
        let second = client.commit_assignment(-courier_id - 1, courier_id, 0.5).await.unwrap();

        assert!(matches!(first, CommitOutcome::Committed { .. }));
        assert_eq!(second, CommitOutcome::Conflict);
    }
}
