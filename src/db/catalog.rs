use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::RecResult;
use crate::models::{PopularityRow, RatingRecord};

/// Read-only view of the relational catalog
///
/// The core never writes through this seam: rating records, category
/// membership, and the precomputed popularity table are owned by external
/// storage and consumed as reference data. The trait keeps the engine
/// testable with in-memory fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// All rating records for one user, in storage order
    async fn ratings_for_user(&self, user_id: i64) -> RecResult<Vec<RatingRecord>>;

    /// (movie_id, category) membership pairs for the given movies
    async fn categories_for_movies(&self, movie_ids: Vec<i64>) -> RecResult<Vec<(i64, String)>>;

    /// Precomputed popularity rows for the given categories
    ///
    /// Movies without a row for a category had too few votes to be
    /// statistically meaningful there and are simply absent.
    async fn popularity_for_categories(
        &self,
        categories: Vec<String>,
    ) -> RecResult<Vec<PopularityRow>>;
}

/// `CatalogStore` over the staging tables in PostgreSQL
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a small pool sized for the catalog's short point lookups
    ///
    /// Every query this store runs is a single-user or single-list read,
    /// so a handful of connections covers concurrent requests.
    pub async fn connect(database_url: &str) -> RecResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalog {
    async fn ratings_for_user(&self, user_id: i64) -> RecResult<Vec<RatingRecord>> {
        let records = sqlx::query_as::<_, RatingRecord>(
            "SELECT user_id, movie_id, rating, rated_at \
             FROM stg_rating WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(user_id = user_id, count = records.len(), "Fetched ratings");

        Ok(records)
    }

    async fn categories_for_movies(&self, movie_ids: Vec<i64>) -> RecResult<Vec<(i64, String)>> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT movie_id, genre FROM stg_genre WHERE movie_id = ANY($1)",
        )
        .bind(&movie_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn popularity_for_categories(
        &self,
        categories: Vec<String>,
    ) -> RecResult<Vec<PopularityRow>> {
        let rows = sqlx::query_as::<_, PopularityRow>(
            "SELECT movie_id, category, vote_count, weighted_rating \
             FROM stg_category_popularity WHERE category = ANY($1)",
        )
        .bind(&categories)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            categories = ?categories,
            count = rows.len(),
            "Fetched popularity rows"
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecError;

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = PgCatalog::connect("not-a-postgres-url").await;
        assert!(matches!(result, Err(RecError::Database(_))));
    }
}
