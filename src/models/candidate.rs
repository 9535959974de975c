use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single nearest-neighbor hit from one facet index
///
/// `similarity` is cosine similarity in [-1, 1]; higher is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub movie_id: i64,
    pub similarity: f32,
}

/// A candidate movie with its accumulated score, returned to the caller
///
/// The score is strategy-dependent (cosine similarity, weighted sum, or
/// predicted rating) and is not comparable across strategies. Movie ids
/// are unique within one ranked result set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub movie_id: i64,
    pub score: f32,
}

/// One rating a user gave a movie, read-only reference data
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RatingRecord {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f32,
    pub rated_at: DateTime<Utc>,
}

/// One precomputed popularity score for a (movie, category) pair
///
/// The weighted rating is computed offline at a fixed vote-count
/// percentile; movies without a row lacked the votes to be statistically
/// meaningful in that category.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PopularityRow {
    pub movie_id: i64,
    pub category: String,
    pub vote_count: i64,
    pub weighted_rating: f32,
}
