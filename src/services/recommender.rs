use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::artifacts::ArtifactSet;
use crate::db::CatalogStore;
use crate::error::{RecError, RecResult};
use crate::models::{FacetWeights, RankedCandidate};
use crate::services::embedding::EmbeddingProvider;
use crate::services::fusion;
use crate::services::popularity;
use crate::services::predictor::CollaborativePredictor;

/// Rating-history size below which a user is treated as cold
pub const COLD_START_THRESHOLD: usize = 10;

/// Default result-set size for personalized recommendations
pub const DEFAULT_TOP_N: usize = 15;

const COLD_SEED_COUNT: usize = 3;
const COLD_NEIGHBORS_PER_SEED: usize = 5;
const WARM_CATEGORY_COUNT: usize = 3;
const WARM_CANDIDATE_COUNT: usize = 15;

const QUERY_MIN_CHARS: usize = 3;
const QUERY_MAX_CHARS: usize = 500;
const SEARCH_MAX_TOP_K: usize = 50;
const CATEGORY_MAX_TOP_K: usize = 100;

/// Entry point tying retrieval, ranking, and prediction together
///
/// Holds the loaded artifacts, the embedding provider, and the catalog
/// behind `Arc` so one engine serves many concurrent requests; all state
/// is read-only after construction.
pub struct RecommendationEngine {
    artifacts: Arc<ArtifactSet>,
    embedder: Arc<dyn EmbeddingProvider>,
    catalog: Arc<dyn CatalogStore>,
    predictor: CollaborativePredictor,
    weights: FacetWeights,
}

impl RecommendationEngine {
    /// Assembles the engine, verifying the embedding provider and the
    /// loaded indexes agree on vector dimension. A mismatch is fatal
    /// misconfiguration and belongs at warm-up, not at the first search.
    pub fn new(
        artifacts: Arc<ArtifactSet>,
        embedder: Arc<dyn EmbeddingProvider>,
        catalog: Arc<dyn CatalogStore>,
        weights: FacetWeights,
    ) -> RecResult<Self> {
        if embedder.dimension() != artifacts.registry.dim() {
            return Err(RecError::Configuration(format!(
                "embedding provider dimension {} does not match index dimension {}",
                embedder.dimension(),
                artifacts.registry.dim()
            )));
        }

        let predictor = CollaborativePredictor::new(Arc::clone(&artifacts));
        Ok(Self {
            artifacts,
            embedder,
            catalog,
            predictor,
            weights,
        })
    }

    /// Free-text search across all facet indexes, max-fused
    ///
    /// The query embeds once and probes every facet with the same vector;
    /// a strong hit on any single facet is enough to rank a movie.
    pub async fn search_by_text(
        &self,
        query: &str,
        top_k: usize,
    ) -> RecResult<Vec<RankedCandidate>> {
        let trimmed = query.trim();
        let length = trimmed.chars().count();
        if !(QUERY_MIN_CHARS..=QUERY_MAX_CHARS).contains(&length) {
            return Err(RecError::InvalidInput(format!(
                "query must be {} to {} characters after trimming, got {}",
                QUERY_MIN_CHARS, QUERY_MAX_CHARS, length
            )));
        }
        validate_top_k(top_k, SEARCH_MAX_TOP_K)?;

        let vector = self.embedder.embed(trimmed).await?;

        let mut per_facet = Vec::with_capacity(crate::models::Facet::ALL.len());
        for facet in crate::models::Facet::ALL {
            let neighbors = self.artifacts.registry.search_one(facet, &vector, top_k)?;
            per_facet.push((facet, neighbors));
        }

        let ranked = fusion::max_fuse(&per_facet, top_k);
        tracing::info!(
            query_chars = length,
            top_k = top_k,
            results = ranked.len(),
            "Text search complete"
        );
        Ok(ranked)
    }

    /// Movies most similar to `movie_id`, weighted-sum fused across facets
    pub async fn similar_items(
        &self,
        movie_id: i64,
        top_k: usize,
    ) -> RecResult<Vec<RankedCandidate>> {
        if movie_id <= 0 {
            return Err(RecError::InvalidInput(format!(
                "movie id must be positive, got {}",
                movie_id
            )));
        }
        validate_top_k(top_k, SEARCH_MAX_TOP_K)?;

        let vectors = self.artifacts.embeddings.vectors_for(movie_id).ok_or_else(|| {
            RecError::NotFound(format!("no stored vectors for movie {}", movie_id))
        })?;

        // The probe movie always matches itself; over-fetch one slot so
        // dropping it still leaves top_k results.
        let per_facet = self.artifacts.registry.search_all(vectors, top_k + 1)?;
        let mut ranked = fusion::weighted_fuse(&per_facet, &self.weights, top_k + 1);
        ranked.retain(|c| c.movie_id != movie_id);
        ranked.truncate(top_k);

        tracing::info!(
            movie_id = movie_id,
            top_k = top_k,
            results = ranked.len(),
            "Similar-items search complete"
        );
        Ok(ranked)
    }

    /// Most popular movies across the requested categories
    pub async fn top_by_categories(
        &self,
        categories: &[String],
        top_k: usize,
    ) -> RecResult<Vec<RankedCandidate>> {
        if categories.is_empty() {
            return Err(RecError::InvalidInput(
                "category list must not be empty".to_string(),
            ));
        }
        if categories.iter().any(|c| c.trim().is_empty()) {
            return Err(RecError::InvalidInput(
                "category names must not be blank".to_string(),
            ));
        }
        validate_top_k(top_k, CATEGORY_MAX_TOP_K)?;

        let rows = self
            .catalog
            .popularity_for_categories(categories.to_vec())
            .await?;
        Ok(popularity::top_k_per_category(&rows, categories, top_k))
    }

    /// Personalized recommendations for `user_id`
    ///
    /// Candidate generation cascades on rating-history size: sparse
    /// histories lean on content similarity around the user's favorite
    /// movies, dense histories on popularity within the user's preferred
    /// categories. Either way the candidates are deduplicated, re-ranked
    /// by the collaborative predictor, and cut to `top_n`. Callers with
    /// no size preference pass [`DEFAULT_TOP_N`].
    pub async fn recommend_for_user(
        &self,
        user_id: i64,
        top_n: usize,
    ) -> RecResult<Vec<RankedCandidate>> {
        if user_id <= 0 {
            return Err(RecError::InvalidInput(format!(
                "user id must be positive, got {}",
                user_id
            )));
        }
        if top_n == 0 {
            return Err(RecError::InvalidInput(
                "top_n must be positive".to_string(),
            ));
        }

        let ratings = self.catalog.ratings_for_user(user_id).await?;
        if ratings.is_empty() {
            return Err(RecError::NotFound(format!(
                "no rating history for user {}",
                user_id
            )));
        }

        let candidates = if ratings.len() < COLD_START_THRESHOLD {
            tracing::info!(
                user_id = user_id,
                ratings = ratings.len(),
                "Cold-start path: content similarity around top-rated seeds"
            );
            self.cold_candidates(&ratings)?
        } else {
            tracing::info!(
                user_id = user_id,
                ratings = ratings.len(),
                "Warm path: popularity within preferred categories"
            );
            self.warm_candidates(&ratings).await?
        };

        let deduped = dedup_forward(candidates);
        let mut ranked = self.predictor.score_candidates(user_id, &deduped)?;
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// Cold-start candidates: neighbors of the user's top-rated movies
    fn cold_candidates(&self, ratings: &[crate::models::RatingRecord]) -> RecResult<Vec<i64>> {
        // Stable sort keeps storage order among equal ratings
        let mut sorted: Vec<&crate::models::RatingRecord> = ratings.iter().collect();
        sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        let mut candidates = Vec::new();
        for seed in sorted.into_iter().take(COLD_SEED_COUNT) {
            let Some(vectors) = self.artifacts.embeddings.vectors_for(seed.movie_id) else {
                tracing::warn!(
                    movie_id = seed.movie_id,
                    "Seed movie has no stored vectors, skipping"
                );
                continue;
            };

            let per_facet = self
                .artifacts
                .registry
                .search_all(vectors, COLD_NEIGHBORS_PER_SEED + 1)?;
            let mut neighbors =
                fusion::weighted_fuse(&per_facet, &self.weights, COLD_NEIGHBORS_PER_SEED + 1);
            neighbors.retain(|c| c.movie_id != seed.movie_id);
            neighbors.truncate(COLD_NEIGHBORS_PER_SEED);

            candidates.extend(neighbors.into_iter().map(|c| c.movie_id));
        }

        Ok(candidates)
    }

    /// Warm candidates: popularity within the user's most-rated categories
    async fn warm_candidates(
        &self,
        ratings: &[crate::models::RatingRecord],
    ) -> RecResult<Vec<i64>> {
        let rated_ids: Vec<i64> = ratings.iter().map(|r| r.movie_id).collect();
        let memberships = self.catalog.categories_for_movies(rated_ids).await?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for (_, category) in memberships {
            *counts.entry(category).or_insert(0) += 1;
        }

        let mut by_frequency: Vec<(String, usize)> = counts.into_iter().collect();
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let top_categories: Vec<String> = by_frequency
            .into_iter()
            .take(WARM_CATEGORY_COUNT)
            .map(|(name, _)| name)
            .collect();

        tracing::debug!(categories = ?top_categories, "Selected preferred categories");

        let rows = self
            .catalog
            .popularity_for_categories(top_categories.clone())
            .await?;
        let ranked = popularity::top_k_per_category(&rows, &top_categories, WARM_CANDIDATE_COUNT);

        Ok(ranked.into_iter().map(|c| c.movie_id).collect())
    }
}

fn validate_top_k(top_k: usize, max: usize) -> RecResult<()> {
    if !(1..=max).contains(&top_k) {
        return Err(RecError::InvalidInput(format!(
            "top_k must be between 1 and {}, got {}",
            max, top_k
        )));
    }
    Ok(())
}

/// First occurrence of each movie id wins; later duplicates drop
fn dedup_forward(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
