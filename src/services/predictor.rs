use std::sync::Arc;

use crate::artifacts::ArtifactSet;
use crate::error::{RecError, RecResult};
use crate::models::RankedCandidate;

/// Scores candidate movies with the pretrained latent-factor model
///
/// Candidate generation and scoring are separate stages on purpose: the
/// cascade produces movie ids however it likes, and this predictor turns
/// them into personalized rating estimates. A candidate the model cannot
/// score (unknown to the factorization) is skipped with a warning rather
/// than failing the whole request; only when every candidate is
/// unscorable does the request error.
pub struct CollaborativePredictor {
    artifacts: Arc<ArtifactSet>,
}

impl CollaborativePredictor {
    pub fn new(artifacts: Arc<ArtifactSet>) -> Self {
        Self { artifacts }
    }

    /// Estimated rating `user_id` would give `movie_id`, clamped to scale
    pub fn predict(&self, user_id: i64, movie_id: i64) -> RecResult<f32> {
        self.artifacts.latent.predict(user_id, movie_id)
    }

    /// Scores each candidate for `user_id`, descending by estimate
    ///
    /// Ties break by ascending movie id so repeated calls rank
    /// identically.
    pub fn score_candidates(
        &self,
        user_id: i64,
        movie_ids: &[i64],
    ) -> RecResult<Vec<RankedCandidate>> {
        let mut scored = Vec::with_capacity(movie_ids.len());
        for &movie_id in movie_ids {
            match self.predict(user_id, movie_id) {
                Ok(estimate) => scored.push(RankedCandidate {
                    movie_id,
                    score: estimate,
                }),
                Err(e) => {
                    tracing::warn!(
                        user_id = user_id,
                        movie_id = movie_id,
                        error = %e,
                        "Skipping unscorable candidate"
                    );
                }
            }
        }

        if scored.is_empty() && !movie_ids.is_empty() {
            return Err(RecError::ModelInference(format!(
                "none of the {} candidates could be scored for user {}",
                movie_ids.len(),
                user_id
            )));
        }

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.movie_id.cmp(&b.movie_id))
        });

        Ok(scored)
    }
}
