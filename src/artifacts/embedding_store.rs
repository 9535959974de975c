use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RecError, RecResult};
use crate::models::{Facet, FacetVectors};

/// On-disk record: one movie's stored facet vectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieEmbeddingRecord {
    pub movie_id: i64,
    #[serde(flatten)]
    pub vectors: FacetVectors,
}

/// Read-only lookup of per-movie, per-facet embedding vectors
///
/// Backs the similar-items flow: given a movie id, its stored vectors are
/// the queries against each facet index. Loaded once at startup.
pub struct EmbeddingStore {
    vectors: HashMap<i64, FacetVectors>,
    dim: usize,
}

impl EmbeddingStore {
    /// Builds the store, validating every vector against the expected
    /// dimension.
    pub fn new(records: Vec<MovieEmbeddingRecord>, dim: usize) -> RecResult<Self> {
        let mut vectors = HashMap::with_capacity(records.len());
        for record in records {
            for facet in Facet::ALL {
                let v = record.vectors.get(facet);
                if v.len() != dim {
                    return Err(RecError::Configuration(format!(
                        "movie {} facet '{}' vector has dimension {}, expected {}",
                        record.movie_id,
                        facet,
                        v.len(),
                        dim
                    )));
                }
            }
            vectors.insert(record.movie_id, record.vectors);
        }
        Ok(Self { vectors, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Stored vectors for a movie, `None` when the movie has no embeddings
    pub fn vectors_for(&self, movie_id: i64) -> Option<&FacetVectors> {
        self.vectors.get(&movie_id)
    }
}
