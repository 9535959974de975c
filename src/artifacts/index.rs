use crate::error::{RecError, RecResult};

/// An immutable flat nearest-neighbor index over one facet's vectors
///
/// Rows are stored in slot order and are expected to be L2-normalized, so
/// the inner product is cosine similarity: the reported score lies in
/// [-1, 1] and **higher is better**. Sort order downstream depends on this,
/// so the metric is fixed here rather than assumed by callers.
///
/// Built offline, loaded read-only at startup; owns no movie metadata,
/// only internal slot ids.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl SimilarityIndex {
    /// Builds an index from slot-ordered vectors, validating row dimensions
    pub fn new(dim: usize, vectors: Vec<Vec<f32>>) -> RecResult<Self> {
        if dim == 0 {
            return Err(RecError::Configuration(
                "index dimension must be positive".to_string(),
            ));
        }
        for (slot, row) in vectors.iter().enumerate() {
            if row.len() != dim {
                return Err(RecError::Configuration(format!(
                    "index row at slot {} has dimension {}, expected {}",
                    slot,
                    row.len(),
                    dim
                )));
            }
        }
        Ok(Self { dim, vectors })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of slots in the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Returns the `k` nearest slots to `query` as `(similarity, slot)`
    /// pairs, sorted by non-increasing similarity, ties broken by
    /// ascending slot for determinism.
    ///
    /// A query whose dimension does not match the index is a fatal
    /// configuration error, never silently truncated or padded.
    pub fn search(&self, query: &[f32], k: usize) -> RecResult<Vec<(f32, usize)>> {
        if query.len() != self.dim {
            return Err(RecError::Configuration(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(slot, row)| (dot(query, row), slot))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
