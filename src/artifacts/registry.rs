use std::collections::HashMap;

use crate::artifacts::index::SimilarityIndex;
use crate::error::{RecError, RecResult};
use crate::models::{Facet, FacetVectors, Neighbor};

/// Slot-id to movie-id mapping shared by every facet index
///
/// Loaded once, immutable for the process lifetime. Every slot an index
/// can return must resolve here; the registry enforces that at
/// construction so lookups never miss at request time.
#[derive(Debug, Clone)]
pub struct SlotMapping {
    slots: Vec<i64>,
}

impl SlotMapping {
    pub fn new(slots: Vec<i64>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn movie_id(&self, slot: usize) -> Option<i64> {
        self.slots.get(slot).copied()
    }
}

/// Holds one similarity index per facet plus the shared slot mapping
pub struct IndexRegistry {
    indexes: HashMap<Facet, SimilarityIndex>,
    mapping: SlotMapping,
}

impl IndexRegistry {
    /// Assembles the registry, enforcing the load-time invariants:
    /// one index per facet, uniform dimension, and every index exactly
    /// covered by the slot mapping.
    pub fn new(indexes: HashMap<Facet, SimilarityIndex>, mapping: SlotMapping) -> RecResult<Self> {
        let mut dim = None;
        for facet in Facet::ALL {
            let index = indexes.get(&facet).ok_or_else(|| {
                RecError::Configuration(format!("missing similarity index for facet '{}'", facet))
            })?;

            match dim {
                None => dim = Some(index.dim()),
                Some(d) if d != index.dim() => {
                    return Err(RecError::Configuration(format!(
                        "facet '{}' index dimension {} differs from {}",
                        facet,
                        index.dim(),
                        d
                    )));
                }
                Some(_) => {}
            }

            if index.len() != mapping.len() {
                return Err(RecError::Configuration(format!(
                    "facet '{}' index has {} slots but the mapping has {} entries",
                    facet,
                    index.len(),
                    mapping.len()
                )));
            }
        }

        Ok(Self { indexes, mapping })
    }

    pub fn dim(&self) -> usize {
        // Uniform across facets, checked in new()
        self.indexes[&Facet::Title].dim()
    }

    /// Nearest neighbors in one facet's index, mapped to movie ids
    ///
    /// Results keep the index's ordering: non-increasing cosine
    /// similarity, at most `k` entries.
    pub fn search_one(&self, facet: Facet, query: &[f32], k: usize) -> RecResult<Vec<Neighbor>> {
        let index = self.indexes.get(&facet).ok_or_else(|| {
            RecError::Configuration(format!("no similarity index for facet '{}'", facet))
        })?;

        let hits = index.search(query, k)?;

        hits.into_iter()
            .map(|(similarity, slot)| {
                let movie_id = self.mapping.movie_id(slot).ok_or_else(|| {
                    RecError::Configuration(format!(
                        "facet '{}' returned slot {} absent from the id mapping",
                        facet, slot
                    ))
                })?;
                Ok(Neighbor {
                    movie_id,
                    similarity,
                })
            })
            .collect()
    }

    /// Searches every facet index with that facet's vector
    ///
    /// Returns results in `Facet::ALL` order so fusion input is
    /// deterministic.
    pub fn search_all(
        &self,
        vectors: &FacetVectors,
        k: usize,
    ) -> RecResult<Vec<(Facet, Vec<Neighbor>)>> {
        Facet::ALL
            .iter()
            .map(|&facet| {
                let neighbors = self.search_one(facet, vectors.get(facet), k)?;
                Ok((facet, neighbors))
            })
            .collect()
    }
}
