pub mod embedding_store;
pub mod index;
pub mod latent;
pub mod registry;

pub use embedding_store::{EmbeddingStore, MovieEmbeddingRecord};
pub use index::SimilarityIndex;
pub use latent::{LatentFactorModel, LatentModelFile};
pub use registry::{IndexRegistry, SlotMapping};

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RecError, RecResult};
use crate::models::Facet;

/// Fixed, versioned artifact file names under the configured directory
pub const SLOT_MAPPING_FILE: &str = "slot_to_movie.json";
pub const MOVIE_EMBEDDINGS_FILE: &str = "movie_embeddings.json";
pub const LATENT_MODEL_FILE: &str = "latent_model.json";

/// On-disk layout of one facet index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    pub dim: usize,
    pub vectors: Vec<Vec<f32>>,
}

fn index_file_name(facet: Facet) -> String {
    format!("index_{}.json", facet.as_str())
}

/// Every offline-trained artifact the engine serves from
///
/// Loaded once during process warm-up (loading takes seconds and must not
/// happen on the request path), then shared read-only across all requests.
/// Swapped only at process restart.
pub struct ArtifactSet {
    pub registry: IndexRegistry,
    pub embeddings: EmbeddingStore,
    pub latent: LatentFactorModel,
}

impl ArtifactSet {
    /// Loads and validates all artifacts from `dir`
    ///
    /// Any missing or malformed file is a fatal configuration error,
    /// surfaced before the process starts serving.
    pub fn load(dir: impl AsRef<Path>, dim: usize) -> RecResult<Self> {
        let dir = dir.as_ref();

        tracing::info!(dir = %dir.display(), "Loading slot-id mapping");
        let slots: Vec<i64> = read_json(&dir.join(SLOT_MAPPING_FILE))?;
        let mapping = SlotMapping::new(slots);

        let mut indexes = HashMap::new();
        for facet in Facet::ALL {
            let path = dir.join(index_file_name(facet));
            tracing::info!(facet = %facet, path = %path.display(), "Loading similarity index");
            let file: IndexFile = read_json(&path)?;
            if file.dim != dim {
                return Err(RecError::Configuration(format!(
                    "facet '{}' index declares dimension {}, configured dimension is {}",
                    facet, file.dim, dim
                )));
            }
            indexes.insert(facet, SimilarityIndex::new(file.dim, file.vectors)?);
        }
        let registry = IndexRegistry::new(indexes, mapping)?;

        tracing::info!("Loading movie embedding store");
        let records: Vec<MovieEmbeddingRecord> = read_json(&dir.join(MOVIE_EMBEDDINGS_FILE))?;
        let embeddings = EmbeddingStore::new(records, dim)?;

        tracing::info!("Loading latent-factor model");
        let model_file: LatentModelFile = read_json(&dir.join(LATENT_MODEL_FILE))?;
        let latent = LatentFactorModel::new(model_file)?;

        tracing::info!(
            dim = registry.dim(),
            movies_with_embeddings = embeddings.len(),
            "All artifacts loaded"
        );

        Ok(Self {
            registry,
            embeddings,
            latent,
        })
    }

    /// Assembles a set from already-built parts (tests, alternate loaders)
    pub fn from_parts(
        registry: IndexRegistry,
        embeddings: EmbeddingStore,
        latent: LatentFactorModel,
    ) -> Self {
        Self {
            registry,
            embeddings,
            latent,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> RecResult<T> {
    let file = File::open(path).map_err(|e| {
        RecError::Configuration(format!("cannot open artifact {}: {}", path.display(), e))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        RecError::Configuration(format!("cannot parse artifact {}: {}", path.display(), e))
    })
}
