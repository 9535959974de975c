//! Hybrid movie recommendation core.
//!
//! Serves four read-only operations over offline-trained artifacts and a
//! relational catalog: free-text semantic search, similar-item lookup,
//! category popularity rankings, and personalized recommendations via a
//! cold/warm cascade re-ranked by a latent-factor rating model.
//!
//! The crate is the engine only. Routing, auth, and response shaping live
//! in the service that embeds [`RecommendationEngine`]; artifact training
//! and the popularity precomputation run in offline pipelines.

pub mod artifacts;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use artifacts::ArtifactSet;
pub use config::Config;
pub use db::{CatalogStore, PgCatalog};
pub use error::{RecError, RecResult};
pub use models::{FacetWeights, RankedCandidate};
pub use services::{
    CollaborativePredictor, EmbeddingProvider, HttpEmbeddingProvider, RecommendationEngine,
};

/// Initializes structured logging from `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
