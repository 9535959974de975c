pub mod embedding;
pub mod fusion;
pub mod popularity;
pub mod predictor;
pub mod recommender;

pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
pub use predictor::CollaborativePredictor;
pub use recommender::{RecommendationEngine, COLD_START_THRESHOLD, DEFAULT_TOP_N};
