use reqwest::Client as HttpClient;
use serde::Serialize;

use crate::error::{RecError, RecResult};

/// Turns free text into a fixed-dimension, L2-normalized embedding vector
///
/// Contract: blank input (empty, whitespace-only) maps to the zero vector
/// of the configured dimension and never errors — callers treat scores
/// involving a zero vector as degenerate, not exceptional. A non-blank
/// embedding whose dimension does not match the configured one is a fatal
/// configuration error, never silently reshaped.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> RecResult<Vec<f32>>;

    /// The dimension every returned vector has
    fn dimension(&self) -> usize;
}

/// Embedding provider backed by a hosted inference API
pub struct HttpEmbeddingProvider {
    http_client: HttpClient,
    api_key: String,
    model_url: String,
    dim: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
}

impl HttpEmbeddingProvider {
    pub fn new(api_url: &str, api_key: String, model: &str, dim: usize) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            model_url: format!("{}/models/{}", api_url, model),
            dim,
        }
    }

    async fn call_api(&self, text: &str) -> RecResult<Vec<f32>> {
        let response = self
            .http_client
            .post(&self.model_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&EmbedRequest { inputs: text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Embedding API request failed");
            return Err(RecError::ModelInference(format!(
                "embedding API returned status {}: {}",
                status, body
            )));
        }

        // The inference API returns either [f32; dim] or [[f32; dim]]
        let payload: serde_json::Value = response.json().await?;
        let raw = parse_embedding(&payload).ok_or_else(|| {
            RecError::ModelInference("embedding API response held no vector".to_string())
        })?;

        Ok(raw)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> RecResult<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("Blank embedding input, returning zero vector");
            return Ok(vec![0.0; self.dim]);
        }

        let raw = self.call_api(trimmed).await?;

        if raw.len() != self.dim {
            return Err(RecError::Configuration(format!(
                "embedding dimension {} does not match configured dimension {}",
                raw.len(),
                self.dim
            )));
        }

        Ok(l2_normalize(&raw))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

fn parse_embedding(payload: &serde_json::Value) -> Option<Vec<f32>> {
    let array = payload.as_array()?;
    let flat = match array.first() {
        Some(first) if first.is_array() => first.as_array()?,
        _ => array,
    };
    let vector: Vec<f32> = flat
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();
    if vector.len() == flat.len() && !vector.is_empty() {
        Some(vector)
    } else {
        None
    }
}

/// Scales a vector to unit length; a zero vector stays zero
pub fn l2_normalize(vector: &[f32]) -> Vec<f32> {
    let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vector.iter().map(|x| x / magnitude).collect()
    } else {
        vec![0.0; vector.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(dim: usize) -> HttpEmbeddingProvider {
        HttpEmbeddingProvider::new("http://localhost:0", "test-key".to_string(), "test-model", dim)
    }

    #[tokio::test]
    async fn test_blank_input_maps_to_zero_vector() {
        let provider = provider(4);
        for text in ["", "   ", "\t\n"] {
            let vector = provider.embed(text).await.unwrap();
            assert_eq!(vector, vec![0.0; 4]);
        }
    }

    #[test]
    fn test_l2_normalize_unit_length() {
        let normalized = l2_normalize(&[3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
        let magnitude: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector_stays_zero() {
        assert_eq!(l2_normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_embedding_flat_and_nested() {
        let flat = serde_json::json!([0.1, 0.2, 0.3]);
        assert_eq!(parse_embedding(&flat).unwrap().len(), 3);

        let nested = serde_json::json!([[0.1, 0.2, 0.3]]);
        assert_eq!(parse_embedding(&nested).unwrap().len(), 3);

        let junk = serde_json::json!({"error": "loading"});
        assert!(parse_embedding(&junk).is_none());
    }
}
