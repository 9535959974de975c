use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RecError, RecResult};

/// On-disk layout of the pretrained latent-factor model
///
/// Produced by the offline matrix-factorization pipeline; the core never
/// re-derives any of it. Factor rows are flat and index-aligned with the
/// id arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatentModelFile {
    pub global_mean: f32,
    pub rating_min: f32,
    pub rating_max: f32,
    pub user_ids: Vec<i64>,
    pub user_biases: Vec<f32>,
    pub user_factors: Vec<Vec<f32>>,
    pub item_ids: Vec<i64>,
    pub item_biases: Vec<f32>,
    pub item_factors: Vec<Vec<f32>>,
}

/// Pretrained latent-factor rating model, read-only after load
///
/// Predicts an estimated rating for a (user, movie) pair as
/// `global_mean + user_bias + item_bias + dot(user_factors, item_factors)`,
/// clamped to the model's rating scale. No online updates.
pub struct LatentFactorModel {
    global_mean: f32,
    rating_min: f32,
    rating_max: f32,
    user_index: HashMap<i64, usize>,
    item_index: HashMap<i64, usize>,
    user_biases: Vec<f32>,
    item_biases: Vec<f32>,
    user_factors: Vec<Vec<f32>>,
    item_factors: Vec<Vec<f32>>,
}

impl LatentFactorModel {
    /// Builds the model from its file form, validating array alignment
    pub fn new(file: LatentModelFile) -> RecResult<Self> {
        if file.user_ids.len() != file.user_biases.len()
            || file.user_ids.len() != file.user_factors.len()
        {
            return Err(RecError::Configuration(format!(
                "latent model user arrays misaligned: {} ids, {} biases, {} factor rows",
                file.user_ids.len(),
                file.user_biases.len(),
                file.user_factors.len()
            )));
        }
        if file.item_ids.len() != file.item_biases.len()
            || file.item_ids.len() != file.item_factors.len()
        {
            return Err(RecError::Configuration(format!(
                "latent model item arrays misaligned: {} ids, {} biases, {} factor rows",
                file.item_ids.len(),
                file.item_biases.len(),
                file.item_factors.len()
            )));
        }
        if file.rating_min > file.rating_max {
            return Err(RecError::Configuration(format!(
                "latent model rating scale inverted: min {} > max {}",
                file.rating_min, file.rating_max
            )));
        }

        let factor_dim = file.user_factors.first().map(Vec::len).unwrap_or(0);
        for row in file.user_factors.iter().chain(file.item_factors.iter()) {
            if row.len() != factor_dim {
                return Err(RecError::Configuration(format!(
                    "latent factor row has {} factors, expected {}",
                    row.len(),
                    factor_dim
                )));
            }
        }

        let user_index = file
            .user_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        let item_index = file
            .item_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        Ok(Self {
            global_mean: file.global_mean,
            rating_min: file.rating_min,
            rating_max: file.rating_max,
            user_index,
            item_index,
            user_biases: file.user_biases,
            item_biases: file.item_biases,
            user_factors: file.user_factors,
            item_factors: file.item_factors,
        })
    }

    /// Predicts the rating `user_id` would give `movie_id`
    ///
    /// Unknown users or items surface as `ModelInference` so the
    /// orchestrator can apply its per-candidate policy.
    pub fn predict(&self, user_id: i64, movie_id: i64) -> RecResult<f32> {
        let u = *self.user_index.get(&user_id).ok_or_else(|| {
            RecError::ModelInference(format!("user {} unknown to the latent model", user_id))
        })?;
        let i = *self.item_index.get(&movie_id).ok_or_else(|| {
            RecError::ModelInference(format!("movie {} unknown to the latent model", movie_id))
        })?;

        let interaction: f32 = self.user_factors[u]
            .iter()
            .zip(self.item_factors[i].iter())
            .map(|(p, q)| p * q)
            .sum();

        let estimate = self.global_mean + self.user_biases[u] + self.item_biases[i] + interaction;
        Ok(estimate.clamp(self.rating_min, self.rating_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_file() -> LatentModelFile {
        LatentModelFile {
            global_mean: 3.5,
            rating_min: 0.5,
            rating_max: 5.0,
            user_ids: vec![1, 2],
            user_biases: vec![0.2, -0.3],
            user_factors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            item_ids: vec![10, 20],
            item_biases: vec![0.1, -0.1],
            item_factors: vec![vec![0.5, 0.0], vec![0.0, -0.5]],
        }
    }

    #[test]
    fn test_predict_is_mean_plus_biases_plus_interaction() {
        let model = LatentFactorModel::new(model_file()).unwrap();
        // 3.5 + 0.2 + 0.1 + (1.0 * 0.5) = 4.3
        let estimate = model.predict(1, 10).unwrap();
        assert!((estimate - 4.3).abs() < 1e-6);
    }

    #[test]
    fn test_predict_clamps_to_rating_scale() {
        let mut file = model_file();
        file.user_biases[0] = 10.0;
        let model = LatentFactorModel::new(file).unwrap();
        assert_eq!(model.predict(1, 10).unwrap(), 5.0);

        let mut file = model_file();
        file.user_biases[1] = -10.0;
        let model = LatentFactorModel::new(file).unwrap();
        assert_eq!(model.predict(2, 20).unwrap(), 0.5);
    }

    #[test]
    fn test_unknown_user_and_item_are_inference_errors() {
        let model = LatentFactorModel::new(model_file()).unwrap();
        assert!(matches!(
            model.predict(99, 10),
            Err(RecError::ModelInference(_))
        ));
        assert!(matches!(
            model.predict(1, 99),
            Err(RecError::ModelInference(_))
        ));
    }

    #[test]
    fn test_misaligned_arrays_rejected() {
        let mut file = model_file();
        file.user_biases.pop();
        assert!(matches!(
            LatentFactorModel::new(file),
            Err(RecError::Configuration(_))
        ));
    }
}
