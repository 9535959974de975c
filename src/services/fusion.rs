use std::collections::HashMap;

use crate::models::{Facet, FacetWeights, Neighbor, RankedCandidate};

/// Merges per-facet neighbor lists into one ranked candidate list
///
/// Two accumulation modes serve the two retrieval flows. Free-text search
/// uses max-fusion: a strong match on any single facet is sufficient
/// evidence of relevance, and summing would penalize movies that only
/// match on one facet. Similar-item lookup uses weighted-sum fusion: a
/// genuinely similar movie should be corroborated across facets, so
/// contributions accumulate.
///
/// Both modes sort descending by score with ties broken by ascending
/// movie id, then truncate to the caller's limit.
pub fn max_fuse(results: &[(Facet, Vec<Neighbor>)], limit: usize) -> Vec<RankedCandidate> {
    let mut scores: HashMap<i64, f32> = HashMap::new();

    for (_, neighbors) in results {
        for neighbor in neighbors {
            let entry = scores.entry(neighbor.movie_id).or_insert(f32::NEG_INFINITY);
            if neighbor.similarity > *entry {
                *entry = neighbor.similarity;
            }
        }
    }

    rank(scores, limit)
}

/// Weighted-sum fusion over per-facet neighbor lists
pub fn weighted_fuse(
    results: &[(Facet, Vec<Neighbor>)],
    weights: &FacetWeights,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut scores: HashMap<i64, f32> = HashMap::new();

    for (facet, neighbors) in results {
        let weight = weights.get(*facet);
        for neighbor in neighbors {
            *scores.entry(neighbor.movie_id).or_insert(0.0) += neighbor.similarity * weight;
        }
    }

    rank(scores, limit)
}

fn rank(scores: HashMap<i64, f32>, limit: usize) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = scores
        .into_iter()
        .map(|(movie_id, score)| RankedCandidate { movie_id, score })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.movie_id.cmp(&b.movie_id))
    });
    ranked.truncate(limit);

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor(movie_id: i64, similarity: f32) -> Neighbor {
        Neighbor {
            movie_id,
            similarity,
        }
    }

    fn facet_results() -> Vec<(Facet, Vec<Neighbor>)> {
        vec![
            (
                Facet::Title,
                vec![neighbor(1, 0.9), neighbor(2, 0.4), neighbor(3, 0.2)],
            ),
            (Facet::Content, vec![neighbor(2, 0.8), neighbor(3, 0.3)]),
            (Facet::Type, vec![neighbor(1, 0.1)]),
            (Facet::People, vec![neighbor(3, 0.6)]),
        ]
    }

    #[test]
    fn test_max_fusion_takes_strongest_facet() {
        let ranked = max_fuse(&facet_results(), 10);
        let score = |id| ranked.iter().find(|c| c.movie_id == id).unwrap().score;
        assert_eq!(score(1), 0.9);
        assert_eq!(score(2), 0.8);
        assert_eq!(score(3), 0.6);
    }

    #[test]
    fn test_max_fusion_dominates_every_contribution() {
        let results = facet_results();
        let ranked = max_fuse(&results, 10);
        for (_, neighbors) in &results {
            for n in neighbors {
                let fused = ranked
                    .iter()
                    .find(|c| c.movie_id == n.movie_id)
                    .unwrap()
                    .score;
                assert!(fused >= n.similarity);
            }
        }
    }

    #[test]
    fn test_weighted_sum_reconstructable_from_components() {
        let results = facet_results();
        let weights = FacetWeights::default();
        let ranked = weighted_fuse(&results, &weights, 10);

        // Recompute each movie's score independently and compare exactly
        for candidate in &ranked {
            let expected: f32 = results
                .iter()
                .flat_map(|(facet, neighbors)| {
                    neighbors
                        .iter()
                        .filter(|n| n.movie_id == candidate.movie_id)
                        .map(move |n| n.similarity * weights.get(*facet))
                })
                .sum();
            assert!((candidate.score - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_weighted_sum_rewards_cross_facet_corroboration() {
        // One movie matches strongly on a single facet, another matches
        // moderately everywhere; the corroborated one wins under weights
        // that spread mass across facets.
        let results = vec![
            (Facet::Title, vec![neighbor(1, 0.9), neighbor(2, 0.5)]),
            (Facet::Content, vec![neighbor(2, 0.5)]),
            (Facet::Type, vec![neighbor(2, 0.5)]),
            (Facet::People, vec![neighbor(2, 0.5)]),
        ];
        let weights = FacetWeights::new(0.25, 0.25, 0.25, 0.25).unwrap();
        let ranked = weighted_fuse(&results, &weights, 10);
        assert_eq!(ranked[0].movie_id, 2);
    }

    #[test]
    fn test_ties_break_by_ascending_movie_id() {
        let results = vec![(
            Facet::Title,
            vec![neighbor(9, 0.5), neighbor(3, 0.5), neighbor(6, 0.5)],
        )];
        let ranked = max_fuse(&results, 10);
        let ids: Vec<i64> = ranked.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let ranked = max_fuse(&facet_results(), 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].movie_id, 1);
        assert_eq!(ranked[1].movie_id, 2);
    }

    #[test]
    fn test_empty_input_yields_empty_ranking() {
        assert!(max_fuse(&[], 5).is_empty());
        assert!(weighted_fuse(&[], &FacetWeights::default(), 5).is_empty());
    }
}
