use std::collections::HashMap;

use crate::models::{PopularityRow, RankedCandidate};

/// Ranks movies by precomputed Bayesian weighted rating within categories
///
/// For each requested category the top `k` movies by weighted rating are
/// selected, then the per-category lists merge into one ranking. A movie
/// appearing in several categories keeps its highest weighted rating. The
/// merged list is re-sorted and cut back to `k`, so callers always get at
/// most `k` candidates regardless of how many categories they asked for.
///
/// Categories with no rows contribute nothing; they are not an error.
pub fn top_k_per_category(
    rows: &[PopularityRow],
    categories: &[String],
    k: usize,
) -> Vec<RankedCandidate> {
    let mut by_category: HashMap<&str, Vec<&PopularityRow>> = HashMap::new();
    for row in rows {
        by_category.entry(row.category.as_str()).or_default().push(row);
    }

    let mut best: HashMap<i64, f32> = HashMap::new();
    for category in categories {
        let Some(mut category_rows) = by_category.remove(category.as_str()) else {
            continue;
        };
        category_rows.sort_by(|a, b| {
            b.weighted_rating
                .total_cmp(&a.weighted_rating)
                .then(a.movie_id.cmp(&b.movie_id))
        });
        for row in category_rows.into_iter().take(k) {
            let entry = best.entry(row.movie_id).or_insert(f32::NEG_INFINITY);
            if row.weighted_rating > *entry {
                *entry = row.weighted_rating;
            }
        }
    }

    let mut merged: Vec<RankedCandidate> = best
        .into_iter()
        .map(|(movie_id, score)| RankedCandidate { movie_id, score })
        .collect();
    merged.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.movie_id.cmp(&b.movie_id))
    });
    merged.truncate(k);

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(movie_id: i64, category: &str, weighted_rating: f32) -> PopularityRow {
        PopularityRow {
            movie_id,
            category: category.to_string(),
            vote_count: 100,
            weighted_rating,
        }
    }

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_single_category_ranked_by_weighted_rating() {
        let rows = vec![
            row(1, "Drama", 7.2),
            row(2, "Drama", 8.9),
            row(3, "Drama", 8.1),
        ];
        let ranked = top_k_per_category(&rows, &categories(&["Drama"]), 10);
        let ids: Vec<i64> = ranked.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_per_category_cutoff_applies_before_merge() {
        // Category A holds three strong movies, category B one weak; with
        // k = 2 only A's top two survive the per-category cut, so B's
        // movie still makes the merged list before truncation removes it.
        let rows = vec![
            row(1, "Action", 9.0),
            row(2, "Action", 8.5),
            row(3, "Action", 8.0),
            row(4, "Horror", 5.0),
        ];
        let ranked = top_k_per_category(&rows, &categories(&["Action", "Horror"]), 2);
        let ids: Vec<i64> = ranked.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!ids.contains(&3));
    }

    #[test]
    fn test_cross_category_duplicate_keeps_highest_rating() {
        let rows = vec![
            row(7, "Drama", 7.5),
            row(7, "Romance", 8.2),
            row(8, "Romance", 6.0),
        ];
        let ranked = top_k_per_category(&rows, &categories(&["Drama", "Romance"]), 10);
        let seven: Vec<&RankedCandidate> =
            ranked.iter().filter(|c| c.movie_id == 7).collect();
        assert_eq!(seven.len(), 1);
        assert_eq!(seven[0].score, 8.2);
    }

    #[test]
    fn test_unknown_category_contributes_nothing() {
        let rows = vec![row(1, "Drama", 7.0)];
        let ranked = top_k_per_category(&rows, &categories(&["Western"]), 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ties_break_by_ascending_movie_id() {
        let rows = vec![
            row(9, "Drama", 8.0),
            row(4, "Drama", 8.0),
            row(6, "Drama", 8.0),
        ];
        let ranked = top_k_per_category(&rows, &categories(&["Drama"]), 10);
        let ids: Vec<i64> = ranked.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn test_merged_list_truncates_to_k() {
        let rows = vec![
            row(1, "Drama", 9.0),
            row(2, "Drama", 8.0),
            row(3, "Action", 7.0),
            row(4, "Action", 6.0),
        ];
        let ranked = top_k_per_category(&rows, &categories(&["Drama", "Action"]), 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].movie_id, 1);
    }
}
