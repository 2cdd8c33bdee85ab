//! Property-based tests for k-means and its metrics
//!
//! These tests verify invariants that should hold for all inputs:
//! - A fit yields exactly k centers and one label per sample
//! - Lloyd's loop never ends worse than its starting centers
//! - Silhouette scores stay within [-1, 1]
//! - Metric evaluation is deterministic

use kmeanslab::utils::count_distinct_labels;
use kmeanslab::{evaluate, silhouette_score, wcss, InitMethod, KMeans};
use ndarray::Array2;
use proptest::prelude::*;
use std::collections::HashSet;

/// Generate a small 2-D point cloud
fn point_cloud() -> impl Strategy<Value = Array2<f64>> {
    prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 4..30).prop_map(|points| {
        let n = points.len();
        let flat: Vec<f64> = points.into_iter().flat_map(|(x, y)| [x, y]).collect();
        Array2::from_shape_vec((n, 2), flat).unwrap()
    })
}

fn distinct_rows(data: &Array2<f64>) -> usize {
    data.rows()
        .into_iter()
        .map(|r| (r[0].to_bits(), r[1].to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

proptest! {
    /// Property: k centers and n labels, every label a valid cluster id
    #[test]
    fn prop_fit_shapes(data in point_cloud(), k in 1usize..5, seed in any::<u64>()) {
        prop_assume!(k <= distinct_rows(&data));

        let result = KMeans::new(k).random_state(seed).n_init(2).fit(data.view()).unwrap();

        prop_assert_eq!(result.centroids.dim(), (k, 2));
        prop_assert_eq!(result.labels.len(), data.nrows());
        prop_assert!(result.labels.iter().all(|&l| l < k));
    }

    /// Property: the converged WCSS is no larger than the WCSS of the
    /// initial centers under the final assignment
    #[test]
    fn prop_lloyd_improves_on_initial_centers(data in point_cloud(), k in 1usize..5, seed in any::<u64>()) {
        prop_assume!(k <= distinct_rows(&data));

        let result = KMeans::new(k)
            .init_method(InitMethod::Random)
            .tolerance(0.0)
            .n_init(1)
            .random_state(seed)
            .fit(data.view())
            .unwrap();
        prop_assume!(result.converged);

        let initial = wcss(data.view(), result.initial_centroids.view(), result.labels.view()).unwrap();
        let last = wcss(data.view(), result.centroids.view(), result.labels.view()).unwrap();
        prop_assert!(last <= initial + 1e-9 * (1.0 + initial));
    }

    /// Property: silhouette scores are bounded
    #[test]
    fn prop_silhouette_bounded(data in point_cloud(), k in 2usize..5, seed in any::<u64>()) {
        prop_assume!(k <= distinct_rows(&data));

        let labels = KMeans::new(k).random_state(seed).n_init(1).fit_predict(data.view()).unwrap();
        let distinct = count_distinct_labels(labels.view());
        prop_assume!(distinct >= 2 && distinct < data.nrows());

        let score = silhouette_score(data.view(), labels.view()).unwrap();
        prop_assert!((-1.0..=1.0).contains(&score));
    }

    /// Property: evaluating the same clustering twice gives the same numbers
    #[test]
    fn prop_evaluation_is_deterministic(data in point_cloud(), seed in any::<u64>()) {
        prop_assume!(distinct_rows(&data) >= 2);

        let result = KMeans::new(2).random_state(seed).n_init(1).fit(data.view()).unwrap();
        prop_assume!(count_distinct_labels(result.labels.view()) == 2);
        prop_assume!(data.nrows() > 2);

        let first = evaluate(data.view(), result.centroids.view(), result.labels.view()).unwrap();
        let second = evaluate(data.view(), result.centroids.view(), result.labels.view()).unwrap();
        prop_assert_eq!(first, second);
    }
}
