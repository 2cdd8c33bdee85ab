//! Clustering quality metrics: WCSS and silhouette

use crate::distance::{squared_euclidean, Distance, EuclideanDistance};
use crate::error::{Error, Result};
use crate::utils::{
    cluster_sizes, compact_labels, get_cluster_indices, validate_data, validate_labels,
};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::prelude::*;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// WCSS and silhouette for one clustering
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    /// Within-cluster sum of squares
    pub wcss: f64,
    /// Mean silhouette coefficient in `[-1, 1]`
    pub silhouette: f64,
}

/// Compute both metrics for a fitted clustering
pub fn evaluate(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    labels: ArrayView1<usize>,
) -> Result<Evaluation> {
    Ok(Evaluation {
        wcss: wcss(data, centroids, labels)?,
        silhouette: silhouette_score(data, labels)?,
    })
}

/// Within-cluster sum of squares: squared Euclidean distance from every
/// point to the center of its assigned cluster, summed
pub fn wcss(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    labels: ArrayView1<usize>,
) -> Result<f64> {
    if centroids.ncols() != data.ncols() {
        return Err(Error::invalid_data(
            "Points and centroids must have the same number of features",
        ));
    }
    validate_labels(data, labels, centroids.nrows())?;

    let mut total = 0.0;
    for (point, &cluster_id) in data.rows().into_iter().zip(labels.iter()) {
        total += squared_euclidean(point, centroids.row(cluster_id))?;
    }

    Ok(total)
}

/// Silhouette coefficient of every point.
///
/// For point `i`, `a` is its mean distance to the other members of its
/// cluster and `b` the lowest mean distance to any other cluster; the
/// value is `(b - a) / max(a, b)`. Points alone in their cluster score 0.
///
/// Fails with [`Error::DegenerateClusters`] unless the labelling has
/// between 2 and `n_samples - 1` distinct clusters.
pub fn silhouette_samples(data: ArrayView2<f64>, labels: ArrayView1<usize>) -> Result<Array1<f64>> {
    validate_data(data)?;
    let (labels, originals) = compact_labels(labels);
    let n_labels = originals.len();
    validate_labels(data, labels.view(), n_labels)?;

    let n_samples = data.nrows();
    let sizes = cluster_sizes(labels.view(), n_labels);
    if n_labels < 2 || n_labels >= n_samples {
        return Err(Error::degenerate(format!(
            "Number of labels is {n_labels}. Valid values are 2 to n_samples - 1 (inclusive)"
        )));
    }

    let values: Vec<f64> = (0..n_samples)
        .into_par_iter()
        .map(|i| point_silhouette(data, labels.view(), &sizes, i))
        .collect::<Result<Vec<f64>>>()?;

    Ok(Array1::from(values))
}

fn point_silhouette(
    data: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    sizes: &[usize],
    i: usize,
) -> Result<f64> {
    let own = labels[i];
    if sizes[own] <= 1 {
        return Ok(0.0);
    }

    let metric = EuclideanDistance;
    let point = data.row(i);
    let mut sums = vec![0.0; sizes.len()];
    for (j, other) in data.rows().into_iter().enumerate() {
        if j != i {
            sums[labels[j]] += metric.distance(point, other)?;
        }
    }

    let a = sums[own] / (sizes[own] - 1) as f64;
    let b = sums
        .iter()
        .zip(sizes)
        .enumerate()
        .filter(|&(cluster, (_, &size))| cluster != own && size > 0)
        .map(|(_, (&sum, &size))| sum / size as f64)
        .fold(f64::INFINITY, f64::min);

    let denom = a.max(b);
    Ok(if denom > 0.0 { (b - a) / denom } else { 0.0 })
}

/// Mean silhouette coefficient over all points
pub fn silhouette_score(data: ArrayView2<f64>, labels: ArrayView1<usize>) -> Result<f64> {
    let samples = silhouette_samples(data, labels)?;
    samples
        .mean()
        .ok_or_else(|| Error::computation_error("No silhouette values to average"))
}

/// Mean silhouette coefficient over a seeded random subset of rows.
///
/// Silhouette is quadratic in the number of points; large datasets can be
/// scored on a sample instead. A `sample_size` at or above the number of
/// rows scores the whole dataset.
///
/// The subset is stratified: each cluster contributes its proportional share
/// of `sample_size`, rounded up, and never fewer than two rows (or all of its
/// rows if it has fewer). Every cluster of the full labelling is therefore
/// represented, and the subset can slightly exceed `sample_size`.
pub fn silhouette_score_sampled(
    data: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    sample_size: usize,
    seed: u64,
) -> Result<f64> {
    if sample_size == 0 {
        return Err(Error::invalid_parameter("sample_size must be > 0"));
    }
    if sample_size >= data.nrows() {
        return silhouette_score(data, labels);
    }
    if labels.len() != data.nrows() {
        return Err(Error::invalid_data(format!(
            "Expected {} labels, got {}",
            data.nrows(),
            labels.len()
        )));
    }

    let (dense, originals) = compact_labels(labels);
    let members = get_cluster_indices(dense.view(), originals.len());

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = Vec::with_capacity(sample_size + 2 * members.len());
    for rows in &members {
        let share = (rows.len() * sample_size).div_ceil(data.nrows());
        let quota = share.max(2).min(rows.len());
        indices.extend(
            rand::seq::index::sample(&mut rng, rows.len(), quota)
                .into_iter()
                .map(|i| rows[i]),
        );
    }
    indices.sort_unstable();

    let sub_data = data.select(Axis(0), &indices);
    let sub_labels = labels.select(Axis(0), &indices);
    silhouette_score(sub_data.view(), sub_labels.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array2};

    fn two_blobs() -> Array2<f64> {
        arr2(&[[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]])
    }

    #[test]
    fn test_wcss_two_blobs() {
        let data = two_blobs();
        let centroids = arr2(&[[0.0, 0.5], [10.0, 10.5]]);
        let labels = arr1(&[0, 0, 1, 1]);

        let value = wcss(data.view(), centroids.view(), labels.view()).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wcss_rejects_bad_labels() {
        let data = two_blobs();
        let centroids = arr2(&[[0.0, 0.5], [10.0, 10.5]]);

        assert!(wcss(data.view(), centroids.view(), arr1(&[0, 0, 2, 1]).view()).is_err());
        assert!(wcss(data.view(), centroids.view(), arr1(&[0, 0, 1]).view()).is_err());

        let narrow = arr2(&[[0.0], [10.0]]);
        assert!(wcss(data.view(), narrow.view(), arr1(&[0, 0, 1, 1]).view()).is_err());
    }

    #[test]
    fn test_silhouette_known_value() {
        let data = arr2(&[[0.0], [1.0], [4.0], [5.0]]);
        let labels = arr1(&[0, 0, 1, 1]);

        let samples = silhouette_samples(data.view(), labels.view()).unwrap();
        assert!((samples[0] - 7.0 / 9.0).abs() < 1e-12);
        assert!((samples[1] - 5.0 / 7.0).abs() < 1e-12);

        let score = silhouette_score(data.view(), labels.view()).unwrap();
        assert!((score - 94.0 / 126.0).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_two_blobs() {
        let data = two_blobs();
        let score = silhouette_score(data.view(), arr1(&[0, 0, 1, 1]).view()).unwrap();
        assert!(score > 0.9);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_silhouette_bad_labelling_is_negative() {
        let data = two_blobs();
        let score = silhouette_score(data.view(), arr1(&[0, 1, 0, 1]).view()).unwrap();
        assert!(score < 0.0);
        assert!(score >= -1.0);
    }

    #[test]
    fn test_silhouette_singleton_cluster_scores_zero() {
        let data = arr2(&[[0.0], [1.0], [2.0], [10.0]]);
        let samples = silhouette_samples(data.view(), arr1(&[0, 0, 0, 1]).view()).unwrap();
        assert_eq!(samples[3], 0.0);
    }

    #[test]
    fn test_silhouette_non_contiguous_labels() {
        let data = arr2(&[[0.0], [1.0], [4.0], [5.0]]);
        let contiguous = silhouette_score(data.view(), arr1(&[0, 0, 1, 1]).view()).unwrap();
        let sparse = silhouette_score(data.view(), arr1(&[2, 2, 7, 7]).view()).unwrap();
        assert!((contiguous - sparse).abs() < 1e-12);
    }

    #[test]
    fn test_silhouette_degenerate_inputs() {
        let data = two_blobs();

        let one_cluster = silhouette_score(data.view(), arr1(&[0, 0, 0, 0]).view());
        assert!(matches!(one_cluster, Err(Error::DegenerateClusters { .. })));

        let all_alone = silhouette_score(data.view(), arr1(&[0, 1, 2, 3]).view());
        assert!(matches!(all_alone, Err(Error::DegenerateClusters { .. })));
    }

    #[test]
    fn test_metrics_idempotent() {
        let data = two_blobs();
        let centroids = arr2(&[[0.0, 0.5], [10.0, 10.5]]);
        let labels = arr1(&[0, 0, 1, 1]);

        let first = evaluate(data.view(), centroids.view(), labels.view()).unwrap();
        let second = evaluate(data.view(), centroids.view(), labels.view()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sampled_silhouette() {
        let data = arr2(&[[0.0], [0.5], [1.0], [9.0], [9.5], [10.0]]);
        let labels = arr1(&[0, 0, 0, 1, 1, 1]);

        let full = silhouette_score(data.view(), labels.view()).unwrap();
        let whole = silhouette_score_sampled(data.view(), labels.view(), 100, 0).unwrap();
        assert_eq!(full, whole);

        let partial = silhouette_score_sampled(data.view(), labels.view(), 5, 3).unwrap();
        assert!((-1.0..=1.0).contains(&partial));

        assert!(silhouette_score_sampled(data.view(), labels.view(), 0, 0).is_err());
    }

    #[test]
    fn test_sampled_silhouette_keeps_every_cluster() {
        // 98 rows near 0 and 2 rows near 50: a plain sample of 3 usually misses the small cluster
        let mut values: Vec<f64> = (0..98).map(|i| i as f64 * 0.01).collect();
        values.extend([50.0, 50.5]);
        let data = Array2::from_shape_vec((100, 1), values).unwrap();
        let mut labels = vec![0; 98];
        labels.extend([1, 1]);
        let labels = Array1::from(labels);

        for seed in 0..20 {
            let score = silhouette_score_sampled(data.view(), labels.view(), 3, seed).unwrap();
            assert!(score > 0.9);
        }
    }

    #[test]
    fn test_silhouette_extreme_label_ids() {
        let data = arr2(&[[0.0], [1.0], [10.0], [11.0]]);
        let dense = silhouette_score(data.view(), arr1(&[0, 0, 1, 1]).view()).unwrap();
        let extreme = silhouette_score(data.view(), arr1(&[0, 0, usize::MAX, usize::MAX]).view()).unwrap();
        assert_eq!(dense, extreme);

        let samples = silhouette_samples(data.view(), arr1(&[1_000_000_000, 1_000_000_000, 3, 3]).view()).unwrap();
        assert_eq!(samples.len(), 4);
    }
}
