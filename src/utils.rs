//! Utility functions shared by the fitter and the metrics

use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::collections::{BTreeMap, BTreeSet};

/// Find the closest centroid for a given data point.
///
/// Ties resolve to the lowest centroid index.
pub fn find_closest_centroid<F>(
    point: ArrayView1<f64>,
    centroids: ArrayView2<f64>,
    distance_fn: F,
) -> Result<usize>
where
    F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> Result<f64>,
{
    if centroids.nrows() == 0 {
        return Err(Error::invalid_data("No centroids provided"));
    }

    if centroids.ncols() != point.len() {
        return Err(Error::invalid_data("Point and centroids dimension mismatch"));
    }

    let mut min_distance = f64::INFINITY;
    let mut closest_centroid = 0;

    for (i, centroid) in centroids.rows().into_iter().enumerate() {
        let distance = distance_fn(point, centroid)?;
        if distance < min_distance {
            min_distance = distance;
            closest_centroid = i;
        }
    }

    Ok(closest_centroid)
}

/// Assign all data points to their closest centroids
pub fn assign_points_to_centroids<F>(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    distance_fn: F,
) -> Result<Array1<usize>>
where
    F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> Result<f64> + Copy,
{
    let mut assignments = Array1::zeros(data.nrows());

    for (i, point) in data.rows().into_iter().enumerate() {
        assignments[i] = find_closest_centroid(point, centroids, distance_fn)?;
    }

    Ok(assignments)
}

/// Get indices of points assigned to each cluster
pub fn get_cluster_indices(assignments: ArrayView1<usize>, n_clusters: usize) -> Vec<Vec<usize>> {
    let mut cluster_indices = vec![Vec::new(); n_clusters];

    for (point_idx, &cluster_id) in assignments.iter().enumerate() {
        if cluster_id < n_clusters {
            cluster_indices[cluster_id].push(point_idx);
        }
    }

    cluster_indices
}

/// Calculate cluster sizes
pub fn cluster_sizes(assignments: ArrayView1<usize>, n_clusters: usize) -> Vec<usize> {
    let mut sizes = vec![0; n_clusters];

    for &cluster_id in assignments.iter() {
        if cluster_id < n_clusters {
            sizes[cluster_id] += 1;
        }
    }

    sizes
}

/// Number of distinct cluster ids that actually occur
pub fn count_distinct_labels(assignments: ArrayView1<usize>) -> usize {
    assignments.iter().collect::<BTreeSet<_>>().len()
}

/// Renumber arbitrary cluster ids to `0..n_distinct`, preserving their order.
///
/// Returns the dense labels and, at each dense id, the original id it replaced.
pub fn compact_labels(assignments: ArrayView1<usize>) -> (Array1<usize>, Vec<usize>) {
    let mut dense_ids = BTreeMap::new();
    for &label in assignments.iter() {
        dense_ids.entry(label).or_insert(0);
    }
    for (dense, slot) in dense_ids.values_mut().enumerate() {
        *slot = dense;
    }

    let dense = assignments.mapv(|label| dense_ids[&label]);
    (dense, dense_ids.into_keys().collect())
}

/// Mean per-feature variance, used to scale the convergence tolerance
pub fn mean_feature_variance(data: ArrayView2<f64>) -> f64 {
    if data.nrows() == 0 || data.ncols() == 0 {
        return 0.0;
    }

    let n = data.nrows() as f64;
    let total: f64 = data
        .columns()
        .into_iter()
        .map(|column| {
            let mean = column.sum() / n;
            column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
        })
        .sum();

    total / data.ncols() as f64
}

/// Validate clustering parameters
pub fn validate_parameters(
    n_clusters: usize,
    max_iter: usize,
    tol: f64,
    n_init: usize,
) -> Result<()> {
    if n_clusters == 0 {
        return Err(Error::invalid_parameter("n_clusters must be > 0"));
    }

    if max_iter == 0 {
        return Err(Error::invalid_parameter("max_iter must be > 0"));
    }

    if tol < 0.0 || tol.is_nan() {
        return Err(Error::invalid_parameter("tol must be >= 0"));
    }

    if n_init == 0 {
        return Err(Error::invalid_parameter("n_init must be > 0"));
    }

    Ok(())
}

/// Validate input data
pub fn validate_data(data: ArrayView2<f64>) -> Result<()> {
    if data.nrows() == 0 {
        return Err(Error::invalid_data("Data cannot be empty"));
    }

    if data.ncols() == 0 {
        return Err(Error::invalid_data("Data must have at least one feature"));
    }

    if data.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_data("Data contains NaN or infinite values"));
    }

    Ok(())
}

/// Validate that a label vector matches the data and stays below `n_clusters`
pub fn validate_labels(
    data: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    n_clusters: usize,
) -> Result<()> {
    if labels.len() != data.nrows() {
        return Err(Error::invalid_data(format!(
            "Expected {} labels, got {}",
            data.nrows(),
            labels.len()
        )));
    }

    if let Some(&bad) = labels.iter().find(|&&label| label >= n_clusters) {
        return Err(Error::invalid_data(format!(
            "Invalid cluster assignment {bad} for {n_clusters} clusters"
        )));
    }

    Ok(())
}
