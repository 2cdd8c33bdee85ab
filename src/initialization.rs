//! Initialization methods for k-means clustering

use crate::distance::squared_euclidean;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

/// Initialization methods for the cluster fitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum InitMethod {
    /// Random initialization - sample k distinct rows as initial centroids
    Random,
    /// k-means++ - spread seeds out by sampling proportionally to squared distance
    #[default]
    KMeansPlusPlus,
}

/// Initialize centroids for k-means clustering
pub fn initialize_centroids<R>(
    data: ArrayView2<f64>,
    n_clusters: usize,
    method: InitMethod,
    rng: &mut R,
) -> Result<Array2<f64>>
where
    R: Rng,
{
    if n_clusters == 0 {
        return Err(Error::invalid_parameter("Number of clusters must be > 0"));
    }

    if n_clusters > data.nrows() {
        return Err(Error::invalid_parameter(
            "Number of clusters cannot exceed number of data points",
        ));
    }

    let indices = match method {
        InitMethod::Random => random_indices(data.nrows(), n_clusters, rng),
        InitMethod::KMeansPlusPlus => kmeans_plusplus_indices(data, n_clusters, rng)?,
    };

    Ok(gather_rows(data, &indices))
}

/// Random initialization: k distinct rows drawn without replacement
fn random_indices<R: Rng>(n_points: usize, n_clusters: usize, rng: &mut R) -> Vec<usize> {
    rand::seq::index::sample(rng, n_points, n_clusters).into_vec()
}

/// k-means++ initialization.
///
/// The first seed is uniform; each following seed is drawn with probability
/// proportional to its squared distance from the nearest seed chosen so far.
/// When every remaining point coincides with a seed, an unused row is picked
/// uniformly instead.
fn kmeans_plusplus_indices<R: Rng>(
    data: ArrayView2<f64>,
    n_clusters: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let n_points = data.nrows();
    let mut chosen = Vec::with_capacity(n_clusters);
    chosen.push(rng.gen_range(0..n_points));

    let mut closest_sq = vec![f64::INFINITY; n_points];

    while chosen.len() < n_clusters {
        let latest = data.row(chosen[chosen.len() - 1]);
        for (i, point) in data.rows().into_iter().enumerate() {
            let d = squared_euclidean(point, latest)?;
            if d < closest_sq[i] {
                closest_sq[i] = d;
            }
        }

        let total: f64 = closest_sq.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.gen::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = None;
            for (i, &d) in closest_sq.iter().enumerate() {
                cumsum += d;
                if d > 0.0 && cumsum >= threshold {
                    selected = Some(i);
                    break;
                }
            }
            // Rounding can leave the threshold just past the final sum
            selected.or_else(|| closest_sq.iter().rposition(|&d| d > 0.0))
        } else {
            let unused: Vec<usize> = (0..n_points).filter(|i| !chosen.contains(i)).collect();
            unused.choose(rng).copied()
        };

        match next {
            Some(idx) => chosen.push(idx),
            None => {
                return Err(Error::initialization_failure(
                    "Unable to select a further distinct seed",
                ))
            }
        }
    }

    Ok(chosen)
}

/// Copy the selected rows into a fresh centroid matrix
fn gather_rows(data: ArrayView2<f64>, indices: &[usize]) -> Array2<f64> {
    let mut centroids = Array2::zeros((indices.len(), data.ncols()));
    for (i, &data_idx) in indices.iter().enumerate() {
        centroids.row_mut(i).assign(&data.row(data_idx));
    }
    centroids
}
