//! Distance metrics for numeric feature vectors

use crate::error::{Error, Result};
use ndarray::{ArrayView1, ArrayView2};

/// Trait for computing distances between numeric data points
pub trait Distance {
    /// Compute distance between two data points
    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64>;

    /// Compute distances between a single point and every centroid row
    fn distances_to_centroids(
        &self,
        point: ArrayView1<f64>,
        centroids: ArrayView2<f64>,
    ) -> Result<Vec<f64>> {
        if centroids.ncols() != point.len() {
            return Err(Error::invalid_data(
                "Point and centroids must have same number of features",
            ));
        }

        let mut distances = Vec::with_capacity(centroids.nrows());
        for centroid_row in centroids.rows() {
            distances.push(self.distance(point, centroid_row)?);
        }
        Ok(distances)
    }
}

/// Euclidean (L2) distance
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl Distance for EuclideanDistance {
    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
        Ok(squared_euclidean(a, b)?.sqrt())
    }
}

/// Squared Euclidean distance.
///
/// Ranks neighbours identically to [`EuclideanDistance`] and is what WCSS sums.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclideanDistance;

impl Distance for SquaredEuclideanDistance {
    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
        squared_euclidean(a, b)
    }
}

/// Sum of squared coordinate differences
pub fn squared_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::invalid_data("Vectors must have the same length"));
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum())
}
