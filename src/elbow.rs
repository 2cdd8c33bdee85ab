//! WCSS-versus-k curves for choosing the number of clusters

use crate::error::{Error, Result};
use crate::kmeans::KMeans;
use log::debug;
use ndarray::ArrayView2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// WCSS reached with `k` clusters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElbowPoint {
    /// Number of clusters
    pub k: usize,
    /// Within-cluster sum of squares of the best run
    pub wcss: f64,
}

/// Fit `template` once per `k` and record the resulting WCSS
pub fn elbow_curve<I>(data: ArrayView2<f64>, ks: I, template: &KMeans) -> Result<Vec<ElbowPoint>>
where
    I: IntoIterator<Item = usize>,
{
    let mut curve = Vec::new();
    for k in ks {
        let mut model = template.clone();
        model.n_clusters = k;
        let result = model.fit(data)?;
        debug!("elbow: k={k} wcss={:.6}", result.inertia);
        curve.push(ElbowPoint {
            k,
            wcss: result.inertia,
        });
    }

    if curve.is_empty() {
        return Err(Error::invalid_parameter("At least one k is required"));
    }
    Ok(curve)
}

/// The `k` farthest below the straight line joining the first and last points.
///
/// Returns `None` when the curve has fewer than three points or is flat.
pub fn knee(curve: &[ElbowPoint]) -> Option<usize> {
    if curve.len() < 3 {
        return None;
    }
    let first = curve.first()?;
    let last = curve.last()?;

    let (x0, y0) = (first.k as f64, first.wcss);
    let (x1, y1) = (last.k as f64, last.wcss);
    let dx = x1 - x0;
    if dx == 0.0 {
        return None;
    }

    curve
        .iter()
        .map(|p| {
            let chord = y0 + (y1 - y0) * (p.k as f64 - x0) / dx;
            (p.k, chord - p.wcss)
        })
        .filter(|&(_, gap)| gap > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::make_blobs;

    fn point(k: usize, wcss: f64) -> ElbowPoint {
        ElbowPoint { k, wcss }
    }

    #[test]
    fn test_elbow_curve_decreases() {
        let blobs = make_blobs(90, 3, 2, 0.4, 11).unwrap();
        let template = KMeans::new(1).random_state(0).n_init(5);

        let curve = elbow_curve(blobs.features.view(), 1..=5, &template).unwrap();
        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0].k, 1);
        assert!(curve[4].wcss < curve[0].wcss);
        assert!(curve[2].wcss < curve[1].wcss);
    }

    #[test]
    fn test_elbow_curve_rejects_bad_k() {
        let blobs = make_blobs(10, 2, 2, 0.4, 1).unwrap();
        let template = KMeans::new(1).random_state(0);

        assert!(elbow_curve(blobs.features.view(), [0], &template).is_err());
        assert!(elbow_curve(blobs.features.view(), [11], &template).is_err());
        assert!(elbow_curve(blobs.features.view(), std::iter::empty(), &template).is_err());
    }

    #[test]
    fn test_knee() {
        let curve = [
            point(1, 100.0),
            point(2, 40.0),
            point(3, 10.0),
            point(4, 8.0),
            point(5, 7.0),
        ];
        assert_eq!(knee(&curve), Some(3));
    }

    #[test]
    fn test_knee_degenerate() {
        assert_eq!(knee(&[point(1, 3.0), point(2, 1.0)]), None);
        assert_eq!(knee(&[point(1, 3.0), point(2, 2.0), point(3, 1.0)]), None);
    }
}
