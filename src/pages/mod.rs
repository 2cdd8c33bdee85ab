//! The two demo pages.
//!
//! Each page takes its inputs explicitly and returns a report carrying the
//! numbers and the plot it shows; nothing is shared between pages.

pub mod performance;
pub mod unsupervised;

pub use performance::{PerformancePage, PerformanceReport};
pub use unsupervised::{MushroomPage, MushroomReport};

use crate::dataset::{make_blobs, Blobs};
use crate::error::Result;

/// Spread of each synthetic blob
pub const SYNTHETIC_STD: f64 = 1.0;

/// Two-feature Gaussian blobs for the performance page, one blob per cluster
pub fn synthetic_session(n_samples: usize, n_clusters: usize, seed: u64) -> Result<Blobs> {
    make_blobs(n_samples, n_clusters, 2, SYNTHETIC_STD, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_session_feeds_performance_page() {
        let session = synthetic_session(60, 3, 42).unwrap();
        assert_eq!(session.features.dim(), (60, 2));

        let report = PerformancePage::new(3)
            .run(session.features.view(), session.targets.view())
            .unwrap();
        assert_eq!(report.walkthrough.n_clusters(), 3);
        assert!((-1.0..=1.0).contains(&report.silhouette));
        assert!(report.initial_wcss >= report.wcss);
    }
}
