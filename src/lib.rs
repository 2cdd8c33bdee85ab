//! # K-means clustering with evaluation
//!
//! This crate implements Lloyd's k-means algorithm together with the two
//! measures commonly used to judge a clustering without labels: the
//! within-cluster sum of squares (WCSS) and the silhouette score.
//!
//! ## Features
//!
//! - **K-means**: seeded random or k-means++ initialization, multiple restarts
//! - **Metrics**: WCSS and (optionally sampled) silhouette score
//! - **Label mapping**: name clusters with a fixed table or by majority vote
//! - **Datasets**: CSV loading and synthetic Gaussian blobs
//! - **Plots**: SVG scatter plots colored by cluster
//! - Parallel restarts and silhouette computation via Rayon
//!
//! ## Example
//!
//! ```rust
//! use kmeanslab::{KMeans, InitMethod, metrics};
//! use ndarray::array;
//!
//! let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
//!
//! let result = KMeans::new(2)
//!     .init_method(InitMethod::KMeansPlusPlus)
//!     .random_state(42)
//!     .fit(data.view())
//!     .unwrap();
//!
//! let score = metrics::silhouette_score(data.view(), result.labels.view()).unwrap();
//! assert!((result.inertia - 1.0).abs() < 1e-9);
//! assert!(score > 0.9);
//! ```

#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod dataset;
pub mod distance;
pub mod elbow;
pub mod error;
pub mod initialization;
pub mod kmeans;
pub mod labels;
pub mod metrics;
pub mod pages;
pub mod plot;
pub mod utils;

pub use dataset::{make_blobs, Blobs, CsvLoader, Dataset};
pub use distance::{Distance, EuclideanDistance, SquaredEuclideanDistance};
pub use elbow::{elbow_curve, knee, ElbowPoint};
pub use error::{Error, Result};
pub use initialization::InitMethod;
pub use kmeans::{EmptyClusterPolicy, KMeans, KMeansResult};
pub use labels::{LabelMapping, MappingStrategy};
pub use metrics::{evaluate, silhouette_score, wcss, Evaluation};
pub use pages::{MushroomPage, MushroomReport, PerformancePage, PerformanceReport};
pub use plot::ScatterPlot;

/// Re-export commonly used types from ndarray
pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
