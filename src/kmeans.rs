//! K-means clustering (Lloyd's algorithm) for numeric data

use crate::distance::{squared_euclidean, Distance, SquaredEuclideanDistance};
use crate::error::{Error, Result};
use crate::initialization::{initialize_centroids, InitMethod};
use crate::metrics::wcss;
use crate::utils::{
    assign_points_to_centroids, cluster_sizes, get_cluster_indices, mean_feature_variance,
    validate_data, validate_parameters,
};
use log::{debug, trace, warn};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::prelude::*;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do when an update step leaves a cluster without points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EmptyClusterPolicy {
    /// Keep the center from the previous iteration
    #[default]
    KeepPrevious,
    /// Move the center onto the point farthest from its own center
    Reseed,
    /// Abort the fit with [`Error::EmptyCluster`]
    Fail,
}

/// K-means clustering algorithm
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KMeans {
    /// Number of clusters
    pub n_clusters: usize,
    /// Initialization method
    pub init_method: InitMethod,
    /// Maximum number of Lloyd iterations per run
    pub max_iter: usize,
    /// Convergence tolerance on the total squared center shift, relative to
    /// the mean feature variance. Zero means "stop only when no center moves".
    pub tol: f64,
    /// Number of initialization runs
    pub n_init: usize,
    /// Random seed for reproducibility
    pub random_state: Option<u64>,
    /// Number of parallel jobs
    pub n_jobs: Option<usize>,
    /// Empty cluster handling during the update step
    pub empty_cluster: EmptyClusterPolicy,
}

/// Result of k-means clustering
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KMeansResult {
    /// Cluster labels for each data point
    pub labels: Array1<usize>,
    /// Final cluster centroids
    pub centroids: Array2<f64>,
    /// Centroids the winning run started from
    pub initial_centroids: Array2<f64>,
    /// Number of iterations until convergence
    pub n_iter: usize,
    /// Final inertia (within-cluster sum of squares)
    pub inertia: f64,
    /// Whether the algorithm converged
    pub converged: bool,
    /// Inertia after every assignment step of the winning run
    pub inertia_history: Vec<f64>,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            init_method: InitMethod::KMeansPlusPlus,
            max_iter: 300,
            tol: 1e-4,
            n_init: 10,
            random_state: None,
            n_jobs: None,
            empty_cluster: EmptyClusterPolicy::KeepPrevious,
        }
    }
}

impl KMeans {
    /// Create a new k-means clusterer with specified number of clusters
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    /// Set the initialization method
    pub fn init_method(mut self, method: InitMethod) -> Self {
        self.init_method = method;
        self
    }

    /// Set the maximum number of iterations
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the number of initialization runs
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the random seed for reproducibility
    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Set the number of parallel jobs
    pub fn n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Set the empty cluster policy
    pub fn empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Fit the k-means algorithm to the data.
    ///
    /// Runs `n_init` independently seeded restarts and keeps the one with
    /// the lowest inertia.
    pub fn fit(&self, data: ArrayView2<f64>) -> Result<KMeansResult> {
        self.validate_input(data)?;

        let base_seed = self
            .random_state
            .unwrap_or_else(|| rand::thread_rng().gen());
        let tol = self.tol * mean_feature_variance(data);
        let run = |i: usize| self.fit_single(data, base_seed.wrapping_add(i as u64), tol);

        let results: Vec<Result<KMeansResult>> = match self.n_jobs {
            Some(1) => (0..self.n_init).map(run).collect(),
            Some(n_jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(n_jobs)
                .build()
                .map_err(|e| Error::computation_error(format!("Cannot build thread pool: {e}")))?
                .install(|| (0..self.n_init).into_par_iter().map(&run).collect()),
            None if self.n_init > 1 => (0..self.n_init).into_par_iter().map(&run).collect(),
            None => (0..self.n_init).map(run).collect(),
        };

        let mut best_result: Option<KMeansResult> = None;
        for (i, result) in results.into_iter().enumerate() {
            let result = result?;
            debug!(
                "k-means run {} of {}: inertia {:.6}, {} iterations",
                i + 1,
                self.n_init,
                result.inertia,
                result.n_iter
            );
            let better = best_result
                .as_ref()
                .map_or(true, |best| result.inertia < best.inertia);
            if better {
                best_result = Some(result);
            }
        }

        best_result.ok_or_else(|| Error::convergence_failure("No successful runs"))
    }

    /// Single run of Lloyd's algorithm from one seeded initialization
    fn fit_single(&self, data: ArrayView2<f64>, seed: u64, tol: f64) -> Result<KMeansResult> {
        let mut rng = StdRng::seed_from_u64(seed);

        let initial_centroids =
            initialize_centroids(data, self.n_clusters, self.init_method, &mut rng)?;
        let mut centroids = initial_centroids.clone();
        let mut inertia_history = Vec::new();
        let mut n_iter = 0;
        let mut converged = false;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;

            let labels = assign_labels(data, centroids.view())?;
            let inertia = wcss(data, centroids.view(), labels.view())?;
            inertia_history.push(inertia);

            let new_centroids = self.update_centroids(data, &labels, &centroids)?;
            let shift = centroid_shift(&centroids, &new_centroids);
            centroids = new_centroids;

            trace!("iteration {n_iter}: inertia {inertia:.6}, center shift {shift:.3e}");

            if shift <= tol {
                converged = true;
                debug!("k-means converged after {n_iter} iterations (seed {seed})");
                break;
            }
        }

        if !converged {
            warn!(
                "k-means stopped at max_iter={} without converging (seed {seed})",
                self.max_iter
            );
        }

        let labels = assign_labels(data, centroids.view())?;
        let inertia = wcss(data, centroids.view(), labels.view())?;

        Ok(KMeansResult {
            labels,
            centroids,
            initial_centroids,
            n_iter,
            inertia,
            converged,
            inertia_history,
        })
    }

    /// Move each centroid to the mean of its assigned points
    fn update_centroids(
        &self,
        data: ArrayView2<f64>,
        labels: &Array1<usize>,
        previous: &Array2<f64>,
    ) -> Result<Array2<f64>> {
        let cluster_indices = get_cluster_indices(labels.view(), self.n_clusters);
        let mut new_centroids = previous.clone();
        let mut reseeded = Vec::new();

        for (cluster_id, indices) in cluster_indices.iter().enumerate() {
            if indices.is_empty() {
                match self.empty_cluster {
                    EmptyClusterPolicy::KeepPrevious => {
                        debug!("cluster {cluster_id} is empty, keeping its previous center");
                    }
                    EmptyClusterPolicy::Reseed => {
                        let idx = farthest_point(data, labels, previous, &reseeded)?;
                        debug!("cluster {cluster_id} is empty, reseeding at row {idx}");
                        new_centroids.row_mut(cluster_id).assign(&data.row(idx));
                        reseeded.push(idx);
                    }
                    EmptyClusterPolicy::Fail => {
                        return Err(Error::EmptyCluster {
                            cluster: cluster_id,
                        })
                    }
                }
            } else {
                let mean = data
                    .select(Axis(0), indices)
                    .mean_axis(Axis(0))
                    .ok_or_else(|| Error::computation_error("Cannot average an empty cluster"))?;
                new_centroids.row_mut(cluster_id).assign(&mean);
            }
        }

        Ok(new_centroids)
    }

    /// Validate input parameters and data
    fn validate_input(&self, data: ArrayView2<f64>) -> Result<()> {
        validate_parameters(self.n_clusters, self.max_iter, self.tol, self.n_init)?;
        validate_data(data)?;

        if self.n_clusters > data.nrows() {
            return Err(Error::invalid_parameter(
                "Number of clusters cannot exceed number of data points",
            ));
        }

        Ok(())
    }

    /// Fit the model and return only the cluster assignments
    pub fn fit_predict(&self, data: ArrayView2<f64>) -> Result<Array1<usize>> {
        let result = self.fit(data)?;
        Ok(result.labels)
    }
}

impl KMeansResult {
    /// Number of clusters
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Assign new points to the fitted centroids
    pub fn predict(&self, data: ArrayView2<f64>) -> Result<Array1<usize>> {
        validate_data(data)?;
        if data.ncols() != self.centroids.ncols() {
            return Err(Error::invalid_data(format!(
                "Model was fitted on {} features, got {}",
                self.centroids.ncols(),
                data.ncols()
            )));
        }
        assign_labels(data, self.centroids.view())
    }

    /// Number of points in each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        cluster_sizes(self.labels.view(), self.n_clusters())
    }
}

/// Nearest-centroid assignment under Euclidean distance.
///
/// Squared distances rank identically and skip the square root.
fn assign_labels(data: ArrayView2<f64>, centroids: ArrayView2<f64>) -> Result<Array1<usize>> {
    let metric = SquaredEuclideanDistance;
    assign_points_to_centroids(data, centroids, |a, b| metric.distance(a, b))
}

/// Total squared movement of all centroids between two iterations
fn centroid_shift(old: &Array2<f64>, new: &Array2<f64>) -> f64 {
    old.iter()
        .zip(new.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum()
}

/// Row farthest from its assigned center, excluding rows already used as reseeds
fn farthest_point(
    data: ArrayView2<f64>,
    labels: &Array1<usize>,
    centroids: &Array2<f64>,
    exclude: &[usize],
) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, point) in data.rows().into_iter().enumerate() {
        if exclude.contains(&i) {
            continue;
        }
        let d = squared_euclidean(point, centroids.row(labels[i]))?;
        if best.map_or(true, |(_, best_d)| d > best_d) {
            best = Some((i, d));
        }
    }

    best.map(|(i, _)| i)
        .ok_or_else(|| Error::computation_error("No point left to reseed an empty cluster"))
}
