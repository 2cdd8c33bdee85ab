//! Performance page: fit, walk through Lloyd's iterations, score the result

use crate::error::{Error, Result};
use crate::initialization::InitMethod;
use crate::kmeans::{KMeans, KMeansResult};
use crate::metrics::{silhouette_score, wcss};
use crate::plot::{series_by_cluster, Color, Marker, ScatterPlot, Series};
use log::info;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Parameters of the performance page
#[derive(Debug, Clone)]
pub struct PerformancePage {
    /// Number of clusters
    pub n_clusters: usize,
    /// Seed for both the fitted model and the walkthrough's initial centers
    pub seed: u64,
    /// Iteration cap for both fits
    pub max_iter: usize,
    /// Restarts of the fitted model
    pub n_init: usize,
}

impl Default for PerformancePage {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            seed: 42,
            max_iter: 300,
            n_init: 10,
        }
    }
}

/// Everything the performance page shows
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PerformanceReport {
    /// Cluster of every sample under the fitted model; colors the plot
    pub predicted: Array1<usize>,
    /// Ground truth, kept for comparison only
    pub targets: Array1<usize>,
    /// Lloyd's walkthrough from seeded random rows until no center moves
    pub walkthrough: KMeansResult,
    /// WCSS of the walkthrough's final clustering
    pub wcss: f64,
    /// WCSS of the walkthrough's initial centers under its final assignment
    pub initial_wcss: f64,
    /// Silhouette score of the walkthrough's final clustering
    pub silhouette: f64,
    /// Samples colored by predicted cluster with the final centers overlaid
    #[cfg_attr(feature = "serde", serde(skip))]
    pub plot: ScatterPlot,
}

impl PerformancePage {
    /// Page for `n_clusters` clusters with default seed 42
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Default::default()
        }
    }

    /// Set the seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the iteration cap
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of restarts of the fitted model
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Cluster `data` and evaluate the result
    pub fn run(&self, data: ArrayView2<f64>, targets: ArrayView1<usize>) -> Result<PerformanceReport> {
        if targets.len() != data.nrows() {
            return Err(Error::invalid_data(format!(
                "Got {} samples but {} labels",
                data.nrows(),
                targets.len()
            )));
        }
        info!(
            "performance page: {} samples, {} features, k={}",
            data.nrows(),
            data.ncols(),
            self.n_clusters
        );

        let model = KMeans::new(self.n_clusters)
            .random_state(self.seed)
            .n_init(self.n_init)
            .max_iter(self.max_iter)
            .fit(data)?;
        let predicted = model.predict(data)?;

        let walkthrough = KMeans::new(self.n_clusters)
            .init_method(InitMethod::Random)
            .n_init(1)
            .tolerance(0.0)
            .max_iter(self.max_iter)
            .random_state(self.seed)
            .fit(data)?;

        let final_wcss = wcss(data, walkthrough.centroids.view(), walkthrough.labels.view())?;
        let initial_wcss = wcss(
            data,
            walkthrough.initial_centroids.view(),
            walkthrough.labels.view(),
        )?;
        let silhouette = silhouette_score(data, walkthrough.labels.view())?;
        info!(
            "walkthrough converged={} after {} iterations: WCSS {final_wcss:.4}, silhouette {silhouette:.4}",
            walkthrough.converged, walkthrough.n_iter
        );

        let plot = scatter(data, predicted.view(), &walkthrough)?;

        Ok(PerformanceReport {
            predicted,
            targets: targets.to_owned(),
            walkthrough,
            wcss: final_wcss,
            initial_wcss,
            silhouette,
            plot,
        })
    }
}

fn scatter(
    data: ArrayView2<f64>,
    predicted: ArrayView1<usize>,
    walkthrough: &KMeansResult,
) -> Result<ScatterPlot> {
    let y_col = usize::from(data.ncols() > 1);
    let project = |centers: &Array2<f64>| -> Vec<(f64, f64)> {
        centers
            .rows()
            .into_iter()
            .map(|c| (c[0], c[y_col]))
            .collect()
    };

    let mut plot = ScatterPlot::new("K-Means clusters")
        .x_label("feature 0")
        .y_label(format!("feature {y_col}"));
    for series in series_by_cluster(data, 0, y_col, predicted, &[])? {
        plot = plot.add_series(series);
    }
    Ok(plot
        .add_series(
            Series::new(
                "initial centers",
                project(&walkthrough.initial_centroids),
                Color::BLACK,
            )
            .radius(9.0)
            .marker(Marker::Hollow),
        )
        .add_series(
            Series::new("final centers", project(&walkthrough.centroids), Color::BLACK)
                .radius(9.0)
                .opacity(0.5),
        ))
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance of the K-Means Classifier")?;
        writeln!(f, "WCSS: {}", self.wcss)?;
        writeln!(f, "Silhouette: {}", self.silhouette)?;
        writeln!(
            f,
            "Lloyd iterations: {} (converged: {})",
            self.walkthrough.n_iter, self.walkthrough.converged
        )?;
        writeln!(f, "WCSS at the initial random centers: {}", self.initial_wcss)?;
        writeln!(f, "Centers:")?;
        for (i, center) in self.walkthrough.centroids.rows().into_iter().enumerate() {
            let coords: Vec<String> = center.iter().map(|v| format!("{v:.4}")).collect();
            writeln!(f, "  {i}: [{}]", coords.join(", "))?;
        }
        Ok(())
    }
}
