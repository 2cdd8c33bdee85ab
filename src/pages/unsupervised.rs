//! Unsupervised page: two-cluster k-means on the mushroom measurements

use crate::dataset::{CsvLoader, Dataset};
use crate::error::{Error, Result};
use crate::kmeans::KMeans;
use crate::labels::{LabelMapping, MappingStrategy, MUSHROOM_LABELS};
use crate::metrics::{silhouette_score, silhouette_score_sampled};
use crate::plot::{series_by_cluster, ScatterPlot};
use log::{info, warn};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Default location of the mushroom CSV
pub const DEFAULT_CSV: &str = "mushroom.csv";

/// Short description shown above the results
pub const INTRO: &str = "\
K-means splits the mushrooms into two groups using only their cap diameter, \
stem height and stem width. The edibility column is never shown to the \
algorithm; it is used afterwards to name the clusters and to measure how \
well the grouping lines up with the real classes.";

/// Parameters of the mushroom page
#[derive(Debug, Clone)]
pub struct MushroomPage {
    /// CSV with `class`, `cap-diameter`, `stem-height` and `stem-width` columns
    pub csv_path: PathBuf,
    /// Number of clusters
    pub n_clusters: usize,
    /// Seed for the model and for silhouette sampling
    pub seed: u64,
    /// Restarts of the model
    pub n_init: usize,
    /// How cluster ids get their names
    pub mapping: MappingStrategy,
    /// Score the silhouette on this many random rows instead of all of them
    pub silhouette_sample: Option<usize>,
    /// CSV field delimiter
    pub delimiter: u8,
}

impl Default for MushroomPage {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV),
            n_clusters: 2,
            seed: 0,
            n_init: 10,
            mapping: MappingStrategy::Fixed,
            silhouette_sample: None,
            delimiter: b',',
        }
    }
}

/// Everything the mushroom page shows
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MushroomReport {
    /// Rows clustered
    pub n_samples: usize,
    /// Within-cluster sum of squares of the fitted model
    pub wcss: f64,
    /// Silhouette score, possibly estimated on a sample
    pub silhouette: f64,
    /// Whether `silhouette` was estimated on a sample
    pub silhouette_sampled: bool,
    /// Fitted cluster centers
    pub centroids: Array2<f64>,
    /// Cluster id of every row
    pub predicted: Array1<usize>,
    /// Display name of every row's cluster
    pub display_labels: Vec<String>,
    /// Rows per display name
    pub counts: BTreeMap<String, usize>,
    /// Cluster id to name table
    pub mapping: LabelMapping,
    /// Fraction of rows whose display name matches the true class
    pub agreement: f64,
    /// Cap diameter against stem height, colored by display name
    #[cfg_attr(feature = "serde", serde(skip))]
    pub plot: ScatterPlot,
}

impl MushroomPage {
    /// Page reading `csv_path` with default parameters
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            ..Default::default()
        }
    }

    /// Set the number of clusters
    pub fn n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    /// Set the seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of restarts
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set how clusters are named
    pub fn mapping(mut self, mapping: MappingStrategy) -> Self {
        self.mapping = mapping;
        self
    }

    /// Estimate the silhouette on `size` random rows
    pub fn silhouette_sample(mut self, size: usize) -> Self {
        self.silhouette_sample = Some(size);
        self
    }

    /// Set the CSV field delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load the CSV and cluster it
    pub fn run(&self) -> Result<MushroomReport> {
        let dataset = CsvLoader::mushrooms()
            .delimiter(self.delimiter)
            .load(&self.csv_path)?;
        self.run_on(&dataset)
    }

    /// Cluster an already loaded dataset
    pub fn run_on(&self, dataset: &Dataset) -> Result<MushroomReport> {
        let features = dataset.features.view();
        info!(
            "mushroom page: {} rows, k={}, seed={}",
            dataset.n_samples(),
            self.n_clusters,
            self.seed
        );

        let model = KMeans::new(self.n_clusters)
            .random_state(self.seed)
            .n_init(self.n_init)
            .fit(features)?;
        let predicted = model.predict(features)?;

        let silhouette = match self.silhouette_sample {
            Some(size) => silhouette_score_sampled(features, predicted.view(), size, self.seed)?,
            None => silhouette_score(features, predicted.view())?,
        };
        let silhouette_sampled = self
            .silhouette_sample
            .is_some_and(|size| size < dataset.n_samples());

        let truth = dataset.described_targets();
        let mapping = match self.mapping {
            MappingStrategy::Fixed => fixed_mapping(self.n_clusters),
            MappingStrategy::MajorityVote => {
                LabelMapping::majority_vote(predicted.view(), &truth, self.n_clusters)?
            }
        };
        let display_labels = mapping.apply(predicted.view())?;
        let agreement = mapping.agreement(predicted.view(), &truth)?;
        if mapping.strategy() == MappingStrategy::Fixed && agreement < 0.5 {
            warn!(
                "fixed cluster names match the true class on only {:.1}% of rows",
                agreement * 100.0
            );
        }

        let mut counts = BTreeMap::new();
        for name in &display_labels {
            *counts.entry(name.clone()).or_insert(0) += 1;
        }

        let plot = scatter(dataset, &predicted, &mapping)?;

        Ok(MushroomReport {
            n_samples: dataset.n_samples(),
            wcss: model.inertia,
            silhouette,
            silhouette_sampled,
            centroids: model.centroids,
            predicted,
            display_labels,
            counts,
            mapping,
            agreement,
            plot,
        })
    }
}

/// `edible`, `poisonous`, then `cluster-{id}` for anything beyond two clusters
fn fixed_mapping(n_clusters: usize) -> LabelMapping {
    LabelMapping::fixed((0..n_clusters).map(|i| {
        MUSHROOM_LABELS
            .get(i)
            .map_or_else(|| format!("cluster-{i}"), |name| name.to_string())
    }))
}

fn scatter(dataset: &Dataset, predicted: &Array1<usize>, mapping: &LabelMapping) -> Result<ScatterPlot> {
    let column = |name: &str| {
        dataset
            .feature_index(name)
            .ok_or_else(|| Error::missing_column(name))
    };
    let x_col = column("cap-diameter")?;
    let y_col = column("stem-height")?;

    let mut plot = ScatterPlot::new("Cap Diameter vs Stem Height by Predicted Mushroom Edibility")
        .x_label("Cap Diameter (cm)")
        .y_label("Stem Height (cm)");
    for series in series_by_cluster(
        dataset.features.view(),
        x_col,
        y_col,
        predicted.view(),
        mapping.names(),
    )? {
        plot = plot.add_series(series.radius(2.5).opacity(0.6));
    }
    Ok(plot)
}

impl fmt::Display for MushroomReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "K-means clustering applied to the Mushroom Dataset")?;
        writeln!(f, "Within-Cluster Sum of Squares: {}", self.wcss)?;
        if self.silhouette_sampled {
            writeln!(f, "K-means Silhouette Score (sampled): {}", self.silhouette)?;
        } else {
            writeln!(f, "K-means Silhouette Score: {}", self.silhouette)?;
        }
        for (name, count) in &self.counts {
            writeln!(f, "  {name}: {count} of {}", self.n_samples)?;
        }
        writeln!(
            f,
            "Agreement with the true class: {:.2}%",
            self.agreement * 100.0
        )?;
        if self.mapping.strategy() == MappingStrategy::Fixed {
            writeln!(
                f,
                "Cluster names come from a fixed table, not from the data."
            )?;
        }
        Ok(())
    }
}
