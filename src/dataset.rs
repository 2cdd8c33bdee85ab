//! Loading feature matrices from CSV and generating synthetic blobs

use crate::error::{Error, Result};
use log::info;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_distr::Normal;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Numeric columns clustered on the mushroom page
pub const MUSHROOM_FEATURES: [&str; 3] = ["cap-diameter", "stem-height", "stem-width"];

/// Ground-truth edibility column of the mushroom CSV
pub const MUSHROOM_TARGET: &str = "class";

/// Expand the mushroom class codes `e` and `p`; other values pass through
pub fn describe_class(code: &str) -> &str {
    match code {
        "e" => "edible",
        "p" => "poisonous",
        other => other,
    }
}

/// A feature matrix with one ground-truth label per row
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Samples as rows, features as columns
    pub features: Array2<f64>,
    /// Ground-truth label of each row, as found in the file
    pub targets: Vec<String>,
    /// Header names of the feature columns, in column order
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Number of rows
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Position of a feature column by header name
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Targets with mushroom class codes expanded to full names
    pub fn described_targets(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|t| describe_class(t).to_string())
            .collect()
    }
}

/// Reads selected numeric columns and a label column from a headed CSV
#[derive(Debug, Clone)]
pub struct CsvLoader {
    feature_columns: Vec<String>,
    target_column: String,
    delimiter: u8,
}

impl CsvLoader {
    /// Loader for the given feature columns and label column
    pub fn new<I, S>(feature_columns: I, target_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feature_columns: feature_columns.into_iter().map(Into::into).collect(),
            target_column: target_column.into(),
            delimiter: b',',
        }
    }

    /// Loader for `cap-diameter`, `stem-height`, `stem-width` and `class`
    pub fn mushrooms() -> Self {
        Self::new(MUSHROOM_FEATURES, MUSHROOM_TARGET)
    }

    /// Set the field delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a dataset from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        let dataset = self.read(File::open(path)?)?;
        info!(
            "loaded {} rows x {} features from {}",
            dataset.n_samples(),
            dataset.n_features(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load a dataset from any reader
    pub fn read<R: Read>(&self, reader: R) -> Result<Dataset> {
        if self.feature_columns.is_empty() {
            return Err(Error::invalid_parameter("At least one feature column is required"));
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column_index = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::missing_column(name))
        };
        let feature_idx = self
            .feature_columns
            .iter()
            .map(|name| column_index(name.as_str()))
            .collect::<Result<Vec<usize>>>()?;
        let target_idx = column_index(self.target_column.as_str())?;

        let mut values = Vec::new();
        let mut targets = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            for (&idx, name) in feature_idx.iter().zip(&self.feature_columns) {
                let raw = record.get(idx).unwrap_or_default();
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| Error::Parse {
                        row: row + 1,
                        column: name.clone(),
                        value: raw.to_string(),
                    })?;
                values.push(value);
            }
            targets.push(record.get(target_idx).unwrap_or_default().to_string());
        }

        if targets.is_empty() {
            return Err(Error::invalid_data("CSV file has no data rows"));
        }

        let features = Array2::from_shape_vec((targets.len(), feature_idx.len()), values)
            .map_err(|e| Error::invalid_data(e.to_string()))?;

        Ok(Dataset {
            features,
            targets,
            feature_names: self.feature_columns.clone(),
        })
    }
}

/// Isotropic Gaussian blobs with their generating centers
#[derive(Debug, Clone)]
pub struct Blobs {
    /// Samples as rows
    pub features: Array2<f64>,
    /// Index of the blob each sample was drawn from
    pub targets: Array1<usize>,
    /// Blob centers
    pub centers: Array2<f64>,
}

/// Draw `n_samples` points from `n_centers` Gaussian blobs.
///
/// Centers are uniform in `[-10, 10)` per feature. Samples are split as
/// evenly as possible (earlier blobs take the remainder) and shuffled.
pub fn make_blobs(
    n_samples: usize,
    n_centers: usize,
    n_features: usize,
    cluster_std: f64,
    seed: u64,
) -> Result<Blobs> {
    if n_samples == 0 || n_centers == 0 || n_features == 0 {
        return Err(Error::invalid_parameter(
            "n_samples, n_centers and n_features must all be > 0",
        ));
    }
    if !cluster_std.is_finite() || cluster_std < 0.0 {
        return Err(Error::invalid_parameter(format!(
            "cluster_std must be finite and >= 0, got {cluster_std}"
        )));
    }
    let noise = Normal::new(0.0, cluster_std)
        .map_err(|e| Error::invalid_parameter(format!("cluster_std: {e}")))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let centers = Array2::from_shape_fn((n_centers, n_features), |_| rng.gen_range(-10.0..10.0));

    let mut order: Vec<usize> = (0..n_samples).collect();
    order.shuffle(&mut rng);

    let mut features = Array2::zeros((n_samples, n_features));
    let mut targets = Array1::zeros(n_samples);
    let base = n_samples / n_centers;
    let extra = n_samples % n_centers;

    let mut slots = order.into_iter();
    for center in 0..n_centers {
        let count = base + usize::from(center < extra);
        for row in slots.by_ref().take(count) {
            targets[row] = center;
            for col in 0..n_features {
                features[[row, col]] = centers[[center, col]] + noise.sample(&mut rng);
            }
        }
    }

    Ok(Blobs {
        features,
        targets,
        centers,
    })
}
