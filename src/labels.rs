//! Translating cluster ids into human-readable class names
//!
//! K-means numbers its clusters arbitrarily, so a fixed id-to-name table is
//! only a display convention. [`LabelMapping::majority_vote`] derives the
//! table from ground truth instead.

use crate::error::{Error, Result};
use ndarray::ArrayView1;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Names shown for the two mushroom clusters when no ground truth is consulted
pub const MUSHROOM_LABELS: [&str; 2] = ["edible", "poisonous"];

/// How cluster ids were turned into names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum MappingStrategy {
    /// Hardcoded table, id `i` gets the `i`-th name
    #[default]
    Fixed,
    /// Each cluster takes the most common ground-truth class among its members
    MajorityVote,
}

/// Lookup table from cluster id to class name
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelMapping {
    names: Vec<String>,
    strategy: MappingStrategy,
}

impl LabelMapping {
    /// Fixed table: cluster `i` is called `names[i]`
    pub fn fixed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            strategy: MappingStrategy::Fixed,
        }
    }

    /// The `0 -> edible, 1 -> poisonous` table used for the mushroom page
    pub fn mushrooms() -> Self {
        Self::fixed(MUSHROOM_LABELS)
    }

    /// Name each cluster after the most frequent true class among its members.
    ///
    /// Ties go to the lexicographically smallest class. A cluster with no
    /// members is called `cluster-{id}`.
    pub fn majority_vote<S: AsRef<str>>(
        predicted: ArrayView1<usize>,
        truth: &[S],
        n_clusters: usize,
    ) -> Result<Self> {
        if predicted.len() != truth.len() {
            return Err(Error::invalid_data(format!(
                "Got {} predictions but {} ground-truth labels",
                predicted.len(),
                truth.len()
            )));
        }

        let mut votes: Vec<BTreeMap<&str, usize>> = vec![BTreeMap::new(); n_clusters];
        for (&cluster, class) in predicted.iter().zip(truth) {
            let tally = votes.get_mut(cluster).ok_or_else(|| {
                Error::invalid_data(format!(
                    "Cluster id {cluster} out of range for {n_clusters} clusters"
                ))
            })?;
            *tally.entry(class.as_ref()).or_insert(0) += 1;
        }

        let names = votes
            .iter()
            .enumerate()
            .map(|(cluster, tally)| {
                // BTreeMap iterates in key order, so the first maximum is the smallest name
                let mut winner: Option<(&str, usize)> = None;
                for (&class, &count) in tally {
                    if winner.map_or(true, |(_, best)| count > best) {
                        winner = Some((class, count));
                    }
                }
                winner.map_or_else(|| format!("cluster-{cluster}"), |(class, _)| class.to_string())
            })
            .collect();

        Ok(Self {
            names,
            strategy: MappingStrategy::MajorityVote,
        })
    }

    /// How this table was built
    pub fn strategy(&self) -> MappingStrategy {
        self.strategy
    }

    /// Name of every cluster, indexed by cluster id
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of clusters the table covers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of a single cluster
    pub fn label(&self, cluster: usize) -> Result<&str> {
        self.names.get(cluster).map(String::as_str).ok_or_else(|| {
            Error::invalid_data(format!(
                "No label for cluster {cluster}; mapping covers {} clusters",
                self.names.len()
            ))
        })
    }

    /// Names for every prediction
    pub fn apply(&self, predicted: ArrayView1<usize>) -> Result<Vec<String>> {
        predicted
            .iter()
            .map(|&cluster| self.label(cluster).map(str::to_string))
            .collect()
    }

    /// Fraction of predictions whose mapped name equals the true class
    pub fn agreement<S: AsRef<str>>(&self, predicted: ArrayView1<usize>, truth: &[S]) -> Result<f64> {
        if predicted.len() != truth.len() {
            return Err(Error::invalid_data(format!(
                "Got {} predictions but {} ground-truth labels",
                predicted.len(),
                truth.len()
            )));
        }
        if predicted.is_empty() {
            return Err(Error::invalid_data("Cannot score an empty prediction set"));
        }

        let mut hits = 0usize;
        for (&cluster, class) in predicted.iter().zip(truth) {
            if self.label(cluster)? == class.as_ref() {
                hits += 1;
            }
        }

        Ok(hits as f64 / predicted.len() as f64)
    }
}
