//! Error types for the kmeanslab crate

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading data, clustering or evaluating
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input parameters
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Error message
        message: String,
    },

    /// Empty or invalid data
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message
        message: String,
    },

    /// No restart produced a usable result
    #[error("Convergence failure: {message}")]
    ConvergenceFailure {
        /// Error message
        message: String,
    },

    /// Initialization failure
    #[error("Initialization failure: {message}")]
    InitializationFailure {
        /// Error message
        message: String,
    },

    /// Mathematical computation error
    #[error("Computation error: {message}")]
    ComputationError {
        /// Error message
        message: String,
    },

    /// A cluster lost all of its points and the fitter was told not to recover
    #[error("Cluster {cluster} has no assigned points")]
    EmptyCluster {
        /// Index of the empty cluster
        cluster: usize,
    },

    /// Silhouette needs between 2 and n_samples - 1 distinct clusters
    #[error("Degenerate clustering: {message}")]
    DegenerateClusters {
        /// Error message
        message: String,
    },

    /// A required CSV column is absent from the header
    #[error("Missing column `{column}` in CSV header")]
    MissingColumn {
        /// Column name
        column: String,
    },

    /// A CSV cell could not be parsed as a number
    #[error("Row {row}, column `{column}`: cannot parse `{value}` as a number")]
    Parse {
        /// 1-based data row (header excluded)
        row: usize,
        /// Column name
        column: String,
        /// Raw cell content
        value: String,
    },

    /// I/O failure while reading or writing files
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV decoding failure
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a new InvalidParameter error
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a new InvalidData error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new ConvergenceFailure error
    pub fn convergence_failure(message: impl Into<String>) -> Self {
        Self::ConvergenceFailure {
            message: message.into(),
        }
    }

    /// Create a new InitializationFailure error
    pub fn initialization_failure(message: impl Into<String>) -> Self {
        Self::InitializationFailure {
            message: message.into(),
        }
    }

    /// Create a new ComputationError
    pub fn computation_error(message: impl Into<String>) -> Self {
        Self::ComputationError {
            message: message.into(),
        }
    }

    /// Create a new DegenerateClusters error
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateClusters {
            message: message.into(),
        }
    }

    /// Create a new MissingColumn error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}
