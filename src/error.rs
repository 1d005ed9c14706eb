//! Error types for loading weight tables and computing uncertainties.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::weights::Stage;

/// Errors raised while processing a single (sample, level) job.
#[derive(Error, Debug)]
pub enum AcceptanceError {
    /// The sample's weight table does not exist.
    #[error("weight table not found: {}", path.display())]
    MissingFile {
        /// Expected location of the table.
        path: PathBuf,
    },

    /// The table exists but has no column with the requested name.
    #[error("weight vector '{name}' not found in {}", path.display())]
    MissingVector {
        /// Table that was searched.
        path: PathBuf,
        /// Column name that was requested.
        name: String,
    },

    /// The column exists but cannot be used as a weight vector.
    #[error("weight vector '{name}' is malformed: {reason}")]
    MalformedVector {
        /// Column name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A ratio would divide by zero (or a non-finite weight was read).
    #[error("numerically degenerate input: {stage} weight in bin {bin} is {value}")]
    NumericDegenerate {
        /// Stage of the offending vector.
        stage: Stage,
        /// 1-based bin index.
        bin: usize,
        /// The offending value.
        value: f64,
    },

    /// A bin index outside the 111-bin weight layout was requested.
    #[error("bin {bin} is outside the weight layout (1..={max})")]
    OutOfLayout {
        /// Requested 1-based bin.
        bin: usize,
        /// Last bin of the layout.
        max: usize,
    },

    /// Reading or writing a table failed.
    #[error("table error: {0}")]
    Table(#[from] PolarsError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Plot rendering failed.
    #[error("plot error: {0}")]
    Plot(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AcceptanceError>;
