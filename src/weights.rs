//! Weight vectors and the loader that reads them from per-sample tables.

use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::config::AnalysisConfig;
use crate::error::{AcceptanceError, Result};
use crate::layout::N_WEIGHTS;

/// Which step of the simulation a weight sum was taken at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Generator,
    Reconstructed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Generator => write!(f, "generator"),
            Stage::Reconstructed => write!(f, "reconstructed"),
        }
    }
}

/// Sums of event weights, one per variation, in the fixed 111-bin layout.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector {
    stage: Stage,
    values: Vec<f64>,
}

impl WeightVector {
    pub fn new(stage: Stage, values: Vec<f64>) -> Result<Self> {
        if values.len() != N_WEIGHTS {
            return Err(AcceptanceError::MalformedVector {
                name: stage.to_string(),
                reason: format!("expected {} bins, found {}", N_WEIGHTS, values.len()),
            });
        }
        Ok(Self { stage, values })
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    /// Content of 1-based `bin`.
    ///
    /// Panics if `bin` is outside `1..=111`; callers index through the
    /// constants in [`crate::layout`].
    pub fn bin(&self, bin: usize) -> f64 {
        self.values[bin - 1]
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    /// Same vector with every bin multiplied by `factor`.
    pub fn scaled(&self, stage: Stage, factor: f64) -> Self {
        Self {
            stage,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }
}

/// Location of a sample's weight table under `input_dir`.
pub fn table_path(config: &AnalysisConfig, sample: &str) -> PathBuf {
    config.input_dir.join(format!("{}.tsv", sample))
}

fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(AcceptanceError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_parse_options(CsvParseOptions::default().with_separator(b'\t'))
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn extract_vector(df: &DataFrame, path: &Path, name: &str, stage: Stage) -> Result<WeightVector> {
    let Ok(column) = df.column(name) else {
        return Err(AcceptanceError::MissingVector {
            path: path.to_path_buf(),
            name: name.to_string(),
        });
    };
    let malformed = |reason: String| AcceptanceError::MalformedVector {
        name: name.to_string(),
        reason,
    };
    if column.len() != N_WEIGHTS {
        return Err(malformed(format!(
            "expected {} bins, found {}",
            N_WEIGHTS,
            column.len()
        )));
    }
    let column = column
        .cast(&DataType::Float64)
        .map_err(|e| malformed(e.to_string()))?;
    let values = column
        .f64()?
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| malformed("contains empty bins".to_string()))?;
    WeightVector::new(stage, values)
}

/// Loads the generator and reconstructed weight vectors of `sample` at
/// selection `level`.
pub fn load(
    config: &AnalysisConfig,
    sample: &str,
    level: &str,
) -> Result<(WeightVector, WeightVector)> {
    let path = table_path(config, sample);
    let df = read_table(&path)?;
    tracing::info!(path = %path.display(), rows = df.height(), "loaded weight table");
    let gen = extract_vector(
        &df,
        &path,
        &config.vector_name(Stage::Generator, level),
        Stage::Generator,
    )?;
    let rec = extract_vector(
        &df,
        &path,
        &config.vector_name(Stage::Reconstructed, level),
        Stage::Reconstructed,
    )?;
    Ok((gen, rec))
}
