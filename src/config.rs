//! Analysis configuration and batch files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::weights::Stage;

pub const DEFAULT_VECTOR_PREFIX: &str = "list_vectors_weights";

/// Settings shared by every job of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    /// Directory holding one `<sample>.tsv` weight table per sample.
    pub input_dir: PathBuf,
    /// Column prefix of the weight vectors.
    pub vector_prefix: String,
    /// Where figures go when `save_figures` is set.
    pub figures_dir: PathBuf,
    pub save_figures: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            vector_prefix: DEFAULT_VECTOR_PREFIX.to_string(),
            figures_dir: PathBuf::from("figures"),
            save_figures: false,
        }
    }
}

impl AnalysisConfig {
    /// Column name of the weight vector for `stage`; the generator vector is
    /// shared by all selection levels.
    pub fn vector_name(&self, stage: Stage, level: &str) -> String {
        match stage {
            Stage::Generator => format!("{}_gen", self.vector_prefix),
            Stage::Reconstructed => format!("{}_{}", self.vector_prefix, level),
        }
    }
}

/// One (sample, label, level) triple to process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub sample: String,
    #[serde(default)]
    pub label: String,
    pub level: String,
}

impl Job {
    pub fn new(sample: &str, label: &str, level: &str) -> Self {
        Self {
            sample: sample.to_string(),
            label: label.to_string(),
            level: level.to_string(),
        }
    }
}

/// JSON batch description. Every setting is optional so that command-line
/// flags can fill in or override it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchFile {
    pub input_dir: Option<PathBuf>,
    pub vector_prefix: Option<String>,
    pub figures_dir: Option<PathBuf>,
    pub save_figures: Option<bool>,
    pub jobs: Vec<Job>,
}

impl BatchFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Configuration from the file, with relative directories resolved
    /// against `base` (usually the directory of the batch file).
    pub fn config(&self, base: &Path) -> AnalysisConfig {
        let defaults = AnalysisConfig::default();
        let resolve = |p: &Option<PathBuf>, fallback: PathBuf| match p {
            Some(p) if p.is_relative() => base.join(p),
            Some(p) => p.clone(),
            None => fallback,
        };
        AnalysisConfig {
            input_dir: resolve(&self.input_dir, defaults.input_dir),
            vector_prefix: self
                .vector_prefix
                .clone()
                .unwrap_or(defaults.vector_prefix),
            figures_dir: resolve(&self.figures_dir, defaults.figures_dir),
            save_figures: self.save_figures.unwrap_or(defaults.save_figures),
        }
    }
}
