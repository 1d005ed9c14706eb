//! Seeded synthetic weight tables, for exercising the pipeline without
//! upstream inputs.

use std::path::PathBuf;

use polars::prelude::*;
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::layout::{ALPHA_S_DOWN, ALPHA_S_UP, NOMINAL, N_WEIGHTS, PDF_REPLICAS};
use crate::weights::{self, Stage, WeightVector};

#[derive(Clone, Debug)]
pub struct SynthSpec {
    /// Nominal generator-level weight sum.
    pub nominal: f64,
    /// Fraction of generated weight surviving reconstruction.
    pub efficiency: f64,
    /// Relative per-bin smearing applied at reconstruction level.
    pub smear: f64,
    pub levels: Vec<String>,
}

impl SynthSpec {
    const QCD_SPREAD: f64 = 0.10;
    const PDF_SPREAD: f64 = 0.02;
    const ALPHA_S_SPREAD: f64 = 0.01;
}

impl Default for SynthSpec {
    fn default() -> Self {
        Self {
            nominal: 1.0e6,
            efficiency: 0.02,
            smear: 0.002,
            levels: vec!["wh3l".to_string()],
        }
    }
}

/// A generator vector and one reconstructed vector per selection level.
#[derive(Clone, Debug)]
pub struct SampleTable {
    pub gen: WeightVector,
    pub rec: Vec<(String, WeightVector)>,
}

fn spread_for(bin: usize) -> f64 {
    match bin {
        NOMINAL => 0.0,
        ALPHA_S_DOWN | ALPHA_S_UP => SynthSpec::ALPHA_S_SPREAD,
        b if PDF_REPLICAS.contains(&b) => SynthSpec::PDF_SPREAD,
        _ => SynthSpec::QCD_SPREAD,
    }
}

fn fluctuate<R: Rng>(rng: &mut R, spread: f64) -> f64 {
    if spread == 0.0 {
        return 1.0;
    }
    1.0 + rng.sample(Uniform::new(-spread, spread))
}

/// Generates a sample table; identical seeds give identical tables.
pub fn generate_sample(spec: &SynthSpec, seed: u64) -> Result<SampleTable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let gen_values: Vec<f64> = (1..=N_WEIGHTS)
        .map(|bin| spec.nominal * fluctuate(&mut rng, spread_for(bin)))
        .collect();
    let gen = WeightVector::new(Stage::Generator, gen_values)?;
    let rec = spec
        .levels
        .iter()
        .map(|level| {
            let values: Vec<f64> = (1..=N_WEIGHTS)
                .map(|bin| {
                    let smear = if bin == NOMINAL { 0.0 } else { spec.smear };
                    gen.bin(bin) * spec.efficiency * fluctuate(&mut rng, smear)
                })
                .collect();
            WeightVector::new(Stage::Reconstructed, values).map(|w| (level.clone(), w))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SampleTable { gen, rec })
}

/// Writes `table` as `<input_dir>/<sample>.tsv`, refusing to overwrite an
/// existing file.
pub fn write_sample(config: &AnalysisConfig, sample: &str, table: &SampleTable) -> Result<PathBuf> {
    let bins: Vec<i64> = (1..=N_WEIGHTS as i64).collect();
    let mut columns = vec![
        Series::new("bin", bins),
        Series::new(
            &config.vector_name(Stage::Generator, ""),
            table.gen.values(),
        ),
    ];
    for (level, w) in &table.rec {
        columns.push(Series::new(
            &config.vector_name(Stage::Reconstructed, level),
            w.values(),
        ));
    }
    let mut df = DataFrame::new(columns)?;

    std::fs::create_dir_all(&config.input_dir)?;
    let path = weights::table_path(config, sample);
    let file = std::fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&path)?;
    CsvWriter::new(file).with_separator(b'\t').finish(&mut df)?;
    tracing::info!(path = %path.display(), levels = table.rec.len(), "wrote synthetic sample");
    Ok(path)
}
