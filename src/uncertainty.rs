//! Acceptance uncertainties from QCD scale, PDF replica and alpha_s weights.
//!
//! Every variation enters through the double ratio
//!
//! ```text
//!   (N_rec[i] / N_rec[nominal]) / (N_gen[i] / N_gen[nominal])
//! ```
//!
//! which is the acceptance under variation `i` relative to the nominal
//! acceptance. A zero denominator anywhere along the way is reported as
//! [`AcceptanceError::NumericDegenerate`] instead of producing NaN.

use serde::Serialize;

use crate::error::{AcceptanceError, Result};
use crate::layout::{
    Variation, ALPHA_S_DOWN, ALPHA_S_UP, NOMINAL, N_PDF_REPLICAS, N_WEIGHTS, PDF_REPLICAS,
    QCD_SCALE_HALF, QCD_SCALE_TWO,
};
use crate::weights::WeightVector;

fn checked(w: &WeightVector, bin: usize) -> Result<f64> {
    let value = w.bin(bin);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AcceptanceError::NumericDegenerate {
            stage: w.stage(),
            bin,
            value,
        })
    }
}

fn nonzero(w: &WeightVector, bin: usize) -> Result<f64> {
    let value = checked(w, bin)?;
    if value == 0.0 {
        return Err(AcceptanceError::NumericDegenerate {
            stage: w.stage(),
            bin,
            value,
        });
    }
    Ok(value)
}

fn double_ratio(gen: &WeightVector, rec: &WeightVector, bin: usize) -> Result<f64> {
    if Variation::of_bin(bin).is_none() {
        return Err(AcceptanceError::OutOfLayout {
            bin,
            max: N_WEIGHTS,
        });
    }
    let gen_nominal = nonzero(gen, NOMINAL)?;
    let rec_nominal = nonzero(rec, NOMINAL)?;
    let gen_ratio = nonzero(gen, bin)? / gen_nominal;
    let rec_ratio = checked(rec, bin)? / rec_nominal;
    Ok(rec_ratio / gen_ratio)
}

/// Acceptance ratio for the QCD scale variation stored in `bin`.
pub fn qcd_deviation(gen: &WeightVector, rec: &WeightVector, bin: usize) -> Result<f64> {
    double_ratio(gen, rec, bin)
}

/// Acceptance ratio for the alpha_s variation stored in `bin`.
pub fn alpha_s_deviation(gen: &WeightVector, rec: &WeightVector, bin: usize) -> Result<f64> {
    double_ratio(gen, rec, bin)
}

/// Unsigned deviation of a ratio from unity, in percent.
pub fn deviation_percent(ratio: f64) -> f64 {
    1e2 * (1.0 - ratio).abs()
}

/// PDF uncertainty combined in quadrature with the average alpha_s pair.
pub fn combined_pdf_alpha(pdf: f64, alpha_down: f64, alpha_up: f64) -> f64 {
    f64::sqrt(pdf * pdf + (alpha_down * alpha_down + alpha_up * alpha_up) / 2.0)
}

/// Nominal acceptance times efficiency, in percent.
pub fn nominal_acceptance(gen: &WeightVector, rec: &WeightVector) -> Result<f64> {
    Ok(1e2 * checked(rec, NOMINAL)? / nonzero(gen, NOMINAL)?)
}

/// Acceptance ratios of the PDF replicas, each normalised to the nominal
/// acceptance.
#[derive(Clone, Debug, PartialEq)]
pub struct PdfRatioDistribution {
    ratios: Vec<f64>,
}

impl PdfRatioDistribution {
    pub fn len(&self) -> usize {
        self.ratios.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
    pub fn values(&self) -> &[f64] {
        &self.ratios
    }
    pub fn mean(&self) -> f64 {
        if self.ratios.is_empty() {
            return 0.0;
        }
        self.ratios.iter().sum::<f64>() / self.ratios.len() as f64
    }
    /// Population spread about the distribution's own mean.
    pub fn rms(&self) -> f64 {
        if self.ratios.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let var = self.ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
            / self.ratios.len() as f64;
        var.sqrt()
    }
}

/// Builds the distribution of `(rec[i] / gen[i]) / (rec[1] / gen[1])` over
/// the PDF replica bins.
pub fn pdf_distribution(gen: &WeightVector, rec: &WeightVector) -> Result<PdfRatioDistribution> {
    let denominator = nonzero(rec, NOMINAL)? / nonzero(gen, NOMINAL)?;
    let mut ratios = Vec::with_capacity(N_PDF_REPLICAS);
    for bin in PDF_REPLICAS {
        let numerator = checked(rec, bin)? / nonzero(gen, bin)?;
        ratios.push(numerator / denominator);
    }
    Ok(PdfRatioDistribution { ratios })
}

/// Final uncertainties of one (sample, level), all in percent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct UncertaintyReport {
    pub nominal_acceptance: f64,
    pub qcd_mu_half: f64,
    pub qcd_mu_two: f64,
    pub alpha_s_down: f64,
    pub alpha_s_up: f64,
    pub pdf: f64,
    pub pdf_alpha_s: f64,
}

impl UncertaintyReport {
    /// Computes every uncertainty and hands back the PDF distribution for
    /// plotting.
    pub fn compute(
        gen: &WeightVector,
        rec: &WeightVector,
    ) -> Result<(Self, PdfRatioDistribution)> {
        let nominal_acceptance = nominal_acceptance(gen, rec)?;
        let qcd_mu_half = deviation_percent(qcd_deviation(gen, rec, QCD_SCALE_HALF)?);
        let qcd_mu_two = deviation_percent(qcd_deviation(gen, rec, QCD_SCALE_TWO)?);
        let distribution = pdf_distribution(gen, rec)?;
        let pdf = 1e2 * distribution.rms();
        let alpha_s_down = deviation_percent(alpha_s_deviation(gen, rec, ALPHA_S_DOWN)?);
        let alpha_s_up = deviation_percent(alpha_s_deviation(gen, rec, ALPHA_S_UP)?);
        let pdf_alpha_s = combined_pdf_alpha(pdf, alpha_s_down, alpha_s_up);
        tracing::debug!(
            nominal_acceptance,
            qcd_mu_half,
            qcd_mu_two,
            pdf,
            alpha_s_down,
            alpha_s_up,
            pdf_alpha_s,
            "computed uncertainties"
        );
        Ok((
            Self {
                nominal_acceptance,
                qcd_mu_half,
                qcd_mu_two,
                alpha_s_down,
                alpha_s_up,
                pdf,
                pdf_alpha_s,
            },
            distribution,
        ))
    }
}
