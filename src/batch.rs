//! Sequential processing of (sample, label, level) jobs.

use std::io::Write;
use std::path::PathBuf;

use indicatif::ProgressIterator;
use serde::Serialize;

use crate::config::{AnalysisConfig, Job};
use crate::error::Result;
use crate::report::{format_report, pdf_histogram, render_pdf_plot};
use crate::uncertainty::{PdfRatioDistribution, UncertaintyReport};
use crate::weights;

/// Uncertainties computed for one job.
#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    #[serde(flatten)]
    pub job: Job,
    #[serde(flatten)]
    pub uncertainties: UncertaintyReport,
    pub figures: Vec<PathBuf>,
    /// Why the figures could not be written, if they could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<JobReport>,
    /// Jobs that failed, with the reason.
    pub skipped: Vec<(Job, String)>,
}

/// Loads the weights of `job` and computes its uncertainties.
pub fn analyse_job(
    config: &AnalysisConfig,
    job: &Job,
) -> Result<(UncertaintyReport, PdfRatioDistribution)> {
    let (gen, rec) = weights::load(config, &job.sample, &job.level)?;
    let (uncertainties, distribution) = UncertaintyReport::compute(&gen, &rec)?;
    let hist = pdf_histogram(&distribution);
    if hist.underflow() + hist.overflow() > 0.0 {
        tracing::warn!(
            sample = %job.sample,
            level = %job.level,
            underflow = hist.underflow(),
            overflow = hist.overflow(),
            "PDF ratios outside the plotted range"
        );
    }
    Ok((uncertainties, distribution))
}

/// Plots `distribution`; a failure is logged and handed back instead of
/// failing the job.
fn plot_job(
    config: &AnalysisConfig,
    job: &Job,
    distribution: &PdfRatioDistribution,
) -> (Vec<PathBuf>, Option<String>) {
    match render_pdf_plot(config, job, distribution) {
        Ok(figures) => (figures, None),
        Err(e) => {
            tracing::error!(
                sample = %job.sample,
                level = %job.level,
                error = %e,
                "could not save figures"
            );
            (Vec::new(), Some(e.to_string()))
        }
    }
}

/// Loads, computes and plots a single job.
pub fn process_job(config: &AnalysisConfig, job: &Job) -> Result<JobReport> {
    let (uncertainties, distribution) = analyse_job(config, job)?;
    let (figures, plot_error) = plot_job(config, job, &distribution);
    Ok(JobReport {
        job: job.clone(),
        uncertainties,
        figures,
        plot_error,
    })
}

/// Runs every job in order, writing each text report to `out` before its
/// figures are drawn. A job whose weights cannot be loaded or computed is
/// logged and skipped; only a failure to write to `out` stops the batch.
pub fn run_batch<W: Write>(
    config: &AnalysisConfig,
    jobs: &[Job],
    out: &mut W,
) -> std::io::Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    for job in jobs.iter().progress() {
        match analyse_job(config, job) {
            Ok((uncertainties, distribution)) => {
                write!(
                    out,
                    "{}",
                    format_report(&job.sample, &job.level, &uncertainties)
                )?;
                let (figures, plot_error) = plot_job(config, job, &distribution);
                outcome.reports.push(JobReport {
                    job: job.clone(),
                    uncertainties,
                    figures,
                    plot_error,
                });
            }
            Err(e) => {
                tracing::error!(
                    sample = %job.sample,
                    level = %job.level,
                    error = %e,
                    "skipping job"
                );
                outcome.skipped.push((job.clone(), e.to_string()));
            }
        }
    }
    Ok(outcome)
}
