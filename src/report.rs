//! Text summaries and PDF ratio plots.

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::config::{AnalysisConfig, Job};
use crate::error::{AcceptanceError, Result};
use crate::histogram::Histogram1D;
use crate::uncertainty::{PdfRatioDistribution, UncertaintyReport};

pub const PLOT_BINS: usize = 100;
pub const PLOT_RANGE: (f64, f64) = (0.965, 1.035);
const PLOT_SIZE: (u32, u32) = (800, 600);
const FILL: RGBColor = RGBColor(204, 0, 0);

/// Fixed-format summary block for one (sample, level).
pub fn format_report(sample: &str, level: &str, report: &UncertaintyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n {} {} acceptance uncertainties\n", sample, level));
    out.push_str("-----------------------------------------\n");
    out.push_str(&format!(
        " nominal acceptance * eff      {:4.2}%\n",
        report.nominal_acceptance
    ));
    out.push_str(&format!(
        " QCD         mu=0.5 / mu=2.0   {:4.2}% / {:4.2}%\n",
        report.qcd_mu_half, report.qcd_mu_two
    ));
    out.push_str(&format!(
        " alpha_s     265000 / 266000   {:4.2}% / {:4.2}%\n",
        report.alpha_s_down, report.alpha_s_up
    ));
    out.push_str(&format!(" PDF                           {:4.2}%\n", report.pdf));
    out.push_str(&format!(
        " PDF+alpha_s                   {:4.2}%\n",
        report.pdf_alpha_s
    ));
    out.push('\n');
    out
}

/// Histogram of the PDF ratio distribution in the plotting binning.
pub fn pdf_histogram(distribution: &PdfRatioDistribution) -> Histogram1D {
    Histogram1D::from_values(PLOT_BINS, PLOT_RANGE.0, PLOT_RANGE.1, distribution.values())
}

/// Output files of the PDF plot for `job`, bitmap first.
pub fn figure_paths(config: &AnalysisConfig, job: &Job) -> Vec<PathBuf> {
    ["png", "svg"]
        .iter()
        .map(|ext| {
            config
                .figures_dir
                .join(format!("pdfacceptance_{}_{}.{}", job.sample, job.level, ext))
        })
        .collect()
}

fn draw_pdf_plot<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    hist: &Histogram1D,
    caption: &str,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (lo, hi) = hist.range();
    let y_max = (hist.max_count() * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("(N_rec^PDF / N_gen^PDF) / (N_rec^nominal / N_gen^nominal)")
        .y_desc("entries / bin")
        .draw()?;

    let edges = hist.bin_edges();
    chart.draw_series(hist.counts().iter().enumerate().filter(|(_, c)| **c > 0.0).map(
        |(i, &c)| Rectangle::new([(edges[i], 0.0), (edges[i + 1], c)], FILL.filled()),
    ))?;

    let (width, _) = root.dim_in_pixel();
    let style = TextStyle::from(("sans-serif", 24).into_font())
        .pos(Pos::new(HPos::Right, VPos::Top));
    root.draw(&Text::new(caption.to_string(), (width as i32 - 25, 5), style))?;
    root.present()?;
    Ok(())
}

/// Writes the PNG and SVG plots of `distribution` when figure saving is
/// enabled. Nothing is written otherwise.
pub fn render_pdf_plot(
    config: &AnalysisConfig,
    job: &Job,
    distribution: &PdfRatioDistribution,
) -> Result<Vec<PathBuf>> {
    if !config.save_figures {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(&config.figures_dir)?;
    let hist = pdf_histogram(distribution);
    let caption = format!("{} {}", job.label, job.level).trim().to_string();
    let paths = figure_paths(config, job);
    for path in &paths {
        render_to(path, &hist, &caption)
            .map_err(|e| AcceptanceError::Plot(e.to_string()))?;
        tracing::info!(path = %path.display(), "saved figure");
    }
    Ok(paths)
}

fn render_to(
    path: &Path,
    hist: &Histogram1D,
    caption: &str,
) -> std::result::Result<(), Box<dyn Error>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("svg") => draw_pdf_plot(
            SVGBackend::new(path, PLOT_SIZE).into_drawing_area(),
            hist,
            caption,
        ),
        _ => draw_pdf_plot(
            BitMapBackend::new(path, PLOT_SIZE).into_drawing_area(),
            hist,
            caption,
        ),
    }
}
