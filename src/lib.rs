//! Acceptance uncertainties from QCD scale, PDF and alpha_s event weights.
//!
//! For every (sample, selection level) the generator-level and
//! reconstruction-level sums of the 111 Monte Carlo weight variations are
//! loaded from a tab-separated table, turned into acceptance ratios relative
//! to the nominal weight, and summarised as percentage uncertainties.
//!
//! ```no_run
//! use acceptance_systematics::{config::AnalysisConfig, uncertainty::UncertaintyReport, weights};
//!
//! let config = AnalysisConfig::default();
//! let (gen, rec) = weights::load(&config, "WZZ", "wh3l").unwrap();
//! let (report, _) = UncertaintyReport::compute(&gen, &rec).unwrap();
//! println!("PDF {:.2}%", report.pdf);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod histogram;
pub mod layout;
pub mod report;
pub mod synth;
pub mod uncertainty;
pub mod weights;

pub use error::{AcceptanceError, Result};
