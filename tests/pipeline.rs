//! End-to-end: synthetic tables on disk, loaded and processed as a batch.

use std::path::PathBuf;

use acceptance_systematics::{
    batch::{process_job, run_batch},
    config::{AnalysisConfig, BatchFile, Job},
    layout::{NOMINAL, N_WEIGHTS, PDF_REPLICAS},
    synth::{generate_sample, write_sample, SynthSpec},
    uncertainty::{pdf_distribution, UncertaintyReport},
    weights::{self, Stage, WeightVector},
    AcceptanceError,
};
use approx::assert_relative_eq;

fn config_in(dir: &std::path::Path) -> AnalysisConfig {
    AnalysisConfig {
        input_dir: dir.to_path_buf(),
        figures_dir: dir.join("figures"),
        ..AnalysisConfig::default()
    }
}

fn write_synthetic(config: &AnalysisConfig, sample: &str, levels: &[&str], seed: u64) {
    let spec = SynthSpec {
        levels: levels.iter().map(|l| l.to_string()).collect(),
        ..SynthSpec::default()
    };
    let table = generate_sample(&spec, seed).unwrap();
    write_sample(config, sample, &table).unwrap();
}

fn write_raw(config: &AnalysisConfig, sample: &str, header: &str, rows: &[String]) {
    std::fs::create_dir_all(&config.input_dir).unwrap();
    let mut text = format!("{}\n", header);
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    std::fs::write(weights::table_path(config, sample), text).unwrap();
}

#[test]
fn written_tables_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let spec = SynthSpec {
        levels: vec!["0jet".to_string(), "1jet".to_string()],
        ..SynthSpec::default()
    };
    let table = generate_sample(&spec, 3).unwrap();
    write_sample(&config, "WWTo2L2Nu", &table).unwrap();

    let (gen, rec) = weights::load(&config, "WWTo2L2Nu", "1jet").unwrap();
    assert_eq!(gen.stage(), Stage::Generator);
    assert_eq!(rec.stage(), Stage::Reconstructed);
    for bin in 1..=N_WEIGHTS {
        assert_relative_eq!(gen.bin(bin), table.gen.bin(bin), max_relative = 1e-9);
        assert_relative_eq!(rec.bin(bin), table.rec[1].1.bin(bin), max_relative = 1e-9);
    }
}

#[test]
fn synthetic_sample_gives_small_uncertainties() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_synthetic(&config, "WZZ", &["wh3l"], 11);

    let report = process_job(&config, &Job::new("WZZ", "", "wh3l")).unwrap();
    let u = report.uncertainties;
    assert_relative_eq!(u.nominal_acceptance, 2.0, epsilon = 1e-9);
    // reco smearing is 0.2 % per bin, so every double ratio stays close to one
    for value in [u.qcd_mu_half, u.qcd_mu_two, u.alpha_s_down, u.alpha_s_up, u.pdf] {
        assert!(value >= 0.0 && value < 0.5, "unexpected uncertainty {}", value);
    }
    assert!(u.pdf_alpha_s >= u.pdf);
    assert!(report.figures.is_empty());
}

#[test]
fn batch_skips_failing_jobs_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_synthetic(&config, "HZJ_HToWW_M125", &["wh3l", "wh3l_ossf"], 5);

    let jobs = vec![
        Job::new("HZJ_HToWW_M125", "HZ", "wh3l"),
        Job::new("Missing_M125", "", "wh3l"),
        Job::new("HZJ_HToWW_M125", "HZ", "wh3l_sssf"),
        Job::new("HZJ_HToWW_M125", "HZ", "wh3l_ossf"),
    ];
    let mut out = Vec::new();
    let outcome = run_batch(&config, &jobs, &mut out).unwrap();

    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].0.sample, "Missing_M125");
    assert!(outcome.skipped[0].1.contains("not found"));
    assert!(outcome.skipped[1].1.contains("list_vectors_weights_wh3l_sssf"));

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(" HZJ_HToWW_M125 wh3l acceptance uncertainties"));
    assert!(text.contains(" HZJ_HToWW_M125 wh3l_ossf acceptance uncertainties"));
    assert!(!text.contains("wh3l_sssf"));
    assert_eq!(text.matches("PDF+alpha_s").count(), 2);
}

#[test]
fn missing_vector_is_distinguished_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_synthetic(&config, "WZZ", &["wh3l"], 2);

    let err = weights::load(&config, "WZZ", "0jet").unwrap_err();
    match err {
        AcceptanceError::MissingVector { name, .. } => {
            assert_eq!(name, "list_vectors_weights_0jet")
        }
        other => panic!("unexpected error {:?}", other),
    }
    let err = weights::load(&config, "ZZ", "wh3l").unwrap_err();
    assert!(matches!(err, AcceptanceError::MissingFile { .. }));
}

#[test]
fn short_vector_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let rows: Vec<String> = (1..N_WEIGHTS).map(|b| format!("{}\t1.0\t0.5", b)).collect();
    write_raw(
        &config,
        "WZZ",
        "bin\tlist_vectors_weights_gen\tlist_vectors_weights_wh3l",
        &rows,
    );
    let err = weights::load(&config, "WZZ", "wh3l").unwrap_err();
    assert!(matches!(err, AcceptanceError::MalformedVector { .. }));
}

#[test]
fn zero_nominal_in_table_is_degenerate() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let rows: Vec<String> = (1..=N_WEIGHTS)
        .map(|b| {
            let rec = if b == NOMINAL { 0.0 } else { 0.5 };
            format!("{}\t1.0\t{}", b, rec)
        })
        .collect();
    write_raw(
        &config,
        "WZZ",
        "bin\tlist_vectors_weights_gen\tlist_vectors_weights_wh3l",
        &rows,
    );
    let err = process_job(&config, &Job::new("WZZ", "", "wh3l")).unwrap_err();
    assert!(matches!(
        err,
        AcceptanceError::NumericDegenerate {
            stage: Stage::Reconstructed,
            bin: NOMINAL,
            ..
        }
    ));
}

#[test]
fn custom_prefix_is_honoured() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        vector_prefix: "weights".to_string(),
        ..config_in(dir.path())
    };
    write_synthetic(&config, "WZZ", &["2jet"], 9);
    let (_, rec) = weights::load(&config, "WZZ", "2jet").unwrap();
    assert_eq!(rec.stage(), Stage::Reconstructed);
}

#[test]
fn pdf_distribution_has_one_entry_per_replica() {
    let gen = WeightVector::new(
        Stage::Generator,
        (1..=N_WEIGHTS).map(|b| 100.0 + b as f64).collect(),
    )
    .unwrap();
    let rec = WeightVector::new(
        Stage::Reconstructed,
        (1..=N_WEIGHTS).map(|b| 10.0 + (b % 7) as f64).collect(),
    )
    .unwrap();
    let distribution = pdf_distribution(&gen, &rec).unwrap();
    assert_eq!(distribution.len(), PDF_REPLICAS.count());
    assert!(distribution.rms() >= 0.0);
    let (report, _) = UncertaintyReport::compute(&gen, &rec).unwrap();
    assert!(report.pdf >= 0.0);
    assert!(report.pdf_alpha_s >= report.pdf);
}

#[test]
fn shipped_batch_file_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("batches/wh3l.json");
    let batch = BatchFile::from_path(&path).unwrap();
    assert_eq!(batch.jobs.len(), 21);
    assert!(batch
        .jobs
        .iter()
        .all(|j| j.level.starts_with("wh3l") && j.label.is_empty()));
    let config = batch.config(path.parent().unwrap());
    assert!(!config.save_figures);
    assert!(config.input_dir.ends_with("rootfiles/nominal/Control"));
}

#[test]
fn fractional_sums_after_integer_rows_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let rows: Vec<String> = (1..=N_WEIGHTS)
        .map(|b| {
            if b <= 100 {
                format!("{}\t1000\t20", b)
            } else {
                format!("{}\t1000.5\t20.5", b)
            }
        })
        .collect();
    write_raw(
        &config,
        "WZZ",
        "bin\tlist_vectors_weights_gen\tlist_vectors_weights_wh3l",
        &rows,
    );
    let (gen, rec) = weights::load(&config, "WZZ", "wh3l").unwrap();
    assert_eq!(gen.bin(NOMINAL), 1000.0);
    assert_eq!(gen.bin(N_WEIGHTS), 1000.5);
    assert_eq!(rec.bin(N_WEIGHTS), 20.5);
    assert!(process_job(&config, &Job::new("WZZ", "", "wh3l")).is_ok());
}

#[test]
fn saved_figures_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        save_figures: true,
        ..config_in(dir.path())
    };
    write_synthetic(&config, "WZZ", &["wh3l"], 4);

    let report = process_job(&config, &Job::new("WZZ", "WZZ", "wh3l")).unwrap();
    assert_eq!(report.plot_error, None);
    assert_eq!(
        report.figures,
        vec![
            dir.path().join("figures/pdfacceptance_WZZ_wh3l.png"),
            dir.path().join("figures/pdfacceptance_WZZ_wh3l.svg"),
        ]
    );
    for path in &report.figures {
        let size = std::fs::metadata(path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
}

#[test]
fn unwritable_figures_keep_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let config = AnalysisConfig {
        save_figures: true,
        figures_dir: blocker.join("figures"),
        ..config_in(dir.path())
    };
    write_synthetic(&config, "WZZ", &["wh3l"], 6);

    let mut out = Vec::new();
    let outcome = run_batch(&config, &[Job::new("WZZ", "", "wh3l")], &mut out).unwrap();
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.reports.len(), 1);
    assert!(outcome.reports[0].figures.is_empty());
    assert!(outcome.reports[0].plot_error.is_some());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(" WZZ wh3l acceptance uncertainties"));
    assert!(text.contains("PDF+alpha_s"));
}
