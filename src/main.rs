use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};

use acceptance_systematics::{
    batch::{run_batch, BatchOutcome},
    config::{AnalysisConfig, BatchFile, Job},
    layout,
    synth::{generate_sample, write_sample, SynthSpec},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct Overrides {
    /// Directory holding the <sample>.tsv weight tables
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,
    /// Column prefix of the weight vectors
    #[arg(short, long, value_name = "PREFIX")]
    prefix: Option<String>,
    /// Save PDF ratio plots
    #[arg(long)]
    save_figures: bool,
    #[arg(long, value_name = "DIR")]
    figures_dir: Option<PathBuf>,
    /// Also write the reports as JSON
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.vector_prefix = prefix.clone();
        }
        if let Some(dir) = &self.figures_dir {
            config.figures_dir = dir.clone();
        }
        config.save_figures |= self.save_figures;
        config
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every job of a JSON batch file
    Run {
        batch: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Process a single sample at one selection level
    Sample {
        sample: String,
        level: String,
        #[arg(short, long, default_value = "")]
        label: String,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Write a synthetic weight table
    Generate {
        output_dir: PathBuf,
        sample: String,
        #[arg(long, value_delimiter = ',', default_value = "wh3l")]
        levels: Vec<String>,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long, default_value_t = 0.02)]
        efficiency: f64,
        #[arg(short, long, value_name = "PREFIX")]
        prefix: Option<String>,
    },
    /// Print the weight bin layout
    Layout,
}

fn finish(
    outcome: &BatchOutcome,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !outcome.skipped.is_empty() {
        tracing::warn!(
            processed = outcome.reports.len(),
            skipped = outcome.skipped.len(),
            "batch finished with skipped jobs"
        );
        for (job, reason) in &outcome.skipped {
            eprintln!("skipped {} {}: {}", job.sample, job.level, reason);
        }
    }
    if let Some(out_path) = output {
        tracing::info!(
            path = %out_path.display(),
            reports = outcome.reports.len(),
            "writing JSON reports"
        );
        std::fs::write(out_path, serde_json::to_string_pretty(&outcome.reports)?)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run { batch, overrides }) => {
            let file = BatchFile::from_path(&batch)?;
            let base = batch.parent().unwrap_or_else(|| Path::new("."));
            let config = overrides.apply(file.config(base));
            tracing::info!(path = %batch.display(), jobs = file.jobs.len(), "loaded batch");
            let outcome = run_batch(&config, &file.jobs, &mut std::io::stdout().lock())?;
            finish(&outcome, overrides.output.as_deref())?;
        }
        Some(Commands::Sample {
            sample,
            level,
            label,
            overrides,
        }) => {
            let config = overrides.apply(AnalysisConfig::default());
            let jobs = [Job::new(&sample, &label, &level)];
            let outcome = run_batch(&config, &jobs, &mut std::io::stdout().lock())?;
            finish(&outcome, overrides.output.as_deref())?;
        }
        Some(Commands::Generate {
            output_dir,
            sample,
            levels,
            seed,
            efficiency,
            prefix,
        }) => {
            let mut config = AnalysisConfig {
                input_dir: output_dir,
                ..AnalysisConfig::default()
            };
            if let Some(prefix) = prefix {
                config.vector_prefix = prefix;
            }
            let spec = SynthSpec {
                efficiency,
                levels,
                ..SynthSpec::default()
            };
            let table = generate_sample(&spec, seed)?;
            let path = write_sample(&config, &sample, &table)?;
            println!("Wrote {:?}", path);
        }
        Some(Commands::Layout) => println!("{}", layout::describe()),
        None => Cli::command().print_help()?,
    }
    Ok(())
}
