//! CLI definition, tracing setup, and the single merge command.

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use mapfold_core::pipeline::{self, ProgressReporter, RunConfig, RunSummary};
use mapfold_shared::{AppConfig, MapfoldError, load_config, load_config_from};
use tracing::{debug, info};

const USAGE: &str = "Usage: mapfold <input_dir> <output_dir> [<correlation_table> <exclude_file>]";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mapfold — merge per-class mapping files into one tiny v2 file.
#[derive(Parser)]
#[command(
    name = "mapfold",
    version,
    about = "Merge a directory of per-class mapping files into one canonical tiny v2 file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Directory searched recursively for mapping files.
    pub input: PathBuf,

    /// Directory the merged file is written into.
    pub output: PathBuf,

    /// Correlation table supplying auxiliary namespace names.
    pub correlation: Option<PathBuf>,

    /// File listing identifiers to drop, one per line.
    pub exclude: Option<PathBuf>,

    /// Config file (defaults to ~/.mapfold/mapfold.toml).
    #[arg(long, env = "MAPFOLD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber based on CLI flags. `RUST_LOG` wins.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mapfold=info",
        1 => "mapfold=debug",
        _ => "mapfold=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Run the merge described by the command line.
pub(crate) fn run(cli: Cli) -> Result<()> {
    // The table and the exclusion list come as a pair.
    let (correlation, exclude) = match (cli.correlation, cli.exclude) {
        (Some(_), None) => {
            println!("{USAGE}");
            return Ok(());
        }
        pair => pair,
    };

    if !cli.input.is_dir() {
        println!("Input directory doesn't exist");
        return Ok(());
    }

    let app = resolve_config(cli.config.as_deref())?;
    debug!(?app, "resolved configuration");

    let config = RunConfig {
        input_dir: cli.input,
        output_dir: cli.output,
        correlation_table: correlation,
        exclude_file: exclude,
        app,
    };
    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        correlated = config.correlation_table.is_some(),
        "starting merge"
    );

    let progress = CliProgress::new();
    let summary = match pipeline::run(&config, &progress) {
        Ok(summary) => summary,
        Err(MapfoldError::MissingInput { .. }) => {
            progress.spinner.finish_and_clear();
            println!("Input directory doesn't exist");
            return Ok(());
        }
        Err(e) => {
            progress.spinner.finish_and_clear();
            return Err(e).wrap_err("merge failed, no output was written");
        }
    };

    print_summary(&summary);
    Ok(())
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => load_config()?,
    };
    Ok(config)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Mappings merged.");
    println!("  Files:    {} read, {} skipped", summary.files_read, summary.skipped.len());
    println!("  Classes:  {}", summary.classes_written);
    if summary.exclusions.total() > 0 {
        println!(
            "  Excluded: {} classes, {} fields, {} methods",
            summary.exclusions.classes, summary.exclusions.fields, summary.exclusions.methods
        );
    }
    println!("  Output:   {}", summary.output_path.display());
    println!("  Time:     {:.1}s", summary.elapsed.as_secs_f64());
    for skipped in &summary.skipped {
        println!("  Skipped:  {} ({})", skipped.path.display(), skipped.reason);
    }
    println!();
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_parsed(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {}", path.display()));
    }

    fn file_skipped(&self, path: &Path, reason: &str) {
        self.spinner
            .println(format!("  skipped {}: {reason}", path.display()));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
