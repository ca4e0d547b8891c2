//! End-to-end run: correlation table → aggregate → exclude → render → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use mapfold_shared::{AppConfig, Correlator, MapfoldError, NoCorrelation, Result};
use mapfold_tree::{Layout, render};

use crate::aggregate::{self, SkippedFile};
use crate::correlation::CorrelationTable;
use crate::exclude::{self, ExclusionStats};

/// Inputs for one [`run`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory walked for mapping files.
    pub input_dir: PathBuf,
    /// Directory the merged file is written into. Created if absent.
    pub output_dir: PathBuf,
    /// Optional auxiliary-namespace table.
    pub correlation_table: Option<PathBuf>,
    /// Optional list of identifiers to drop.
    pub exclude_file: Option<PathBuf>,
    pub app: AppConfig,
}

/// What a [`run`] produced.
#[derive(Debug)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub files_read: usize,
    pub skipped: Vec<SkippedFile>,
    /// Top-level classes that produced a block in the output.
    pub classes_written: usize,
    pub exclusions: ExclusionStats,
    pub elapsed: Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each mapping file is parsed and folded in.
    fn file_parsed(&self, path: &std::path::Path, current: usize, total: usize);
    /// Called when a mapping file is skipped as malformed.
    fn file_skipped(&self, path: &std::path::Path, reason: &str);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_parsed(&self, _path: &std::path::Path, _current: usize, _total: usize) {}
    fn file_skipped(&self, _path: &std::path::Path, _reason: &str) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Run the whole merge.
///
/// 1. Load the correlation table, if any
/// 2. Parse and fold every mapping file
/// 3. Apply the exclusion list, if any
/// 4. Render and write the output file in one write
#[instrument(
    skip_all,
    fields(input = %config.input_dir.display(), output = %config.output_dir.display())
)]
pub fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    let start = Instant::now();

    if !config.input_dir.is_dir() {
        return Err(MapfoldError::MissingInput {
            path: config.input_dir.clone(),
        });
    }
    config.app.validate()?;

    // --- Phase 1: Correlation ---
    let table = match &config.correlation_table {
        Some(path) => {
            progress.phase("Loading correlation table");
            let correlation = &config.app.correlation;
            let table = CorrelationTable::load(
                path,
                &correlation.primary_namespace,
                &correlation.auxiliary_namespaces,
            )?;
            info!(
                classes = table.class_count(),
                members = table.member_count(),
                "correlation table loaded"
            );
            Some(table)
        }
        None => None,
    };
    let correlator: &dyn Correlator = match &table {
        Some(table) => table,
        None => &NoCorrelation,
    };

    // --- Phase 2: Aggregate ---
    progress.phase("Reading mapping files");
    let mut set =
        aggregate::aggregate(&config.input_dir, &config.app.input, correlator, progress)?;

    // --- Phase 3: Exclusions ---
    let exclusions = match &config.exclude_file {
        Some(path) => {
            progress.phase("Applying exclusions");
            let excluded = exclude::load_exclusions(path)?;
            exclude::apply_exclusions(&mut set.classes, &excluded)
        }
        None => ExclusionStats::default(),
    };

    // --- Phase 4: Write ---
    progress.phase("Writing merged mappings");
    let layout = Layout::from_config(&config.app, table.is_some());
    let text = render(set.classes.values(), &layout);
    let classes_written = set.classes.values().filter(|c| !c.is_elided()).count();

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| MapfoldError::io(&config.output_dir, e))?;
    let output_path = config.output_dir.join(&config.app.output.file_name);
    std::fs::write(&output_path, text).map_err(|e| MapfoldError::io(&output_path, e))?;

    let summary = RunSummary {
        output_path,
        files_read: set.files_read,
        skipped: set.skipped,
        classes_written,
        exclusions,
        elapsed: start.elapsed(),
    };

    info!(
        path = %summary.output_path.display(),
        classes = summary.classes_written,
        skipped = summary.skipped.len(),
        excluded = summary.exclusions.total(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run complete"
    );
    progress.done(&summary);

    Ok(summary)
}
