//! Folding a directory of mapping files into one set of classes.
//!
//! Files are parsed in traversal order. When two files describe the same
//! top-level class, the file read later is the left side of the merge, so
//! its names win conflicts. Traversal order is therefore part of the
//! output: with `input.sort_paths` (the default) it is file-name order at
//! every directory level, otherwise whatever the platform returns.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use mapfold_shared::{ClassNode, Correlator, InputConfig, MapfoldError, Result};
use mapfold_tree::{merge_deep, parse_str};

use crate::pipeline::ProgressReporter;

/// A file left out of the fold because it could not be parsed.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    /// Human-readable reason, including the line number.
    pub reason: String,
}

/// All classes read from one input directory, keyed by source name.
#[derive(Debug, Default)]
pub struct MappingSet {
    pub classes: BTreeMap<String, ClassNode>,
    pub files_read: usize,
    pub skipped: Vec<SkippedFile>,
}

impl MappingSet {
    /// Fold one parsed root into the set. A root for a class already
    /// present is merged in as the left side.
    pub fn fold(&mut self, root: ClassNode) {
        let key = root.source_name().to_string();
        let merged = match self.classes.remove(&key) {
            Some(existing) => {
                debug!(class = %key, "class seen before, merging");
                merge_deep(&root, &existing)
            }
            None => root,
        };
        self.classes.insert(key, merged);
    }
}

/// Every file under `dir` with the configured extension, in fold order.
pub fn collect_inputs(dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir);
    if input.sort_paths {
        walker = walker.sort_by_file_name();
    }

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            MapfoldError::io(path, std::io::Error::from(e))
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(OsStr::to_str) == Some(input.extension.as_str())
        {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Parse and fold every mapping file under `dir`.
///
/// Malformed files are logged and skipped; I/O errors abort.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn aggregate(
    dir: &Path,
    input: &InputConfig,
    correlator: &dyn Correlator,
    progress: &dyn ProgressReporter,
) -> Result<MappingSet> {
    let paths = collect_inputs(dir, input)?;
    info!(files = paths.len(), "collected mapping files");

    let mut set = MappingSet::default();
    for (i, path) in paths.iter().enumerate() {
        let bytes = std::fs::read(path).map_err(|e| MapfoldError::io(path, e))?;

        match decode(path, bytes).and_then(|content| parse_str(&content, path, correlator)) {
            Ok(root) => {
                set.fold(root);
                set.files_read += 1;
                progress.file_parsed(path, i + 1, paths.len());
            }
            Err(e) if e.is_per_file() => {
                warn!(path = %path.display(), error = %e, "skipping malformed mapping file");
                progress.file_skipped(path, &e.to_string());
                set.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        classes = set.classes.len(),
        files_read = set.files_read,
        files_skipped = set.skipped.len(),
        "aggregated mapping files"
    );
    Ok(set)
}

/// Undecodable content only invalidates its own file.
fn decode(path: &Path, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|b| **b == b'\n').count() + 1;
        MapfoldError::malformed(path, line, "content is not valid UTF-8")
    })
}
