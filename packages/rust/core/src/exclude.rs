//! Exclusion list handling.
//!
//! The list is one literal identifier per line. Excluded names are removed
//! as fields and methods at every nesting depth, and as top-level classes.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, instrument};

use mapfold_shared::{ClassNode, MapfoldError, Result};

/// What [`apply_exclusions`] removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionStats {
    pub classes: usize,
    pub fields: usize,
    pub methods: usize,
}

impl ExclusionStats {
    pub fn total(&self) -> usize {
        self.classes + self.fields + self.methods
    }
}

/// Read an exclusion list from disk.
pub fn load_exclusions(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| MapfoldError::io(path, e))?;
    Ok(parse_exclusions(&content))
}

/// One identifier per line; surrounding whitespace and blank lines ignored.
pub fn parse_exclusions(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Strip excluded members everywhere and drop excluded top-level classes.
#[instrument(skip_all, fields(excluded = excluded.len()))]
pub fn apply_exclusions(
    classes: &mut BTreeMap<String, ClassNode>,
    excluded: &HashSet<String>,
) -> ExclusionStats {
    let mut stats = ExclusionStats::default();
    if excluded.is_empty() {
        return stats;
    }

    classes.retain(|name, _| {
        let keep = !excluded.contains(name);
        if !keep {
            stats.classes += 1;
        }
        keep
    });
    for class in classes.values_mut() {
        strip_members(class, excluded, &mut stats);
    }

    debug!(?stats, "applied exclusions");
    stats
}

fn strip_members(class: &mut ClassNode, excluded: &HashSet<String>, stats: &mut ExclusionStats) {
    let before = class.fields.len();
    class.fields.retain(|name, _| !excluded.contains(name));
    stats.fields += before - class.fields.len();

    let before = class.methods.len();
    class.methods.retain(|key, _| !excluded.contains(&key.name));
    stats.methods += before - class.methods.len();

    for nested in class.nested.values_mut() {
        strip_members(nested, excluded, stats);
    }
}
