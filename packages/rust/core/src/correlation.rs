//! Auxiliary-namespace correlation table.
//!
//! Reads a tiny v2 style table whose header names its namespace columns:
//! ```text
//! tiny	2	0	official	intermediary	glue	server	client
//! c	a	net/minecraft/class_1	...
//! 	f	I	b	field_2	...
//! 	m	()V	c	method_3	...
//! ```
//! Classes are keyed by their name in the primary namespace, members by
//! their class's primary name and their own primary name.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, instrument, warn};

use mapfold_shared::{Correlator, MapfoldError, Result};

/// Namespace columns start after `tiny`, major and minor version.
const NAMESPACE_OFFSET: usize = 3;

/// Parsed correlation table.
#[derive(Debug, Clone, Default)]
pub struct CorrelationTable {
    namespaces: Vec<String>,
    classes: HashMap<String, Vec<String>>,
    members: HashMap<String, HashMap<String, Vec<String>>>,
}

impl CorrelationTable {
    /// Read and parse a table from disk.
    pub fn load(path: &Path, primary: &str, auxiliary: &[String]) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MapfoldError::io(path, e))?;
        Self::parse(&content, primary, auxiliary)
    }

    /// Parse table text. `auxiliary` fixes the namespaces looked up and
    /// their order; the table's own column order does not matter.
    #[instrument(skip_all, fields(primary = %primary))]
    pub fn parse(content: &str, primary: &str, auxiliary: &[String]) -> Result<Self> {
        let mut lines = content.lines().enumerate();
        let (_, header) = lines
            .next()
            .ok_or_else(|| MapfoldError::correlation("table is empty"))?;
        let header: Vec<&str> = header.split('\t').collect();

        let column = |ns: &str| {
            header
                .iter()
                .skip(NAMESPACE_OFFSET)
                .position(|h| *h == ns)
        };
        let primary_col = column(primary).ok_or_else(|| {
            MapfoldError::correlation(format!("header has no '{primary}' column"))
        })?;
        let aux_cols: Vec<Option<usize>> = auxiliary
            .iter()
            .map(|ns| {
                let col = column(ns);
                if col.is_none() {
                    warn!(
                        namespace = %ns,
                        "namespace missing from correlation table, its names stay empty"
                    );
                }
                col
            })
            .collect();

        let mut table = Self {
            namespaces: auxiliary.to_vec(),
            ..Self::default()
        };
        let mut current_class: Option<String> = None;

        for (i, line) in lines {
            let is_top_level = !line.starts_with('\t');
            let parts: Vec<&str> = line.trim_start_matches('\t').split('\t').collect();

            // Class rows carry names from column 1, member rows from column 2
            // (after the descriptor).
            let first_name = match (is_top_level, parts[0]) {
                (true, "c") => 1,
                (false, "f" | "m") => 2,
                _ => continue,
            };
            let name_at = |col: usize| parts.get(first_name + col).copied().unwrap_or("");

            let key = name_at(primary_col);
            if key.is_empty() {
                return Err(MapfoldError::correlation(format!(
                    "row {} has no '{primary}' name",
                    i + 1
                )));
            }
            let names: Vec<String> = aux_cols
                .iter()
                .map(|col| col.map(name_at).unwrap_or("").to_string())
                .collect();

            if first_name == 1 {
                table.classes.insert(key.to_string(), names);
                current_class = Some(key.to_string());
            } else if let Some(class) = &current_class {
                table
                    .members
                    .entry(class.clone())
                    .or_default()
                    .insert(key.to_string(), names);
            }
        }

        debug!(
            classes = table.classes.len(),
            members = table.member_count(),
            "loaded correlation table"
        );
        Ok(table)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.values().map(HashMap::len).sum()
    }
}

impl Correlator for CorrelationTable {
    fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    fn class_names(&self, class: &str) -> Option<&[String]> {
        self.classes.get(class).map(Vec::as_slice)
    }

    fn member_names(&self, class: &str, member: &str) -> Option<&[String]> {
        self.members
            .get(class)
            .and_then(|members| members.get(member))
            .map(Vec::as_slice)
    }
}
