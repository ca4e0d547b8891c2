//! Mapping tree parsing, merging, and canonical rendering for mapfold.
//!
//! - [`line`] classifies raw lines by indentation and record kind
//! - [`builder`] builds a [`ClassNode`](mapfold_shared::ClassNode) from a mapping file
//! - [`merge`] reconciles two trees of the same class
//! - [`serialize`] renders trees to the canonical tab-separated format
//! - [`canonical`] reads that format back

pub mod builder;
pub mod canonical;
pub mod line;
pub mod merge;
pub mod serialize;

pub use builder::parse_str;
pub use canonical::read_canonical;
pub use merge::{merge, merge_deep};
pub use serialize::{Layout, render, write_class};

/// A structural problem at a specific line of some input.
///
/// Carries no path; [`parse_str`] attaches the file when converting into
/// [`MapfoldError::Malformed`](mapfold_shared::MapfoldError::Malformed).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
