//! Directory-level orchestration for mapfold.
//!
//! Walks an input directory of mapping files, folds them into one set of
//! class trees, optionally correlates auxiliary namespaces and strips
//! excluded identifiers, then writes a single canonical file (see [`pipeline::run`]).

pub mod aggregate;
pub mod correlation;
pub mod exclude;
pub mod pipeline;
