//! Shared types, error model, and configuration for mapfold.
//!
//! This crate is the foundation depended on by all other mapfold crates.
//! It provides:
//! - [`MapfoldError`] — the unified error type
//! - The mapping tree model ([`ClassNode`], [`FieldEntry`], [`MethodEntry`], [`ArgEntry`])
//! - The [`Correlator`] seam for auxiliary-namespace names
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod correlator;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CorrelationConfig, InputConfig, OutputConfig, config_dir, config_file_path,
    load_config, load_config_from,
};
pub use correlator::{Correlator, NoCorrelation};
pub use error::{MapfoldError, Result};
pub use types::{
    ArgEntry, CONSTRUCTOR_NAME, ClassNode, FieldEntry, MethodEntry, MethodKey, NESTED_SEPARATOR,
    is_synthetic_method_name,
};
