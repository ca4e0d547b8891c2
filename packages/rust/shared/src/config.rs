//! Application configuration for mapfold.
//!
//! User config lives at `~/.mapfold/mapfold.toml` unless `--config` points
//! elsewhere. Every key has a default, so a missing file is not an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MapfoldError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mapfold.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mapfold";

// ---------------------------------------------------------------------------
// Config structs (matching mapfold.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input discovery settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Namespace columns of the correlation table and output header.
    #[serde(default)]
    pub correlation: CorrelationConfig,
}

/// `[input]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extension (without the dot) of mapping tree files.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Sort directory entries by file name before folding.
    ///
    /// Turning this off folds in raw directory order, which differs between
    /// platforms and changes which file wins a merge conflict.
    #[serde(default = "default_true")]
    pub sort_paths: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            sort_paths: true,
        }
    }
}

fn default_extension() -> String {
    "mapping".into()
}
fn default_true() -> bool {
    true
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the file written inside the output directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Header name of the namespace holding the target names.
    #[serde(default = "default_target_namespace")]
    pub target_namespace: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            target_namespace: default_target_namespace(),
        }
    }
}

fn default_file_name() -> String {
    "mappings.tiny".into()
}
fn default_target_namespace() -> String {
    "named".into()
}

/// `[correlation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Namespace the source names of mapping files belong to.
    #[serde(default = "default_primary_namespace")]
    pub primary_namespace: String,

    /// Auxiliary namespaces, in output column order.
    #[serde(default = "default_auxiliary_namespaces")]
    pub auxiliary_namespaces: Vec<String>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            primary_namespace: default_primary_namespace(),
            auxiliary_namespaces: default_auxiliary_namespaces(),
        }
    }
}

fn default_primary_namespace() -> String {
    "intermediary".into()
}
fn default_auxiliary_namespaces() -> Vec<String> {
    vec!["glue".into(), "server".into(), "client".into()]
}

impl AppConfig {
    /// Reject configurations that would produce an unreadable output header.
    pub fn validate(&self) -> Result<()> {
        if self.input.extension.is_empty() || self.input.extension.starts_with('.') {
            return Err(MapfoldError::config(format!(
                "input.extension must be a bare extension, got '{}'",
                self.input.extension
            )));
        }
        if self.output.file_name.is_empty() {
            return Err(MapfoldError::config("output.file_name must not be empty"));
        }

        let mut seen = vec![
            self.correlation.primary_namespace.as_str(),
            self.output.target_namespace.as_str(),
        ];
        for ns in &self.correlation.auxiliary_namespaces {
            if ns.is_empty() || ns.contains(char::is_whitespace) {
                return Err(MapfoldError::config(format!(
                    "invalid auxiliary namespace name '{ns}'"
                )));
            }
            if seen.contains(&ns.as_str()) {
                return Err(MapfoldError::config(format!(
                    "namespace '{ns}' is listed more than once"
                )));
            }
            seen.push(ns);
        }
        if seen[0] == seen[1] {
            return Err(MapfoldError::config(
                "primary and target namespaces must differ",
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mapfold/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MapfoldError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mapfold/mapfold.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MapfoldError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        MapfoldError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    tracing::debug!(?path, "loaded config file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("mappings.tiny"));
        assert!(toml_str.contains("intermediary"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.input.extension, "mapping");
        assert!(config.input.sort_paths);
        assert_eq!(config.output.target_namespace, "named");
        assert_eq!(
            config.correlation.auxiliary_namespaces,
            vec!["glue", "server", "client"]
        );
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml_str = r#"
[input]
sort_paths = false

[correlation]
auxiliary_namespaces = ["server", "client"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(!config.input.sort_paths);
        assert_eq!(config.input.extension, "mapping");
        assert_eq!(config.correlation.primary_namespace, "intermediary");
        assert_eq!(config.correlation.auxiliary_namespaces.len(), 2);
    }

    #[test]
    fn validate_rejects_duplicate_namespaces() {
        let mut config = AppConfig::default();
        config.correlation.auxiliary_namespaces = vec!["glue".into(), "named".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'named'"));
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = AppConfig::default();
        config.input.extension = ".mapping".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("mapfold-no-such-config.toml");
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, MapfoldError::Io { .. }));
    }
}
