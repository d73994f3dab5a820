//! Configuration file discovery and loading for the CLI.
//!
//! The `render` subcommand looks for a TOML configuration in a fixed order:
//! an explicit `--config` path, `strata/config.toml` under the working
//! directory, then the platform configuration directory. When nothing is
//! found the defaults apply.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use strata::{StrataError, config::AppConfig};

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but is not a valid configuration.
    #[error("failed to parse configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// An explicitly requested file does not exist.
    #[error("missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for StrataError {
    fn from(err: ConfigError) -> Self {
        StrataError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            err.to_string(),
        ))
    }
}

/// Finds and loads the configuration to render with.
///
/// An explicit path must exist and parse; failures there are reported rather
/// than falling through to the next location. Without one, the first
/// discovered candidate wins, and no candidate at all means defaults.
///
/// # Errors
///
/// Returns an error when an explicit path is missing, or when the selected
/// file cannot be read or parsed.
pub(crate) fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
) -> Result<AppConfig, StrataError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    for candidate in discovery_candidates() {
        if candidate.exists() {
            info!(path = candidate.display().to_string(); "Loading discovered configuration");
            return load_config_file(&candidate);
        }
        debug!(path = candidate.display().to_string(); "No configuration at candidate path");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Non-explicit search locations, nearest first.
fn discovery_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("strata").join("config.toml")];
    if let Some(proj_dirs) = ProjectDirs::from("com", "strata", "strata") {
        candidates.push(proj_dirs.config_dir().join("config.toml"));
    }
    candidates
}

/// Loads configuration from a TOML file.
///
/// # Errors
///
/// Returns an error when the file does not exist, cannot be read, or does
/// not parse as a configuration.
pub(crate) fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, StrataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_config_file_reads_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\nmargin = 2.5").unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.layout().margin(), 2.5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config_file("does/not/exist.toml").unwrap_err();
        assert!(err.to_string().contains("missing configuration file"));
    }

    #[test]
    fn test_parse_failure_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\nmargin = \"wide\"").unwrap();

        let err = load_config_file(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("failed to parse configuration"));
        assert!(message.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_no_explicit_path_falls_back_to_defaults() {
        // Runs from the crate directory, which has no strata/config.toml
        let config = load_config(None::<&Path>).unwrap();
        assert_eq!(config.layout().label_max_retries(), 6);
    }
}
