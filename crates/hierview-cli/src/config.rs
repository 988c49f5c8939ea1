//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use hierview::{ViewError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for ViewError {
    fn from(err: ConfigError) -> Self {
        ViewError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (hierview/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - Config file sets an invalid color
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ViewError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("hierview/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "hierview", "hierview") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ViewError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse TOML configuration text and check its colors.
fn parse_config(content: &str) -> Result<AppConfig, ViewError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    // Surface bad colors at startup rather than on first render.
    config.style().palette()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use hierview::{
        layout::{FcoseQuality, RankDir},
        view::ViewMode,
    };

    use super::*;

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r##"
            [view]
            default_mode = "nested"

            [layout.tree]
            spacing_factor = 2.0
            rank_dir = "LR"

            [layout.nested]
            quality = "proof"
            num_iter = 500
            seed = 7

            [style]
            node_fill = "#336699"
            background_color = "white"
            "##,
        )
        .unwrap();

        assert_eq!(config.view().default_mode(), ViewMode::Nested);
        assert_eq!(config.layout().tree().spacing_factor(), 2.0);
        assert_eq!(config.layout().tree().rank_dir(), RankDir::LeftToRight);
        assert_eq!(config.layout().nested().quality(), FcoseQuality::Proof);
        assert_eq!(config.layout().nested().num_iter(), 500);
        assert_eq!(config.layout().nested().seed(), Some(7));

        let palette = config.style().palette().unwrap();
        assert_eq!(palette.node_fill(), "#336699");
        assert_eq!(palette.background(), Some("white"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.view().default_mode(), ViewMode::Tree);
        assert_eq!(config.layout().nested().num_iter(), 2500);
        assert!(config.style().palette().unwrap().background().is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_config("[view\ndefault_mode = ").unwrap_err();
        assert!(matches!(err, ViewError::Config(message) if message.contains("TOML")));
    }

    #[test]
    fn test_invalid_color() {
        let err = parse_config("[style]\nedge_line = \"not-a-color\"").unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[test]
    fn test_unknown_mode() {
        assert!(parse_config("[view]\ndefault_mode = \"graph\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ViewError::Config(message) if message.contains("Missing")));
    }
}
