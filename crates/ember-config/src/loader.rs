//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::settings::{validate_call_depth, Settings};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "ember.toml";

/// Directory under the home directory holding `config.toml`
pub const GLOBAL_CONFIG_DIR: &str = ".ember";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.ember/config.toml) - lowest priority
/// 2. Project config (ember.toml) - overrides global
/// 3. Environment variables (EMBER_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub settings: Settings,

    /// Directory where ember.toml was found
    pub project_root: Option<PathBuf>,

    /// Files that contributed, lowest precedence first
    pub sources: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use `path` instead of ~/.ember/config.toml
    pub fn with_global_config(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ember.toml and merges it over the
    /// global config, if either exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let mut config = self.load_global_config()?;

        if let Some(project_root) = find_project_root(start_dir) {
            let path = project_root.join(PROJECT_CONFIG_FILE);
            config.settings.merge(&Settings::load_from_file(&path)?);
            config.sources.push(path);
            config.project_root = Some(project_root);
        }

        apply_env_overrides(&mut config.settings)?;
        Ok(config)
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let mut config = self.load_global_config()?;

        config.settings.merge(&Settings::load_from_file(config_path)?);
        config.sources.push(config_path.to_path_buf());
        config.project_root = config_path.parent().map(|p| p.to_path_buf());

        apply_env_overrides(&mut config.settings)?;
        Ok(config)
    }

    /// Load global configuration; a missing file yields defaults
    fn load_global_config(&mut self) -> ConfigResult<Config> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                // without a home directory there is simply no global layer
                let Ok(path) = Self::global_config_path() else {
                    return Ok(Config::default());
                };
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(Config::default());
        }

        Ok(Config {
            settings: Settings::load_from_file(&path)?,
            project_root: None,
            sources: vec![path],
        })
    }

    /// Get the global config file path (~/.ember/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(GLOBAL_CONFIG_DIR).join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk up from `start_dir` to the first directory holding ember.toml
fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Apply environment variable overrides
///
/// - `EMBER_VERBOSE`: `true`, `1` or `yes` enables verbose logging
/// - `EMBER_MAX_CALL_DEPTH`: positive integer
fn apply_env_overrides(settings: &mut Settings) -> ConfigResult<()> {
    if let Ok(verbose) = env::var("EMBER_VERBOSE") {
        let verbose = matches!(verbose.to_lowercase().as_str(), "true" | "1" | "yes");
        settings.runtime.get_or_insert_with(Default::default).verbose = Some(verbose);
    }

    if let Ok(depth) = env::var("EMBER_MAX_CALL_DEPTH") {
        let depth = depth
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "EMBER_MAX_CALL_DEPTH".to_string(),
                reason: format!("expected a positive integer, got '{}'", depth),
            })?;
        validate_call_depth(depth)?;
        settings.runtime.get_or_insert_with(Default::default).max_call_depth = Some(depth);
    }

    Ok(())
}

impl Config {
    pub fn max_call_depth(&self) -> Option<usize> {
        self.settings.runtime.as_ref().and_then(|r| r.max_call_depth)
    }

    pub fn verbose(&self) -> bool {
        self.settings
            .runtime
            .as_ref()
            .and_then(|r| r.verbose)
            .unwrap_or(false)
    }

    /// Prelude files in evaluation order
    pub fn prelude_files(&self) -> &[PathBuf] {
        self.settings
            .prelude
            .as_ref()
            .map(|p| p.files.as_slice())
            .unwrap_or(&[])
    }

    pub fn prelude_source(&self) -> Option<&str> {
        self.settings.prelude.as_ref().and_then(|p| p.source.as_deref())
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if an ember.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Override the call depth (CLI flag layer)
    pub fn set_max_call_depth(&mut self, depth: usize) -> ConfigResult<()> {
        validate_call_depth(depth)?;
        self.settings
            .runtime
            .get_or_insert_with(Default::default)
            .max_call_depth = Some(depth);
        Ok(())
    }

    /// Override verbosity (CLI flag layer)
    pub fn set_verbose(&mut self, verbose: bool) {
        self.settings.runtime.get_or_insert_with(Default::default).verbose = Some(verbose);
    }
}
