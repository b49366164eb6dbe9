//! CLI configuration via environment variables
//!
//! Interpreter settings come from `ember.toml`; these only shape the
//! terminal experience.

use std::env;
use std::path::PathBuf;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Custom history file path (EMBER_HISTORY_FILE=/path/to/file)
    pub history_file: Option<PathBuf>,
    /// Disable history by default (EMBER_NO_HISTORY=1)
    pub no_history: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            history_file: env::var("EMBER_HISTORY_FILE").ok().map(PathBuf::from),
            no_history: env::var("EMBER_NO_HISTORY").is_ok(),
        }
    }

    /// Get the history file path
    ///
    /// Returns:
    /// 1. EMBER_HISTORY_FILE if set
    /// 2. ~/.ember/history if home directory exists
    /// 3. None otherwise
    pub fn history_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.history_file {
            return Some(path.clone());
        }
        dirs::home_dir().map(|home| home.join(ember_config::GLOBAL_CONFIG_DIR).join("history"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_history_file_wins() {
        let config = Config {
            history_file: Some(PathBuf::from("/tmp/ember-history")),
            no_history: false,
        };
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/ember-history")));
    }

    #[test]
    fn test_default_history_under_home() {
        let config = Config {
            history_file: None,
            no_history: false,
        };
        if let Some(path) = config.history_path() {
            assert!(path.ends_with(".ember/history"));
        }
    }
}
