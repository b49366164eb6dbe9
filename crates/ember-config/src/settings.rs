//! Configuration file schema
//!
//! The same schema is used for the global `~/.ember/config.toml` and the
//! project `ember.toml`:
//!
//! ```toml
//! [runtime]
//! max_call_depth = 512
//! verbose = true
//!
//! [prelude]
//! files = ["lib/helpers.em"]
//! source = "let pi = 3.14159;"
//! ```

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted `runtime.max_call_depth`
pub const MAX_CALL_DEPTH_LIMIT: usize = 10_000;

/// Contents of one configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prelude: Option<PreludeSettings>,
}

/// Interpreter limits and logging
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSettings {
    /// Bound on nested user-function calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,

    /// Log every gateway call at info level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Scripts evaluated quietly when an interpreter is constructed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PreludeSettings {
    /// Script files, relative to the directory holding the config file
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,

    /// Inline source, evaluated after the files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Settings {
    /// Load settings from a file, resolving prelude paths against its directory
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let mut settings: Self =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error: e,
            })?;

        settings.validate()?;
        if let Some(base) = path.parent() {
            settings.resolve_paths(base);
        }
        Ok(settings)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(depth) = self.runtime.as_ref().and_then(|r| r.max_call_depth) {
            validate_call_depth(depth)?;
        }
        Ok(())
    }

    /// Make relative prelude paths absolute under `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(prelude) = self.prelude.as_mut() {
            for file in prelude.files.iter_mut() {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }

    /// Merge another settings file into this one
    ///
    /// Scalar values from `other` win when present; prelude files accumulate
    /// so a project prelude runs after the global one.
    pub fn merge(&mut self, other: &Settings) {
        if let Some(other_runtime) = &other.runtime {
            let runtime = self.runtime.get_or_insert_with(Default::default);
            if other_runtime.max_call_depth.is_some() {
                runtime.max_call_depth = other_runtime.max_call_depth;
            }
            if other_runtime.verbose.is_some() {
                runtime.verbose = other_runtime.verbose;
            }
        }

        if let Some(other_prelude) = &other.prelude {
            let prelude = self.prelude.get_or_insert_with(Default::default);
            prelude.files.extend(other_prelude.files.iter().cloned());
            if other_prelude.source.is_some() {
                prelude.source = other_prelude.source.clone();
            }
        }
    }
}

pub(crate) fn validate_call_depth(depth: usize) -> ConfigResult<()> {
    if depth == 0 || depth > MAX_CALL_DEPTH_LIMIT {
        return Err(ConfigError::InvalidValue {
            field: "runtime.max_call_depth".to_string(),
            reason: format!("must be between 1 and {}, got {}", MAX_CALL_DEPTH_LIMIT, depth),
        });
    }
    Ok(())
}
