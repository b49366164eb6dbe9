//! Runtime configuration

use crate::interpreter::DEFAULT_MAX_CALL_DEPTH;
use crate::stdlib::OutputWriter;
use std::fmt;

/// Settings applied when a `Runtime` is constructed
///
/// # Examples
///
/// ```
/// use ember_runtime::api::{Runtime, RuntimeConfig};
///
/// let config = RuntimeConfig::new().with_max_call_depth(64);
/// let runtime = Runtime::with_config(config);
/// assert_eq!(runtime.max_call_depth(), 64);
/// ```
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Bound on nested user-function calls
    pub max_call_depth: usize,
    /// Where `print` writes; process stdout when `None`
    pub output: Option<OutputWriter>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_output(mut self, output: OutputWriter) -> Self {
        self.output = Some(output);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            output: None,
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("max_call_depth", &self.max_call_depth)
            .field("output", &self.output.as_ref().map(|_| "<writer>"))
            .finish()
    }
}
