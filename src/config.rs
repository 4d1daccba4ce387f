//! Build configuration shared by the parser and the AST builder.

use serde::{Deserialize, Serialize};

/// Default bound on expression nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 512;

/// Highest nesting limit honoured, whatever the configuration asks for. The parse
/// stack is sized from the limit, so it needs a ceiling.
pub const NESTING_DEPTH_CEILING: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Deepest expression nesting accepted before the build fails with
    /// `NestingTooDeep`. Values above [`NESTING_DEPTH_CEILING`] are clamped.
    pub max_nesting_depth: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl BuildConfig {
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// The nesting limit actually enforced.
    pub fn nesting_limit(&self) -> usize {
        self.max_nesting_depth.min(NESTING_DEPTH_CEILING)
    }

    /// Reads a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
