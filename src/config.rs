//! Solver configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```json
//! { "use_bounds_correction": true, "time_limit_secs": 30.0 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SolverError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Remove double-counted transposition mass from ancestor disproof numbers.
    pub use_bounds_correction: bool,
    /// Consult the evaluator's unique-reply oracle after a move is refuted.
    pub use_unique_probes: bool,
    /// Wall-clock limit; non-positive means unlimited.
    pub time_limit_secs: f64,
    /// Minimum delay between two progress writes for the same root child.
    pub progress_interval_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            use_bounds_correction: false,
            use_unique_probes: false,
            time_limit_secs: 0.0,
            progress_interval_ms: 1000,
        }
    }
}

impl SolverConfig {
    pub fn with_bounds_correction(mut self, enabled: bool) -> Self {
        self.use_bounds_correction = enabled;
        self
    }

    pub fn with_unique_probes(mut self, enabled: bool) -> Self {
        self.use_unique_probes = enabled;
        self
    }

    pub fn with_time_limit(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SolverError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
