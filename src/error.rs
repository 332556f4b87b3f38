use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures outside the search itself: loading configuration, reading and parsing game input.
///
/// The search never fails; an abort is reported as [`crate::search::SolveOutcome::Aborted`].
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {what} `{input}`: {reason}")]
    Parse {
        what: &'static str,
        input: String,
        reason: String,
    },
}

impl SolverError {
    pub(crate) fn parse(what: &'static str, input: impl Into<String>, reason: impl Into<String>) -> Self {
        SolverError::Parse {
            what,
            input: input.into(),
            reason: reason.into(),
        }
    }
}
