use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::outcome::FailureReason;

/// Terminal failures of a single invocation. None of them is retried.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to provision sandbox at {}: {source}", path.display())]
    Provision {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "failed to place artifact {} at {}: {source}",
        source_path.display(),
        destination.display()
    )]
    Artifact {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("toolchain `{program}` is missing or not functional: {detail}")]
    ToolchainMissing { program: String, detail: String },

    #[error("runner could not execute toolchain `{program}`: {detail}")]
    ToolchainRun { program: String, detail: String },
}

impl RunnerError {
    pub fn reason(&self) -> FailureReason {
        match self {
            RunnerError::Provision { .. } => FailureReason::Provision,
            RunnerError::Artifact { .. } => FailureReason::Artifact,
            RunnerError::ToolchainMissing { .. } => FailureReason::ToolchainMissing,
            RunnerError::ToolchainRun { .. } => FailureReason::ToolchainRun,
        }
    }

    pub(crate) fn provision(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RunnerError::Provision {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
