use std::fmt;

use crate::error::RunnerError;

/// Exit status used whenever the orchestrator itself fails rather than the tests.
pub const FALLBACK_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The toolchain ran and reported failing tests through a nonzero code.
    TestsFailed,
    Provision,
    Artifact,
    ToolchainMissing,
    ToolchainRun,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::TestsFailed => "tests_failed",
            FailureReason::Provision => "provision",
            FailureReason::Artifact => "artifact",
            FailureReason::ToolchainMissing => "toolchain_missing",
            FailureReason::ToolchainRun => "toolchain_run",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one invocation. `failure` is `None` exactly when `exit_code` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub failure: Option<FailureReason>,
}

impl ProcessOutcome {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            failure: None,
        }
    }

    /// Maps a normally terminated toolchain's exit code.
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::success()
        } else {
            Self {
                exit_code: code,
                failure: Some(FailureReason::TestsFailed),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

impl From<&RunnerError> for ProcessOutcome {
    fn from(err: &RunnerError) -> Self {
        Self {
            exit_code: FALLBACK_EXIT_CODE,
            failure: Some(err.reason()),
        }
    }
}
