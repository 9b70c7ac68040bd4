//! Provisions a Foundry-style test sandbox and runs the external toolchain in it.
//!
//! The flow is strictly sequential: [`ensure_sandbox`], then an optional
//! [`place_artifact`], then [`check_toolchain_available`], then [`run_tests`].
//! The first failure ends the invocation; the caller turns the resulting
//! [`ProcessOutcome`] into an exit status.

mod artifact;
mod config;
mod error;
mod outcome;
mod sandbox;
mod toolchain;

use std::io::{self, Write};

use tracing::debug;

pub use artifact::place_artifact;
pub use config::{
    RunConfig, Toolchain, DEFAULT_ARTIFACT_NAME, DEFAULT_PROJECT_PATH, DEFAULT_TOOLCHAIN_PROGRAM,
    DEFAULT_VERBOSITY_FLAG,
};
pub use error::{Result, RunnerError};
pub use outcome::{FailureReason, ProcessOutcome, FALLBACK_EXIT_CODE};
pub use sandbox::{ensure_sandbox, SandboxLayout, DEFAULT_MANIFEST, MANIFEST_FILE};
pub use toolchain::{check_toolchain_available, run_tests};

/// Runs the whole flow with toolchain output forwarded to `out` and `err`.
pub fn execute<O, E>(
    config: &RunConfig,
    toolchain: &Toolchain,
    out: &mut O,
    err: &mut E,
) -> Result<ProcessOutcome>
where
    O: Write + Send,
    E: Write + Send,
{
    let layout = ensure_sandbox(&config.project_path)?;
    debug!(
        root = %layout.root.display(),
        already_provisioned = layout.was_already_provisioned(),
        "sandbox ready"
    );

    if let Some(source) = &config.artifact_path {
        place_artifact(source, &config.project_path, &config.artifact_name)?;
    }

    check_toolchain_available(toolchain)?;
    run_tests(config, toolchain, out, err)
}

/// [`execute`] bound to this process's stdout and stderr.
pub fn run(config: &RunConfig, toolchain: &Toolchain) -> Result<ProcessOutcome> {
    execute(config, toolchain, &mut io::stdout(), &mut io::stderr())
}
