use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, info, warn};

use crate::config::{RunConfig, Toolchain};
use crate::error::{Result, RunnerError};
use crate::outcome::ProcessOutcome;

const FORWARD_CHUNK: usize = 8 * 1024;

/// Runs `<program> --version` and returns its first stdout line.
///
/// Any launch failure or nonzero exit means the toolchain cannot be used.
pub fn check_toolchain_available(toolchain: &Toolchain) -> Result<String> {
    let program = toolchain.display_name();
    let output = Command::new(&toolchain.program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| RunnerError::ToolchainMissing {
            program: program.clone(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            format!("`--version` exited with {}", describe_status(&output.status))
        } else {
            format!(
                "`--version` exited with {}. stderr: {}",
                describe_status(&output.status),
                stderr
            )
        };
        return Err(RunnerError::ToolchainMissing { program, detail });
    }

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown version")
        .to_string();
    info!(toolchain = %program, version = %version, "toolchain available");
    Ok(version)
}

/// Launches the test command and forwards its output live until it exits.
///
/// A normal exit maps to a `ProcessOutcome` carrying the child's own code;
/// launch failures, wait failures and signal deaths are `ToolchainRun` errors.
pub fn run_tests<O, E>(
    config: &RunConfig,
    toolchain: &Toolchain,
    out: &mut O,
    err: &mut E,
) -> Result<ProcessOutcome>
where
    O: Write + Send,
    E: Write + Send,
{
    let program = toolchain.display_name();
    let run_error = |detail: String| RunnerError::ToolchainRun {
        program: program.clone(),
        detail,
    };

    let args = toolchain.test_args(config);
    info!("Running forge tests in project: {}", config.project_path.display());
    debug!(program = %program, args = ?args, "launching toolchain");

    let mut child = Command::new(&toolchain.program)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| run_error(format!("failed to launch: {}", e)))?;

    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();

    thread::scope(|scope| {
        let stdout_task = scope.spawn(move || child_stdout.map(|r| forward_stream(r, out)));
        let stderr_task = scope.spawn(move || child_stderr.map(|r| forward_stream(r, err)));
        for (name, task) in [("stdout", stdout_task), ("stderr", stderr_task)] {
            match task.join() {
                Ok(Some(Err(e))) => warn!(stream = name, error = %e, "output forwarding stopped"),
                Ok(_) => {}
                Err(_) => warn!(stream = name, "output forwarding thread panicked"),
            }
        }
    });

    let status = child
        .wait()
        .map_err(|e| run_error(format!("failed to wait for toolchain: {}", e)))?;
    debug!(status = %describe_status(&status), "toolchain exited");

    match status.code() {
        Some(code) => Ok(ProcessOutcome::from_exit_code(code)),
        None => Err(run_error(format!(
            "terminated abnormally ({})",
            describe_status(&status)
        ))),
    }
}

/// Copies `reader` into `writer` chunk by chunk, flushing after each chunk.
///
/// A failing writer does not stop the copy: the pipe is still drained so the
/// child never blocks on a full buffer. The first write error is returned
/// once the reader hits EOF.
fn forward_stream<R: Read, W: Write + ?Sized>(mut reader: R, writer: &mut W) -> io::Result<u64> {
    let mut buf = [0u8; FORWARD_CHUNK];
    let mut total = 0u64;
    let mut write_error: Option<io::Error> = None;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        total += n as u64;
        if write_error.is_none() {
            if let Err(e) = writer.write_all(&buf[..n]).and_then(|_| writer.flush()) {
                write_error = Some(e);
            }
        }
    }
    match write_error {
        Some(e) => Err(e),
        None => Ok(total),
    }
}

fn describe_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit code {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal {}", signal);
        }
    }
    "unknown status".to_string()
}
