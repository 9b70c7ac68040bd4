use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, RunnerError};

pub const MANIFEST_FILE: &str = "foundry.toml";
pub const SRC_DIR: &str = "src";
pub const TEST_DIR: &str = "test";

/// Written once when the manifest is missing. The toolchain owns this format.
pub const DEFAULT_MANIFEST: &str = "[profile.default]
src = \"src\"
out = \"out\"
test = \"test\"
libs = [\"lib\"]
";

/// Paths of a provisioned sandbox and the entries this call had to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxLayout {
    pub root: PathBuf,
    pub src_dir: PathBuf,
    pub test_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub created: Vec<PathBuf>,
}

impl SandboxLayout {
    pub fn was_already_provisioned(&self) -> bool {
        self.created.is_empty()
    }
}

/// Ensures `project/{src,test}` and `project/foundry.toml` exist.
///
/// Additive only: nothing that already exists is rewritten, so calling this
/// repeatedly is a no-op after the first success.
pub fn ensure_sandbox(project: &Path) -> Result<SandboxLayout> {
    let mut layout = SandboxLayout {
        root: project.to_path_buf(),
        src_dir: project.join(SRC_DIR),
        test_dir: project.join(TEST_DIR),
        manifest_path: project.join(MANIFEST_FILE),
        created: Vec::new(),
    };

    let dirs = [
        layout.root.clone(),
        layout.src_dir.clone(),
        layout.test_dir.clone(),
    ];
    for dir in dirs {
        if ensure_dir(&dir)? {
            debug!(path = %dir.display(), "created sandbox directory");
            layout.created.push(dir);
        }
    }

    if ensure_manifest(&layout.manifest_path)? {
        debug!(path = %layout.manifest_path.display(), "wrote default manifest");
        layout.created.push(layout.manifest_path.clone());
    }

    if !layout.created.is_empty() {
        info!(
            project = %project.display(),
            created = layout.created.len(),
            "provisioned sandbox"
        );
    }
    Ok(layout)
}

/// Returns `true` when the directory had to be created.
fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    if path.exists() {
        return Err(RunnerError::provision(
            path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    }
    match fs::create_dir_all(path) {
        Ok(()) => Ok(true),
        // Lost a creation race with another invocation.
        Err(_) if path.is_dir() => Ok(false),
        Err(e) => Err(RunnerError::provision(path, e)),
    }
}

/// Returns `true` when the default manifest was written by this call.
fn ensure_manifest(path: &Path) -> Result<bool> {
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if path.is_file() {
                return Ok(false);
            }
            return Err(RunnerError::provision(
                path,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "manifest path exists but is not a regular file",
                ),
            ));
        }
        Err(e) => return Err(RunnerError::provision(path, e)),
    };

    if let Err(e) = file
        .write_all(DEFAULT_MANIFEST.as_bytes())
        .and_then(|_| file.sync_all())
    {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(RunnerError::provision(path, e));
    }
    Ok(true)
}
