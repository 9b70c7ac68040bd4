use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::{Result, RunnerError};
use crate::sandbox::TEST_DIR;

/// Copies `source` to `<project>/test/<artifact_name>`, replacing whatever was there.
///
/// `artifact_name` must be a bare file name so the copy stays inside `test/`.
pub fn place_artifact(source: &Path, project: &Path, artifact_name: &str) -> Result<PathBuf> {
    let destination = project.join(TEST_DIR).join(artifact_name);
    let fail = |e: io::Error| RunnerError::Artifact {
        source_path: source.to_path_buf(),
        destination: destination.clone(),
        source: e,
    };

    if !is_plain_file_name(artifact_name) {
        return Err(fail(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("artifact name `{}` must be a single file name", artifact_name),
        )));
    }

    let meta = fs::metadata(source).map_err(fail)?;
    if !meta.is_file() {
        return Err(fail(io::Error::new(
            io::ErrorKind::InvalidInput,
            "artifact source is not a regular file",
        )));
    }

    if is_same_file(source, &destination) {
        info!(path = %destination.display(), "artifact already in place");
        return Ok(destination);
    }

    fs::copy(source, &destination).map_err(fail)?;
    info!("Copied test file to {}", destination.display());
    Ok(destination)
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::ensure_sandbox;
    use crate::test_support::temp_root;

    #[test]
    fn copies_into_test_dir() {
        let root = temp_root("artifact_copy");
        let project = root.join("sandbox");
        ensure_sandbox(&project).expect("provision");
        let source = root.join("Generated.t.sol");
        fs::write(&source, "contract GeneratedTest {}").expect("source");

        let dest = place_artifact(&source, &project, "Generated.t.sol").expect("place");
        assert_eq!(dest, project.join("test").join("Generated.t.sol"));
        assert_eq!(
            fs::read_to_string(&dest).expect("dest"),
            "contract GeneratedTest {}"
        );
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn latest_artifact_wins() {
        let root = temp_root("artifact_overwrite");
        let project = root.join("sandbox");
        ensure_sandbox(&project).expect("provision");
        fs::write(project.join("test").join("Generated.t.sol"), "old").expect("old");
        let source = root.join("next.sol");
        fs::write(&source, "new").expect("source");

        let dest = place_artifact(&source, &project, "Generated.t.sol").expect("place");
        assert_eq!(fs::read_to_string(dest).expect("dest"), "new");
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_source_is_an_artifact_error() {
        let root = temp_root("artifact_missing");
        let project = root.join("sandbox");
        ensure_sandbox(&project).expect("provision");

        let err = place_artifact(&root.join("nope.sol"), &project, "Generated.t.sol")
            .expect_err("must fail");
        match err {
            RunnerError::Artifact { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!project.join("test").join("Generated.t.sol").exists());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn directory_source_is_rejected() {
        let root = temp_root("artifact_dir_source");
        let project = root.join("sandbox");
        ensure_sandbox(&project).expect("provision");

        let err = place_artifact(&project.join("src"), &project, "Generated.t.sol")
            .expect_err("must fail");
        assert!(err.to_string().contains("not a regular file"), "{}", err);
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn artifact_name_must_stay_inside_test_dir() {
        let root = temp_root("artifact_escape");
        let project = root.join("sandbox");
        ensure_sandbox(&project).expect("provision");
        let source = root.join("Gen.t.sol");
        fs::write(&source, "contract GenTest {}").expect("source");

        for name in ["../x.sol", "/tmp/x.sol", "sub/x.sol", "..", "", "."] {
            let err = place_artifact(&source, &project, name).expect_err(name);
            match err {
                RunnerError::Artifact { source, .. } => {
                    assert_eq!(source.kind(), io::ErrorKind::InvalidInput, "{}", name)
                }
                other => panic!("unexpected error for {:?}: {}", name, other),
            }
        }
        assert!(!project.join("x.sol").exists());
        assert!(!root.join("x.sol").exists());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn placing_destination_onto_itself_keeps_content() {
        let root = temp_root("artifact_self");
        let project = root.join("sandbox");
        ensure_sandbox(&project).expect("provision");
        let dest = project.join("test").join("Generated.t.sol");
        fs::write(&dest, "contract Keep {}").expect("dest");

        place_artifact(&dest, &project, "Generated.t.sol").expect("place");
        assert_eq!(fs::read_to_string(&dest).expect("dest"), "contract Keep {}");
        let _ = fs::remove_dir_all(root);
    }
}
