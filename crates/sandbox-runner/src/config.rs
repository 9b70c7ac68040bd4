use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_PROJECT_PATH: &str = "./foundry";
pub const DEFAULT_ARTIFACT_NAME: &str = "Generated.t.sol";
pub const DEFAULT_TOOLCHAIN_PROGRAM: &str = "forge";
pub const DEFAULT_VERBOSITY_FLAG: &str = "-vvv";

/// Per-invocation settings, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub project_path: PathBuf,
    pub artifact_path: Option<PathBuf>,
    pub verbose: bool,
    /// File name the artifact gets inside the sandbox `test` directory.
    pub artifact_name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            project_path: PathBuf::from(DEFAULT_PROJECT_PATH),
            artifact_path: None,
            verbose: false,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
        }
    }
}

impl RunConfig {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            ..Self::default()
        }
    }
}

/// The external test executable and how to ask it for more output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub program: PathBuf,
    pub verbosity_flag: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_TOOLCHAIN_PROGRAM),
            verbosity_flag: DEFAULT_VERBOSITY_FLAG.to_string(),
        }
    }
}

impl Toolchain {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> String {
        self.program.display().to_string()
    }

    /// `test -C <project> [verbosity]`, with the project path passed as given.
    pub fn test_args(&self, config: &RunConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "test".into(),
            "-C".into(),
            config.project_path.clone().into_os_string(),
        ];
        if config.verbose {
            args.push(self.verbosity_flag.clone().into());
        }
        args
    }
}
