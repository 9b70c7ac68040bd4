use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sandbox_runner::{
    ProcessOutcome, RunConfig, RunnerError, Toolchain, DEFAULT_ARTIFACT_NAME,
    DEFAULT_PROJECT_PATH, DEFAULT_TOOLCHAIN_PROGRAM,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const INSTALL_HINT: &str = "Foundry (forge) is required. Install from https://book.getfoundry.sh/getting-started/installation";

#[derive(Parser)]
#[command(
    name = "sandbox-run",
    version,
    about = "Provision a Foundry sandbox and run its tests",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args)]
struct RunArgs {
    /// Sandbox root, defaults to ./foundry
    #[arg(long)]
    project: Option<PathBuf>,
    /// Generated test file copied into the sandbox before running
    #[arg(long)]
    code_file: Option<PathBuf>,
    #[arg(long)]
    verbose: bool,
    #[arg(long, default_value = DEFAULT_ARTIFACT_NAME)]
    artifact_name: String,
    #[arg(long, env = "FORGE_BIN", default_value = DEFAULT_TOOLCHAIN_PROGRAM)]
    forge_bin: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sandbox layout without running the toolchain
    Init {
        #[arg(long, default_value = DEFAULT_PROJECT_PATH)]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let outcome = match cli.command {
        Some(Commands::Init { project }) => run_init(&project),
        None => run_tests(cli.run),
    };
    std::process::exit(outcome.exit_code);
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sandbox_runner=info,sandbox_run=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}

fn run_tests(args: RunArgs) -> ProcessOutcome {
    let project_path = args.project.unwrap_or_else(|| {
        tracing::debug!("no --project given, using {}", DEFAULT_PROJECT_PATH);
        PathBuf::from(DEFAULT_PROJECT_PATH)
    });
    let config = RunConfig {
        project_path,
        artifact_path: args.code_file,
        verbose: args.verbose,
        artifact_name: args.artifact_name,
    };
    let toolchain = Toolchain::new(args.forge_bin);

    match sandbox_runner::run(&config, &toolchain) {
        Ok(outcome) => {
            report_outcome(&outcome);
            outcome
        }
        Err(err) => report_error(&err),
    }
}

fn run_init(project: &std::path::Path) -> ProcessOutcome {
    match sandbox_runner::ensure_sandbox(project) {
        Ok(layout) => {
            if layout.was_already_provisioned() {
                println!("sandbox already provisioned: {}", layout.root.display());
            }
            for path in &layout.created {
                println!("created: {}", path.display());
            }
            ProcessOutcome::success()
        }
        Err(err) => report_error(&err),
    }
}

fn report_outcome(outcome: &ProcessOutcome) {
    if outcome.is_success() {
        println!("Forge tests completed successfully");
    } else {
        eprintln!("Forge tests failed with exit code {}", outcome.exit_code);
    }
}

fn report_error(err: &RunnerError) -> ProcessOutcome {
    if matches!(err, RunnerError::ToolchainMissing { .. }) {
        eprintln!("{}", INSTALL_HINT);
    }
    eprintln!("error: {}", err);
    let outcome = ProcessOutcome::from(err);
    tracing::debug!(reason = ?outcome.failure, "run aborted");
    outcome
}
