mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::RunExit;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tidy",
    about = "Run declarative file-system maintenance plans",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory relative plan paths resolve against (default: the plan's directory)
    #[arg(long, global = true, env = "TIDY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log every action as it runs
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and run a plan
    Run {
        /// Path to the plan file
        plan: PathBuf,
    },

    /// Validate a plan without running it
    Check {
        /// Path to the plan file
        plan: PathBuf,
    },

    /// Print the action tree of a plan
    Describe {
        /// Path to the plan file
        plan: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.as_deref();

    let result = match &cli.command {
        Commands::Run { plan } => cmd::run::run(plan, root, cli.json),
        Commands::Check { plan } => cmd::check::run(plan, root, cli.json),
        Commands::Describe { plan } => cmd::describe::run(plan, root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        let code = e.downcast_ref::<RunExit>().map(RunExit::exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}
