use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod source_io;
mod terminal;

use commands::{scan::ScanArgs, score::ScoreArgs};

#[derive(Parser)]
#[command(name = "kansa")]
#[command(about = "Solidity vulnerability scanner - detect reentrancy and other security issues")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan Solidity files for vulnerabilities
    Scan(ScanArgs),

    /// Calculate a security score for a single file
    Score(ScoreArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let exit_code = match cli.command {
        Commands::Scan(args) => args.execute()?,
        Commands::Score(args) => args.execute()?,
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
