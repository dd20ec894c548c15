// Pathcov: structural coverage requirements for directed graphs
//
// Reads a graph in line format, computes prime paths or edge-pairs round by
// round, and prints the resulting test requirements.

use anyhow::Result;
use clap::Parser;

use pathcov::cli::{self, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Run the appropriate command
    run_command(cli)?;

    Ok(())
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::Prime(args) => cli::cmds::prime(args, &cli)?,
        Commands::EdgePairs(args) => cli::cmds::edge_pairs(args, &cli)?,
        Commands::Graph(args) => cli::cmds::graph(args, &cli)?,
    }
    Ok(())
}
