//! buildmatrix CLI - build native libraries across an ABI/STL/NDK matrix

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("buildmatrix=debug")
    } else {
        EnvFilter::new("buildmatrix=info")
    };

    // stdout is reserved for command output and JSON events.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load(&cli.config)?;

    // Execute command
    match cli.command {
        Commands::List(args) => commands::list::execute(&config, args),
        Commands::Plan(args) => commands::plan::execute(&config, args),
        Commands::Build(args) => commands::build::execute(&config, &cli.config, args, cli.verbose),
        Commands::Toolchain(args) => commands::toolchain::execute(&config, args),
    }
}
