//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use buildmatrix::matrix::ReleaseProfile;
use buildmatrix::util::config::CONFIG_FILE;

/// buildmatrix - build native libraries across an ABI/STL/NDK matrix
#[derive(Parser)]
#[command(name = "buildmatrix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project configuration file
    #[arg(long, global = true, env = "BUILDMATRIX_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every cell of a release profile
    List(ListArgs),

    /// Show which libraries each cell would build
    Plan(PlanArgs),

    /// Build the matrix
    Build(BuildArgs),

    /// Show the resolved toolchain installations
    Toolchain(ToolchainArgs),
}

/// Options shared by every command that walks the matrix.
#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    /// Release profile: full, packaged, reduced, or reduced-packaged
    #[arg(short, long, default_value = "full")]
    pub profile: ReleaseProfile,

    /// CMake build type (default: from config, then Release)
    #[arg(long)]
    pub build_type: Option<String>,

    /// Build with thread-checking instrumentation
    #[arg(long)]
    pub thread_checks: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Cells dispatched together
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Maximum concurrent builds within a chunk
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Log what would be built without running CMake
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for progress
    #[arg(long, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// Progress bar or log lines on stderr
    Human,
    /// One JSON event per line on stdout
    Json,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Release profile whose toolchains are resolved
    #[arg(short, long, default_value = "full")]
    pub profile: ReleaseProfile,
}
