//! Command implementations

pub mod build;
pub mod list;
pub mod plan;
pub mod toolchain;

use std::path::Path;

use anyhow::Result;

use buildmatrix::util::config::{global_config_path, load_config, BuildConfig};
use buildmatrix::util::Config;

use crate::cli::MatrixArgs;

/// Load the project config layered over the user-wide one.
pub fn load(project: &Path) -> Result<Config> {
    load_config(global_config_path().as_deref(), project)
}

/// `[build]` settings with the command-line overrides applied.
pub fn build_settings(config: &Config, args: &MatrixArgs) -> BuildConfig {
    let mut build = config.build.clone();
    build.merge(BuildConfig {
        build_type: args.build_type.clone(),
        thread_checks: args.thread_checks.then_some(true),
        ..BuildConfig::default()
    });
    build
}
