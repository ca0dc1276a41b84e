//! `buildmatrix build` command

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use buildmatrix::builder::estimate::format_duration;
use buildmatrix::builder::{
    BarProgress, BuildInvoker, CMakeInvoker, ChunkedExecutor, DryRunInvoker, JsonProgress,
    LogProgress, MatrixEvent, ProgressSink, ToolchainLocator,
};
use buildmatrix::ops::{build_matrix, plan_profile, JobPlan};
use buildmatrix::util::config::BuildConfig;
use buildmatrix::util::fs::resolve_against;
use buildmatrix::util::git::head_commit_or_unknown;
use buildmatrix::util::Config;

use crate::cli::{BuildArgs, MessageFormat};
use crate::commands::build_settings;

pub fn execute(config: &Config, config_path: &Path, args: BuildArgs, verbose: bool) -> Result<()> {
    let mut build = build_settings(config, &args.matrix);
    build.merge(BuildConfig {
        chunk_size: args.chunk_size,
        max_workers: args.jobs,
        ..BuildConfig::default()
    });

    let profile = args.matrix.profile;
    let plan = plan_profile(
        &config.matrix,
        &config.libraries,
        profile,
        build.build_type(),
        build.thread_checks(),
    )?;

    // Toolchains are resolved before anything is dispatched.
    let invoker: Arc<dyn BuildInvoker> = if args.dry_run {
        Arc::new(DryRunInvoker)
    } else {
        Arc::new(cmake_invoker(config, config_path, &build, &plan)?)
    };

    let json = args.message_format == MessageFormat::Json;
    let progress: Arc<dyn ProgressSink> = if json {
        Arc::new(JsonProgress)
    } else if verbose || !std::io::stderr().is_terminal() {
        Arc::new(LogProgress)
    } else {
        Arc::new(BarProgress::new())
    };

    let executor = ChunkedExecutor::new(build.chunk_size())?
        .max_workers(build.max_workers.unwrap_or(0))
        .progress(progress);

    if json {
        JsonProgress.emit(&MatrixEvent::MatrixStarted {
            profile: profile.to_string(),
            jobs: plan.jobs.len() as u64,
            skipped: plan.skipped.len() as u64,
            chunk_size: executor.chunk_size() as u64,
        });
        for cell in &plan.skipped {
            let options = cell.options(build.build_type(), build.thread_checks());
            JsonProgress.emit(&MatrixEvent::CellSkipped {
                key: options.build_key(&cell.toolchain),
            });
        }
    }

    let start = Instant::now();
    let result = build_matrix(plan, invoker, &executor, profile.as_str());
    let duration_ms = start.elapsed().as_millis() as u64;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if json {
                JsonProgress.emit(&MatrixEvent::failed(duration_ms, format!("{:#}", e)));
            }
            return Err(e);
        }
    };

    if json {
        JsonProgress.emit(&MatrixEvent::finished(duration_ms, summary.built.len() as u64));
    } else {
        eprintln!(
            "    Finished {} cell(s) ({} skipped) in {}",
            summary.built.len(),
            summary.skipped.len(),
            format_duration(summary.elapsed)
        );
    }

    Ok(())
}

fn cmake_invoker(
    config: &Config,
    config_path: &Path,
    build: &BuildConfig,
    plan: &JobPlan,
) -> Result<CMakeInvoker> {
    let locator = ToolchainLocator::from_settings(&config.toolchain);
    let toolchains = locator.resolve_all(plan.toolchain_versions())?;

    let project_dir = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let build_dir = resolve_against(&project_dir, &build.build_dir());
    let commit = head_commit_or_unknown(&project_dir);

    Ok(CMakeInvoker::new(&project_dir, build_dir, toolchains).git_commit(commit))
}
