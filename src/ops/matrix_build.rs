//! Implementation of `buildmatrix plan` and `buildmatrix build`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;

use crate::builder::executor::ChunkedExecutor;
use crate::builder::invoker::{BuildInvoker, BuildOutput};
use crate::core::cell::MatrixCell;
use crate::core::library::LibrarySpec;
use crate::core::options::BuildOptions;
use crate::matrix::enumerate::{check_unique_keys, enumerate};
use crate::matrix::filter::filter_libraries;
use crate::matrix::profile::{ProfileTables, ReleaseProfile};

/// One cell together with the libraries it builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildJob {
    pub cell: MatrixCell,
    pub options: BuildOptions,
    pub libraries: Vec<LibrarySpec>,
}

impl BuildJob {
    pub fn key(&self) -> String {
        self.options.build_key(&self.cell.toolchain)
    }

    pub fn library_names(&self) -> Vec<&str> {
        self.libraries.iter().map(|l| l.name.as_str()).collect()
    }
}

/// Jobs to run and cells left out, both in enumeration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobPlan {
    pub jobs: Vec<BuildJob>,
    /// Cells with no compatible library.
    pub skipped: Vec<MatrixCell>,
}

impl JobPlan {
    /// Distinct toolchain versions used by the jobs, in first-use order.
    pub fn toolchain_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = Vec::new();
        for job in &self.jobs {
            let version = job.cell.toolchain.version.as_str();
            if !versions.contains(&version) {
                versions.push(version);
            }
        }
        versions
    }
}

/// Pair every cell with its compatible libraries.
///
/// Cells with nothing to build are moved to [`JobPlan::skipped`]; they are
/// neither run nor failures.
pub fn plan_jobs(
    cells: Vec<MatrixCell>,
    libraries: &[LibrarySpec],
    build_type: &str,
    thread_checks: bool,
) -> JobPlan {
    let mut plan = JobPlan::default();

    for cell in cells {
        let options = cell.options(build_type, thread_checks);
        let libraries = filter_libraries(libraries, &cell, &options);

        if libraries.is_empty() {
            tracing::debug!("skipping {}: no compatible libraries", cell);
            plan.skipped.push(cell);
        } else {
            plan.jobs.push(BuildJob {
                cell,
                options,
                libraries,
            });
        }
    }

    plan
}

/// Enumerate `profile` and plan its jobs.
pub fn plan_profile(
    tables: &ProfileTables,
    libraries: &[LibrarySpec],
    profile: ReleaseProfile,
    build_type: &str,
    thread_checks: bool,
) -> Result<JobPlan> {
    let cells = enumerate(tables, profile)?;
    Ok(plan_jobs(cells, libraries, build_type, thread_checks))
}

/// Outcome of a successful matrix run.
#[derive(Debug, Clone)]
pub struct MatrixSummary {
    /// One output per job, in job order.
    pub built: Vec<BuildOutput>,
    pub skipped: Vec<MatrixCell>,
    pub elapsed: Duration,
}

/// Build every job of `plan` with `invoker`, chunk by chunk.
///
/// Build keys are checked for collisions before anything runs. The first
/// failing cell ends the run with that cell's error.
pub fn build_matrix(
    plan: JobPlan,
    invoker: Arc<dyn BuildInvoker>,
    executor: &ChunkedExecutor,
    label: &str,
) -> Result<MatrixSummary> {
    check_unique_keys(plan.jobs.iter().map(|job| (&job.cell, &job.options)))?;

    let start = Instant::now();
    tracing::info!(
        "building {} cell(s) in {} chunk(s) of up to {}",
        plan.jobs.len(),
        executor.chunk_count(plan.jobs.len()),
        executor.chunk_size()
    );

    let built = executor.run(label, plan.jobs, move |job: BuildJob| {
        invoker.invoke(&job.cell.toolchain, &job.options, &job.libraries)
    })?;

    Ok(MatrixSummary {
        built,
        skipped: plan.skipped,
        elapsed: start.elapsed(),
    })
}
