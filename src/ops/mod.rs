//! High-level operations.
//!
//! This module contains the implementation of buildmatrix commands.

pub mod matrix_build;

pub use matrix_build::{build_matrix, plan_jobs, plan_profile, BuildJob, JobPlan, MatrixSummary};
