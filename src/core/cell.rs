//! The unit of work in a build matrix.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::options::BuildOptions;
use crate::core::toolchain::ToolchainDescriptor;

/// One (ABI, STL, toolchain) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixCell {
    pub abi: String,
    pub stl: String,
    pub toolchain: ToolchainDescriptor,
}

impl MatrixCell {
    pub fn new(abi: impl Into<String>, stl: impl Into<String>, toolchain: ToolchainDescriptor) -> Self {
        MatrixCell {
            abi: abi.into(),
            stl: stl.into(),
            toolchain,
        }
    }

    /// Build options for this cell with a caller-chosen build type.
    pub fn options(&self, build_type: impl Into<String>, thread_checks: bool) -> BuildOptions {
        BuildOptions::new(build_type, thread_checks, self.stl.clone(), self.abi.clone())
    }
}

impl fmt::Display for MatrixCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.abi, self.stl, self.toolchain)
    }
}
