//! Per-cell build options and the derived build key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::toolchain::ToolchainDescriptor;

/// One choice along each build axis: build type, thread checks, C++ runtime
/// variant (STL) and target ABI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildOptions {
    /// CMake build type (e.g. `Release`, `Debug`).
    pub build_type: String,
    /// Compile in runtime thread-checking instrumentation.
    pub thread_checks: bool,
    /// C++ runtime variant, e.g. `c++_static`.
    pub stl: String,
    /// Target ABI, e.g. `arm64-v8a`.
    pub abi: String,
}

impl BuildOptions {
    /// Create build options for an ABI/STL pair.
    pub fn new(
        build_type: impl Into<String>,
        thread_checks: bool,
        stl: impl Into<String>,
        abi: impl Into<String>,
    ) -> Self {
        BuildOptions {
            build_type: build_type.into(),
            thread_checks,
            stl: stl.into(),
            abi: abi.into(),
        }
    }

    /// Derive the output key for these options under `toolchain`.
    pub fn build_key(&self, toolchain: &ToolchainDescriptor) -> String {
        build_key(toolchain, self)
    }

    /// Whether the runtime variant is one of the legacy GNU STLs.
    pub fn is_gnustl(&self) -> bool {
        self.stl == "gnustl_static" || self.stl == "gnustl_shared"
    }
}

impl fmt::Display for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}{}",
            self.abi,
            self.stl,
            self.build_type,
            if self.thread_checks {
                " +thread-checks"
            } else {
                ""
            }
        )
    }
}

/// Filesystem-safe key naming the output location of one build.
///
/// Format: `{abi}_API{level}_NDK{major}_{stl}_{build_type}`, with every `+`
/// in the STL name rewritten to `p`.
pub fn build_key(toolchain: &ToolchainDescriptor, options: &BuildOptions) -> String {
    format!(
        "{}_API{}_NDK{}_{}_{}",
        options.abi,
        toolchain.api_level,
        toolchain.major_version_label(),
        sanitize_stl(&options.stl),
        options.build_type
    )
}

fn sanitize_stl(stl: &str) -> String {
    stl.replace('+', "p")
}
