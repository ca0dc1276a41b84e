//! The boundary between the scheduler and the external build tools.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::library::LibrarySpec;
use crate::core::options::BuildOptions;
use crate::core::toolchain::ToolchainDescriptor;

/// What one cell build produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutput {
    /// Build key of the cell
    pub key: String,
    /// Directory holding the built archives, if anything was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Libraries that were built
    pub libraries: Vec<String>,
}

impl BuildOutput {
    pub fn new(toolchain: &ToolchainDescriptor, options: &BuildOptions, libraries: &[LibrarySpec]) -> Self {
        BuildOutput {
            key: options.build_key(toolchain),
            output_dir: None,
            libraries: libraries.iter().map(|l| l.name.clone()).collect(),
        }
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
}

/// Builds a set of libraries for one matrix cell.
///
/// Called concurrently from worker threads, once per cell. Implementations
/// must not hold locks while the external build runs.
pub trait BuildInvoker: Send + Sync {
    fn invoke(
        &self,
        toolchain: &ToolchainDescriptor,
        options: &BuildOptions,
        libraries: &[LibrarySpec],
    ) -> Result<BuildOutput>;
}

/// Logs what would be built without running anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunInvoker;

impl BuildInvoker for DryRunInvoker {
    fn invoke(
        &self,
        toolchain: &ToolchainDescriptor,
        options: &BuildOptions,
        libraries: &[LibrarySpec],
    ) -> Result<BuildOutput> {
        let output = BuildOutput::new(toolchain, options, libraries);
        tracing::info!("would build {} [{}]", output.key, output.libraries.join(", "));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_reports_key_and_libraries() {
        let toolchain = ToolchainDescriptor::new(24, "r23");
        let options = BuildOptions::new("Release", false, "c++_shared", "arm64-v8a");
        let libs = vec![LibrarySpec::new("swappy"), LibrarySpec::new("oboe")];

        let output = DryRunInvoker.invoke(&toolchain, &options, &libs).unwrap();
        assert_eq!(output.key, "arm64-v8a_API24_NDK23_cpp_shared_Release");
        assert_eq!(output.libraries, ["swappy", "oboe"]);
        assert_eq!(output.output_dir, None);
    }
}
