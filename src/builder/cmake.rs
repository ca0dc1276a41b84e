//! CMake + Ninja build invocation for one matrix cell.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::builder::invoker::{BuildInvoker, BuildOutput};
use crate::builder::toolchain::ToolchainPaths;
use crate::core::library::{cmake_list, LibrarySpec};
use crate::core::options::BuildOptions;
use crate::core::toolchain::ToolchainDescriptor;
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// Project, working and output directories of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFolders {
    pub project: PathBuf,
    pub working: PathBuf,
    pub output: PathBuf,
}

impl BuildFolders {
    /// Folders for the cell with build key `key` under `build_dir`.
    pub fn new(project: &Path, build_dir: &Path, key: &str) -> Self {
        BuildFolders {
            project: project.to_path_buf(),
            working: build_dir.join("work").join(key),
            output: build_dir.join("out").join(key),
        }
    }

    fn ensure(&self) -> Result<()> {
        ensure_dir(&self.working)?;
        ensure_dir(&self.output)
    }
}

/// Configures each cell with CMake and builds it with Ninja.
#[derive(Debug, Clone)]
pub struct CMakeInvoker {
    project_dir: PathBuf,
    build_dir: PathBuf,
    toolchains: BTreeMap<String, ToolchainPaths>,
    git_commit: String,
}

impl CMakeInvoker {
    /// Create an invoker for the CMake project in `project_dir`, using the
    /// resolved toolchains keyed by version.
    pub fn new(
        project_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
        toolchains: BTreeMap<String, ToolchainPaths>,
    ) -> Self {
        CMakeInvoker {
            project_dir: project_dir.into(),
            build_dir: build_dir.into(),
            toolchains,
            git_commit: "unknown".to_string(),
        }
    }

    /// Embed a source revision in the compiled libraries.
    pub fn git_commit(mut self, commit: impl Into<String>) -> Self {
        self.git_commit = commit.into();
        self
    }

    fn paths(&self, toolchain: &ToolchainDescriptor) -> Result<&ToolchainPaths> {
        self.toolchains
            .get(&toolchain.version)
            .ok_or_else(|| anyhow!("NDK {} was not resolved before scheduling", toolchain.version))
    }

    /// The CMake configure command for one cell.
    pub fn configure_command(
        &self,
        paths: &ToolchainPaths,
        folders: &BuildFolders,
        toolchain: &ToolchainDescriptor,
        options: &BuildOptions,
        libraries: &[LibrarySpec],
    ) -> ProcessBuilder {
        let mut cxx_flags = format!(
            "-DANDROID_NDK_VERSION={} -DMATRIX_GIT_COMMIT={}",
            toolchain.major_version_label(),
            self.git_commit
        );
        if options.is_gnustl() {
            cxx_flags.push_str(" -DANDROID_GNUSTL");
        }

        let mut cmd = ProcessBuilder::new(&paths.cmake)
            .arg(&folders.project)
            .define("CMAKE_BUILD_TYPE", &options.build_type)
            .define("ANDROID_PLATFORM", format!("android-{}", toolchain.api_level))
            .define("CMAKE_ANDROID_NDK", paths.ndk.display())
            .define("ANDROID_STL", &options.stl)
            .define("ANDROID_ABI", &options.abi)
            .define("ANDROID_UNIFIED_HEADERS", 1)
            .define("CMAKE_CXX_FLAGS", cxx_flags)
            .define("CMAKE_C_COMPILER_WORKS", 1)
            .define("CMAKE_CXX_COMPILER_WORKS", 1)
            .define("CMAKE_TRY_COMPILE_TARGET_TYPE", "STATIC_LIBRARY")
            .define("CMAKE_TOOLCHAIN_FILE", paths.toolchain_file().display())
            .define("CMAKE_ARCHIVE_OUTPUT_DIRECTORY", folders.output.display())
            .define("MATRIX_THREAD_CHECKS", u8::from(options.thread_checks))
            .define("CMAKE_MAKE_PROGRAM", paths.ninja.display())
            .arg("-GNinja")
            .define("MATRIX_LIBRARIES", cmake_list(libraries))
            .cwd(&folders.working);

        if let Some(ref protobuf) = paths.protobuf {
            cmd = cmd.prepend_path(&protobuf.join("bin"));
        }

        cmd
    }

    /// The Ninja build command for a configured cell.
    pub fn ninja_command(&self, paths: &ToolchainPaths, folders: &BuildFolders) -> ProcessBuilder {
        ProcessBuilder::new(&paths.ninja).cwd(&folders.working)
    }
}

impl BuildInvoker for CMakeInvoker {
    fn invoke(
        &self,
        toolchain: &ToolchainDescriptor,
        options: &BuildOptions,
        libraries: &[LibrarySpec],
    ) -> Result<BuildOutput> {
        let output = BuildOutput::new(toolchain, options, libraries);
        if libraries.is_empty() {
            return Ok(output);
        }

        let paths = self.paths(toolchain)?;
        let folders = BuildFolders::new(&self.project_dir, &self.build_dir, &output.key);
        folders.ensure()?;

        let configure = self.configure_command(paths, &folders, toolchain, options, libraries);
        tracing::debug!("{}", configure.display_command());
        configure.exec_and_check().with_context(|| {
            format!(
                "CMake failed for {} with {} and {}",
                output.libraries.join(", "),
                toolchain,
                options
            )
        })?;

        let ninja = self.ninja_command(paths, &folders);
        tracing::debug!("{} (in {})", ninja.display_command(), folders.working.display());
        ninja.exec_and_check().with_context(|| {
            format!(
                "build failed with {} in {}",
                toolchain,
                folders.working.display()
            )
        })?;

        Ok(output.with_output_dir(folders.output))
    }
}
