//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.buildmatrix/config.toml` - `[build]` and `[toolchain]` defaults
//! - Project: `Matrix.toml` - matrix tables, libraries, and overrides
//!
//! Project settings take precedence over global ones. The matrix tables and
//! the library list only come from the project file; when it omits them the
//! built-in tables apply.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::library::LibrarySpec;
use crate::matrix::profile::ProfileTables;
use crate::util::fs::resolve_against;

/// Default project configuration file name.
pub const CONFIG_FILE: &str = "Matrix.toml";

/// Cells dispatched together when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 8;

pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Build directory relative to the project, when not configured.
pub const DEFAULT_BUILD_DIR: &str = "build/matrix";

/// Complete configuration for a matrix build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ABI/STL/toolchain tables
    pub matrix: ProfileTables,

    /// Libraries to build
    #[serde(rename = "library")]
    pub libraries: Vec<LibrarySpec>,

    /// Build settings
    pub build: BuildConfig,

    /// Toolchain installation settings
    pub toolchain: ToolchainSettings,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Cells per chunk
    pub chunk_size: Option<usize>,

    /// Upper bound on concurrent builds within a chunk
    pub max_workers: Option<usize>,

    /// CMake build type
    pub build_type: Option<String>,

    /// Build with thread-checking instrumentation
    pub thread_checks: Option<bool>,

    /// Root of per-cell working and output directories
    pub build_dir: Option<PathBuf>,
}

impl BuildConfig {
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    pub fn build_type(&self) -> &str {
        self.build_type.as_deref().unwrap_or(DEFAULT_BUILD_TYPE)
    }

    pub fn thread_checks(&self) -> bool {
        self.thread_checks.unwrap_or(false)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: BuildConfig) {
        if other.chunk_size.is_some() {
            self.chunk_size = other.chunk_size;
        }
        if other.max_workers.is_some() {
            self.max_workers = other.max_workers;
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
        if other.thread_checks.is_some() {
            self.thread_checks = other.thread_checks;
        }
        if other.build_dir.is_some() {
            self.build_dir = other.build_dir;
        }
    }
}

/// Where the external toolchains are installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Directories searched for NDK installations
    pub ndk_roots: Vec<PathBuf>,

    /// Path to cmake (default: found in PATH)
    pub cmake: Option<PathBuf>,

    /// Path to ninja (default: found in PATH)
    pub ninja: Option<PathBuf>,

    /// Protobuf installation whose `bin` is put on PATH for builds
    pub protobuf: Option<PathBuf>,
}

impl ToolchainSettings {
    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainSettings) {
        if !other.ndk_roots.is_empty() {
            self.ndk_roots = other.ndk_roots;
        }
        if other.cmake.is_some() {
            self.cmake = other.cmake;
        }
        if other.ninja.is_some() {
            self.ninja = other.ninja;
        }
        if other.protobuf.is_some() {
            self.protobuf = other.protobuf;
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for root in &mut self.ndk_roots {
            *root = resolve_against(base, root);
        }
        for tool in [&mut self.cmake, &mut self.ninja, &mut self.protobuf] {
            if let Some(path) = tool.as_mut() {
                // Bare names like `cmake` are looked up in PATH later.
                if path.components().count() > 1 {
                    *path = resolve_against(base, path);
                }
            }
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file is missing or
    /// unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge the `[build]` and `[toolchain]` sections of another config
    /// (other takes precedence).
    pub fn merge_settings(&mut self, other: &Config) {
        self.build.merge(other.build.clone());
        self.toolchain.merge(other.toolchain.clone());
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(dir) = self.build.build_dir.as_mut() {
            *dir = resolve_against(base, dir);
        }
        self.toolchain.resolve_paths(base);
    }
}

/// Load the project configuration layered over the global one.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`Matrix.toml`)
/// 2. Global config (`~/.buildmatrix/config.toml`)
/// 3. Defaults
///
/// A malformed project file is an error; a malformed global file is ignored
/// with a warning. The matrix tables are validated here so configuration
/// errors surface before anything is scheduled.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = if project_path.exists() {
        Config::load(project_path)?
    } else {
        tracing::debug!(
            "{} not found, using built-in matrix tables",
            project_path.display()
        );
        Config::default()
    };

    if let Some(global_path) = global_path {
        let global = Config::load_or_default(global_path);
        let project = config.clone();
        config.build = global.build;
        config.toolchain = global.toolchain;
        config.merge_settings(&project);
    }

    config
        .matrix
        .validate()
        .with_context(|| format!("invalid matrix tables in {}", project_path.display()))?;

    Ok(config)
}

/// Get the global config directory (`~/.buildmatrix`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".buildmatrix"))
}

/// Get the global config path (`~/.buildmatrix/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::profile::ToolchainEntry;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.libraries.is_empty());
        assert_eq!(config.matrix, ProfileTables::default());
        assert_eq!(config.build.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.build.build_type(), "Release");
        assert!(!config.build.thread_checks());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(CONFIG_FILE);

        std::fs::write(
            &config_path,
            r#"
[matrix]
abis_32 = ["x86"]
abis_64 = ["x86_64"]

[[matrix.full]]
version = "r23"
api_levels = [21, 24]

[[library]]
name = "swappy"

[[library]]
name = "paddleboat"
min_api_level = 24
supported_stls = ["c++_shared"]

[build]
chunk_size = 4
build_dir = "out"

[toolchain]
ndk_roots = ["sdk/ndk", "/opt/ndk"]
ninja = "ninja"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.matrix.abis_32, ["x86"]);
        assert_eq!(config.matrix.full, vec![ToolchainEntry::new("r23", vec![21, 24])]);
        assert_eq!(config.libraries.len(), 2);
        assert_eq!(config.libraries[1].min_api_level, Some(24));
        assert_eq!(config.build.chunk_size(), 4);
        assert_eq!(config.build.build_dir(), tmp.path().join("out"));
        assert_eq!(
            config.toolchain.ndk_roots,
            vec![tmp.path().join("sdk/ndk"), PathBuf::from("/opt/ndk")]
        );
        assert_eq!(config.toolchain.ninja, Some(PathBuf::from("ninja")));
    }

    #[test]
    fn test_build_config_merge() {
        let mut base = BuildConfig {
            chunk_size: Some(4),
            build_type: Some("Debug".to_string()),
            ..BuildConfig::default()
        };

        base.merge(BuildConfig {
            chunk_size: Some(16),
            thread_checks: Some(true),
            ..BuildConfig::default()
        });

        assert_eq!(base.chunk_size(), 16);
        assert_eq!(base.build_type(), "Debug"); // Not overridden
        assert!(base.thread_checks());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join(CONFIG_FILE);

        std::fs::write(
            &global_path,
            r#"
[build]
chunk_size = 2
max_workers = 6

[toolchain]
cmake = "/usr/bin/cmake"
ndk_roots = ["/opt/android/ndk"]
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[build]
chunk_size = 12

[toolchain]
cmake = "/opt/cmake/bin/cmake"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path).unwrap();

        assert_eq!(config.build.chunk_size(), 12);
        assert_eq!(config.build.max_workers, Some(6));
        assert_eq!(config.toolchain.cmake, Some(PathBuf::from("/opt/cmake/bin/cmake")));
        assert_eq!(
            config.toolchain.ndk_roots,
            vec![PathBuf::from("/opt/android/ndk")]
        );
    }

    #[test]
    fn test_load_config_missing_project_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(config.matrix, ProfileTables::default());
        assert!(config.libraries.is_empty());
    }

    #[test]
    fn test_load_config_rejects_invalid_tables() {
        let tmp = TempDir::new().unwrap();
        let project_path = tmp.path().join(CONFIG_FILE);
        std::fs::write(
            &project_path,
            r#"
[[matrix.full]]
version = "r21"
api_levels = [24, 21]
"#,
        )
        .unwrap();

        let err = load_config(None, &project_path).unwrap_err();
        assert!(format!("{:#}", err).contains("not strictly ascending"));
    }

    #[test]
    fn test_load_config_rejects_malformed_project() {
        let tmp = TempDir::new().unwrap();
        let project_path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&project_path, "[build\nchunk_size = ").unwrap();

        assert!(load_config(None, &project_path).is_err());
    }
}
