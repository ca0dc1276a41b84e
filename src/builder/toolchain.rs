//! Locating installed toolchains.
//!
//! NDK installations are searched under each configured root as
//! `android-ndk-<version>` or `<version>`, optionally followed by a
//! `-<suffix>` for extra copies of the same release. Plain `r<major>`
//! versions also match side-by-side SDK installs such as
//! `ndk/21.4.7075529`. Only directories that contain the CMake toolchain
//! file count. When several copies match, the lexicographically last path
//! wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::Pattern;

use crate::core::toolchain::major_version_of;
use crate::util::config::ToolchainSettings;
use crate::util::process::find_executable;

/// CMake toolchain file, relative to the NDK root.
pub const TOOLCHAIN_FILE: &str = "build/cmake/android.toolchain.cmake";

/// Resolved tool locations for one toolchain version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPaths {
    pub version: String,
    pub ndk: PathBuf,
    pub cmake: PathBuf,
    pub ninja: PathBuf,
    pub protobuf: Option<PathBuf>,
}

impl ToolchainPaths {
    pub fn toolchain_file(&self) -> PathBuf {
        self.ndk.join(TOOLCHAIN_FILE)
    }
}

/// Finds NDK installations and build tools.
#[derive(Debug, Clone, Default)]
pub struct ToolchainLocator {
    roots: Vec<PathBuf>,
    cmake: Option<PathBuf>,
    ninja: Option<PathBuf>,
    protobuf: Option<PathBuf>,
}

impl ToolchainLocator {
    /// Create a locator searching `roots`, in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        ToolchainLocator {
            roots,
            ..ToolchainLocator::default()
        }
    }

    /// Create a locator from configuration. Without configured roots, the
    /// `ANDROID_HOME`/`ANDROID_SDK_ROOT`/`ANDROID_NDK_HOME` environment
    /// variables are used.
    pub fn from_settings(settings: &ToolchainSettings) -> Self {
        let roots = if settings.ndk_roots.is_empty() {
            env_roots()
        } else {
            settings.ndk_roots.clone()
        };

        ToolchainLocator {
            roots,
            cmake: settings.cmake.clone(),
            ninja: settings.ninja.clone(),
            protobuf: settings.protobuf.clone(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Find the NDK installation for `version`.
    pub fn find_ndk(&self, version: &str) -> Result<PathBuf> {
        let mut candidates = Vec::new();
        for root in &self.roots {
            candidates.extend(candidates_in(root, version)?);
        }
        candidates.sort();
        candidates.dedup();

        if candidates.len() > 1 {
            tracing::debug!(
                "{} installations match NDK {}: {:?}",
                candidates.len(),
                version,
                candidates
            );
        }

        match candidates.pop() {
            Some(ndk) => Ok(ndk),
            None => bail!(
                "NDK {} not found\n\
                 \n\
                 Searched: {}\n\
                 Install it or add its parent directory to `[toolchain] ndk_roots`.",
                version,
                display_roots(&self.roots)
            ),
        }
    }

    /// Resolve NDK and build tools for one toolchain version.
    pub fn resolve(&self, version: &str) -> Result<ToolchainPaths> {
        Ok(ToolchainPaths {
            version: version.to_string(),
            ndk: self.find_ndk(version)?,
            cmake: self.cmake()?,
            ninja: self.ninja()?,
            protobuf: self.protobuf.clone(),
        })
    }

    /// Resolve every distinct version up front, failing on the first missing
    /// installation.
    pub fn resolve_all<'a, I>(&self, versions: I) -> Result<BTreeMap<String, ToolchainPaths>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolved = BTreeMap::new();
        for version in versions {
            if !resolved.contains_key(version) {
                let paths = self.resolve(version)?;
                tracing::debug!("NDK {} -> {}", version, paths.ndk.display());
                resolved.insert(version.to_string(), paths);
            }
        }
        Ok(resolved)
    }

    pub fn cmake(&self) -> Result<PathBuf> {
        self.tool("cmake", self.cmake.as_deref())
    }

    pub fn ninja(&self) -> Result<PathBuf> {
        self.tool("ninja", self.ninja.as_deref())
    }

    fn tool(&self, name: &str, configured: Option<&Path>) -> Result<PathBuf> {
        match configured {
            Some(path) if path.components().count() > 1 => Ok(path.to_path_buf()),
            Some(path) => find_executable(&path.to_string_lossy())
                .with_context(|| format!("{} not found in PATH", path.display())),
            None => find_executable(name).with_context(|| {
                format!(
                    "{} not found\n\
                     \n\
                     Install {} or set `[toolchain] {}` in the config.",
                    name, name, name
                )
            }),
        }
    }
}

fn candidates_in(root: &Path, version: &str) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&root.to_string_lossy());
    let name = Pattern::escape(version);

    // Exact release names, plus `-<suffix>` copies of the same release.
    let mut patterns = vec![
        format!("{}/android-ndk-{}", base, name),
        format!("{}/android-ndk-{}-*", base, name),
        format!("{}/{}", base, name),
        format!("{}/{}-*", base, name),
    ];
    if let Some(major) = side_by_side_major(version) {
        patterns.push(format!("{}/{}.*", base, major));
    }

    let mut found = Vec::new();
    for pattern in patterns {
        let entries =
            glob::glob(&pattern).with_context(|| format!("invalid search pattern: {}", pattern))?;
        found.extend(
            entries
                .filter_map(|entry| entry.ok())
                .filter(|path| path.join(TOOLCHAIN_FILE).is_file()),
        );
    }
    Ok(found)
}

/// Major version to search side-by-side installs (`<major>.<minor>.<build>`)
/// with. Only plain `r<major>` or `<major>` names qualify; a lettered release
/// such as `r21e` names one specific revision.
fn side_by_side_major(version: &str) -> Option<u32> {
    let digits = version.strip_prefix('r').unwrap_or(version);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        major_version_of(digits)
    } else {
        None
    }
}

fn env_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for var in ["ANDROID_HOME", "ANDROID_SDK_ROOT"] {
        if let Some(sdk) = std::env::var_os(var) {
            roots.push(PathBuf::from(sdk).join("ndk"));
        }
    }
    if let Some(ndk) = std::env::var_os("ANDROID_NDK_HOME") {
        if let Some(parent) = Path::new(&ndk).parent() {
            roots.push(parent.to_path_buf());
        }
    }
    roots
}

fn display_roots(roots: &[PathBuf]) -> String {
    if roots.is_empty() {
        "(no NDK roots configured)".to_string()
    } else {
        roots
            .iter()
            .map(|r| r.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
