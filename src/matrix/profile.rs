//! Release profiles and the static tables they select from.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::toolchain::major_version_of;
use crate::matrix::errors::MatrixError;

/// Lowest API level at which packaged 64-bit libraries are resolved.
pub const PACKAGED_MIN_API_64: u32 = 21;

/// Which slice of the matrix to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReleaseProfile {
    /// Every ABI, every STL, every toolchain.
    #[default]
    Full,
    /// Only what ships in a packaged archive: shared STL, 64-bit ABIs at
    /// API 21 and above.
    Packaged,
    /// Full axes over the reduced toolchain table.
    Reduced,
    /// Packaged axes over the reduced toolchain table: shared STLs only and
    /// 64-bit ABIs from `packaged_min_api_64`. Older release scripts built this
    /// profile with every STL and no 64-bit restriction.
    ReducedPackaged,
}

impl ReleaseProfile {
    /// All profiles, in declaration order.
    pub const ALL: [ReleaseProfile; 4] = [
        ReleaseProfile::Full,
        ReleaseProfile::Packaged,
        ReleaseProfile::Reduced,
        ReleaseProfile::ReducedPackaged,
    ];

    pub fn is_packaged(self) -> bool {
        matches!(self, ReleaseProfile::Packaged | ReleaseProfile::ReducedPackaged)
    }

    pub fn is_reduced(self) -> bool {
        matches!(self, ReleaseProfile::Reduced | ReleaseProfile::ReducedPackaged)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseProfile::Full => "full",
            ReleaseProfile::Packaged => "packaged",
            ReleaseProfile::Reduced => "reduced",
            ReleaseProfile::ReducedPackaged => "reduced-packaged",
        }
    }
}

impl fmt::Display for ReleaseProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "all" => Ok(ReleaseProfile::Full),
            "packaged" | "aar" => Ok(ReleaseProfile::Packaged),
            "reduced" | "express" => Ok(ReleaseProfile::Reduced),
            "reduced-packaged" | "express-aar" => Ok(ReleaseProfile::ReducedPackaged),
            _ => Err(format!(
                "invalid profile '{}'; expected 'full', 'packaged', 'reduced', or 'reduced-packaged'",
                s
            )),
        }
    }
}

/// API levels supported by one toolchain release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainEntry {
    pub version: String,
    pub api_levels: Vec<u32>,
}

impl ToolchainEntry {
    pub fn new(version: impl Into<String>, api_levels: impl Into<Vec<u32>>) -> Self {
        ToolchainEntry {
            version: version.into(),
            api_levels: api_levels.into(),
        }
    }
}

/// The static data every profile enumerates over.
///
/// Toolchain entries keep their listed order; that order is part of the
/// enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTables {
    pub abis_32: Vec<String>,
    pub abis_64: Vec<String>,
    pub stls: Vec<String>,
    /// STLs shipped in packaged archives (static linking never is).
    pub packaged_stls: Vec<String>,
    pub packaged_min_api_64: u32,
    pub full: Vec<ToolchainEntry>,
    pub reduced: Vec<ToolchainEntry>,
}

impl Default for ProfileTables {
    fn default() -> Self {
        let legacy = vec![19, 21, 22, 23, 24, 26, 27, 28];
        let r21 = vec![19, 21, 22, 23, 24, 26, 27, 28, 29];
        let r23 = vec![19, 21, 22, 23, 24, 26, 27, 28, 29, 30, 31];

        ProfileTables {
            abis_32: strings(&["armeabi-v7a", "x86"]),
            abis_64: strings(&["arm64-v8a", "x86_64"]),
            stls: strings(&["c++_static", "c++_shared"]),
            packaged_stls: strings(&["c++_shared"]),
            packaged_min_api_64: PACKAGED_MIN_API_64,
            full: vec![
                ToolchainEntry::new("r17", legacy.clone()),
                ToolchainEntry::new("r18", legacy.clone()),
                ToolchainEntry::new("r19", legacy.clone()),
                ToolchainEntry::new("r20", legacy),
                ToolchainEntry::new("r21", r21),
                ToolchainEntry::new("r23", r23.clone()),
            ],
            reduced: vec![ToolchainEntry::new("r23", r23)],
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl ProfileTables {
    /// Tables with no ABIs, STLs or toolchains.
    pub fn empty() -> Self {
        ProfileTables {
            abis_32: Vec::new(),
            abis_64: Vec::new(),
            stls: Vec::new(),
            packaged_stls: Vec::new(),
            packaged_min_api_64: PACKAGED_MIN_API_64,
            full: Vec::new(),
            reduced: Vec::new(),
        }
    }

    /// 32-bit ABIs followed by 64-bit ABIs.
    pub fn all_abis(&self) -> impl Iterator<Item = &String> {
        self.abis_32.iter().chain(self.abis_64.iter())
    }

    pub fn is_64_bit(&self, abi: &str) -> bool {
        self.abis_64.iter().any(|a| a == abi)
    }

    /// The STL set a profile builds.
    pub fn stls_for(&self, profile: ReleaseProfile) -> &[String] {
        if profile.is_packaged() {
            &self.packaged_stls
        } else {
            &self.stls
        }
    }

    /// The toolchain table a profile builds.
    pub fn toolchains_for(&self, profile: ReleaseProfile) -> &[ToolchainEntry] {
        if profile.is_reduced() {
            &self.reduced
        } else {
            &self.full
        }
    }

    /// Check the tables are usable before enumerating.
    pub fn validate(&self) -> Result<(), MatrixError> {
        for abi in &self.abis_32 {
            if self.is_64_bit(abi) {
                return Err(MatrixError::AmbiguousAbi { abi: abi.clone() });
            }
        }

        validate_toolchains(&self.full)?;
        validate_toolchains(&self.reduced)
    }
}

fn validate_toolchains(entries: &[ToolchainEntry]) -> Result<(), MatrixError> {
    let mut seen = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.version.as_str()) {
            return Err(MatrixError::DuplicateToolchain {
                version: entry.version.clone(),
            });
        }

        if major_version_of(&entry.version).is_none() {
            return Err(MatrixError::UnversionedToolchain {
                version: entry.version.clone(),
            });
        }

        if entry.api_levels.is_empty() {
            return Err(MatrixError::NoApiLevels {
                version: entry.version.clone(),
            });
        }

        if entry.api_levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MatrixError::UnsortedApiLevels {
                version: entry.version.clone(),
                levels: entry.api_levels.clone(),
            });
        }
    }

    Ok(())
}
