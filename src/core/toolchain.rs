//! Toolchain identity for a single matrix cell.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One concrete compiler/platform toolchain: a platform API level paired with
/// a toolchain (NDK) release identifier such as `r21` or `r23b`.
///
/// Two descriptors are distinct whenever either field differs, even if both
/// versions share the same major number (`r21` and `r21e`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToolchainDescriptor {
    /// Platform API level the artifacts are compiled against.
    pub api_level: u32,
    /// Toolchain release identifier, as written in the matrix tables.
    pub version: String,
}

impl ToolchainDescriptor {
    /// Create a new descriptor.
    pub fn new(api_level: u32, version: impl Into<String>) -> Self {
        ToolchainDescriptor {
            api_level,
            version: version.into(),
        }
    }

    /// Major version number of the toolchain.
    ///
    /// Returns `None` when the identifier carries no digits.
    pub fn major_version(&self) -> Option<u32> {
        major_version_of(&self.version)
    }

    /// Major version rendered for keys and compiler flags; `UNKNOWN` when the
    /// identifier has no leading number.
    pub fn major_version_label(&self) -> String {
        match self.major_version() {
            Some(major) => major.to_string(),
            None => "UNKNOWN".to_string(),
        }
    }
}

impl fmt::Display for ToolchainDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NDK {} (API {})", self.version, self.api_level)
    }
}

/// Extract the first run of ASCII digits from a toolchain identifier.
///
/// `r21` -> 21, `r23b` -> 23, `25.1.8937393` -> 25.
pub fn major_version_of(version: &str) -> Option<u32> {
    let digits: String = version
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}
