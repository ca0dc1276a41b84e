//! Compilable library declarations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A native library the matrix can build, with optional constraints on the
/// cells it is compatible with. An unset constraint never rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySpec {
    /// CMake target name of the library.
    pub name: String,

    /// Lowest platform API level the library compiles against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_api_level: Option<u32>,

    /// Lowest toolchain major version the library compiles with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_toolchain_version: Option<u32>,

    /// STL variants the library supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_stls: Option<BTreeSet<String>>,
}

impl LibrarySpec {
    /// Create an unconstrained library.
    pub fn new(name: impl Into<String>) -> Self {
        LibrarySpec {
            name: name.into(),
            min_api_level: None,
            min_toolchain_version: None,
            supported_stls: None,
        }
    }

    /// Require at least this platform API level.
    pub fn with_min_api_level(mut self, level: u32) -> Self {
        self.min_api_level = Some(level);
        self
    }

    /// Require at least this toolchain major version.
    pub fn with_min_toolchain_version(mut self, major: u32) -> Self {
        self.min_toolchain_version = Some(major);
        self
    }

    /// Restrict the library to the given STL variants.
    pub fn with_supported_stls<I, S>(mut self, stls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_stls = Some(stls.into_iter().map(Into::into).collect());
        self
    }

    /// Whether no constraint is set on any axis.
    pub fn is_unconstrained(&self) -> bool {
        self.min_api_level.is_none()
            && self.min_toolchain_version.is_none()
            && self.supported_stls.is_none()
    }
}

impl fmt::Display for LibrarySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Join library names the way CMake list variables expect.
pub fn cmake_list(libraries: &[LibrarySpec]) -> String {
    libraries
        .iter()
        .map(|lib| lib.name.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_toml() {
        let lib: LibrarySpec = toml::from_str(
            r#"
name = "oboe"
min_api_level = 16
supported_stls = ["c++_static", "c++_shared"]
"#,
        )
        .unwrap();

        assert_eq!(lib.name, "oboe");
        assert_eq!(lib.min_api_level, Some(16));
        assert_eq!(lib.min_toolchain_version, None);
        assert!(lib.supported_stls.unwrap().contains("c++_shared"));
    }

    #[test]
    fn test_builder_and_unconstrained() {
        assert!(LibrarySpec::new("swappy").is_unconstrained());

        let lib = LibrarySpec::new("tuningfork")
            .with_min_api_level(16)
            .with_min_toolchain_version(20);
        assert!(!lib.is_unconstrained());
        assert_eq!(lib.min_toolchain_version, Some(20));
    }

    #[test]
    fn test_cmake_list() {
        let libs = vec![LibrarySpec::new("swappy"), LibrarySpec::new("oboe")];
        assert_eq!(cmake_list(&libs), "swappy;oboe");
        assert_eq!(cmake_list(&[]), "");
    }
}
