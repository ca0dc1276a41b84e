//! Configuration errors detected before any build is scheduled.

use miette::Diagnostic;
use thiserror::Error;

/// A matrix that cannot be enumerated or executed as configured.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum MatrixError {
    #[error("toolchain `{version}` is listed more than once")]
    #[diagnostic(
        code(buildmatrix::matrix::duplicate_toolchain),
        help("Merge the API levels into a single `[[matrix.*]]` entry")
    )]
    DuplicateToolchain { version: String },

    #[error("toolchain `{version}` has no major version number")]
    #[diagnostic(
        code(buildmatrix::matrix::unversioned_toolchain),
        help("Toolchain versions must contain a number, e.g. `r21` or `25.1`")
    )]
    UnversionedToolchain { version: String },

    #[error("toolchain `{version}` lists no API levels")]
    #[diagnostic(code(buildmatrix::matrix::no_api_levels))]
    NoApiLevels { version: String },

    #[error("API levels for toolchain `{version}` are not strictly ascending: {levels:?}")]
    #[diagnostic(
        code(buildmatrix::matrix::unsorted_api_levels),
        help("List each API level once, lowest first")
    )]
    UnsortedApiLevels { version: String, levels: Vec<u32> },

    #[error("ABI `{abi}` appears in both the 32-bit and 64-bit sets")]
    #[diagnostic(code(buildmatrix::matrix::ambiguous_abi))]
    AmbiguousAbi { abi: String },

    #[error("cells `{first}` and `{second}` both map to build key `{key}`")]
    #[diagnostic(
        code(buildmatrix::matrix::duplicate_build_key),
        help("Two toolchain versions with the same major number cannot share an API level")
    )]
    DuplicateBuildKey {
        key: String,
        first: String,
        second: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MatrixError::UnsortedApiLevels {
            version: "r21".to_string(),
            levels: vec![21, 19],
        };
        assert_eq!(
            err.to_string(),
            "API levels for toolchain `r21` are not strictly ascending: [21, 19]"
        );

        let err = MatrixError::DuplicateBuildKey {
            key: "x86_API21_NDK21_cpp_shared_Release".to_string(),
            first: "x86 c++_shared NDK r21 (API 21)".to_string(),
            second: "x86 c++_shared NDK r21e (API 21)".to_string(),
        };
        assert!(err.to_string().contains("x86_API21_NDK21_cpp_shared_Release"));
        assert!(err.help().is_some());
    }
}
