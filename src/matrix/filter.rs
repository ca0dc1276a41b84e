//! Library compatibility with a matrix cell.

use crate::core::cell::MatrixCell;
use crate::core::library::LibrarySpec;
use crate::core::options::BuildOptions;

/// Why a library was left out of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    ApiLevelTooLow { required: u32, actual: u32 },
    ToolchainTooOld { required: u32, actual: Option<u32> },
    UnsupportedStl,
}

/// Check a library against a cell, reporting the first constraint it fails.
///
/// A minimum toolchain version cannot be satisfied by a toolchain whose major
/// version is unknown.
pub fn check(
    lib: &LibrarySpec,
    cell: &MatrixCell,
    options: &BuildOptions,
) -> Result<(), Incompatibility> {
    if lib.is_unconstrained() {
        return Ok(());
    }

    let api_level = cell.toolchain.api_level;
    if let Some(required) = lib.min_api_level {
        if api_level < required {
            return Err(Incompatibility::ApiLevelTooLow {
                required,
                actual: api_level,
            });
        }
    }

    if let Some(required) = lib.min_toolchain_version {
        let actual = cell.toolchain.major_version();
        if actual.map_or(true, |major| major < required) {
            return Err(Incompatibility::ToolchainTooOld { required, actual });
        }
    }

    if let Some(ref stls) = lib.supported_stls {
        if !stls.contains(&options.stl) {
            return Err(Incompatibility::UnsupportedStl);
        }
    }

    Ok(())
}

/// Whether `lib` can be built for `cell` with `options`.
pub fn is_eligible(lib: &LibrarySpec, cell: &MatrixCell, options: &BuildOptions) -> bool {
    check(lib, cell, options).is_ok()
}

/// The subset of `libs` buildable for `cell`, in input order.
pub fn filter_libraries(
    libs: &[LibrarySpec],
    cell: &MatrixCell,
    options: &BuildOptions,
) -> Vec<LibrarySpec> {
    libs.iter()
        .filter(|lib| is_eligible(lib, cell, options))
        .cloned()
        .collect()
}
