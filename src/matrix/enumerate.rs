//! Deterministic enumeration of matrix cells.

use std::collections::HashMap;

use crate::core::cell::MatrixCell;
use crate::core::options::BuildOptions;
use crate::core::toolchain::ToolchainDescriptor;
use crate::matrix::errors::MatrixError;
use crate::matrix::profile::{ProfileTables, ReleaseProfile, ToolchainEntry};

/// Enumerate every cell `profile` builds.
///
/// Order is ABI-major (32-bit ABIs, then 64-bit), then STL, then toolchain in
/// table order, then API level ascending. Packaged profiles pair 64-bit ABIs
/// only with API levels at or above `packaged_min_api_64`.
///
/// The tables are validated first; an empty toolchain table yields an empty
/// matrix.
pub fn enumerate(
    tables: &ProfileTables,
    profile: ReleaseProfile,
) -> Result<Vec<MatrixCell>, MatrixError> {
    tables.validate()?;

    let toolchains = tables.toolchains_for(profile);
    let stls = tables.stls_for(profile);

    let mut cells = Vec::new();
    for abi in tables.all_abis() {
        let min_api = if profile.is_packaged() && tables.is_64_bit(abi) {
            tables.packaged_min_api_64
        } else {
            0
        };

        for stl in stls {
            enumerate_toolchains(abi, stl, toolchains, min_api, &mut cells);
        }
    }

    tracing::debug!("{} profile: {} cell(s)", profile, cells.len());

    Ok(cells)
}

fn enumerate_toolchains(
    abi: &str,
    stl: &str,
    toolchains: &[ToolchainEntry],
    min_api: u32,
    cells: &mut Vec<MatrixCell>,
) {
    for entry in toolchains {
        for &level in entry.api_levels.iter().filter(|&&level| level >= min_api) {
            cells.push(MatrixCell::new(
                abi,
                stl,
                ToolchainDescriptor::new(level, entry.version.clone()),
            ));
        }
    }
}

/// Check that no two cells share a build key, which would make them write to
/// the same output location.
pub fn check_unique_keys<'a, I>(cells: I) -> Result<(), MatrixError>
where
    I: IntoIterator<Item = (&'a MatrixCell, &'a BuildOptions)>,
{
    let mut seen: HashMap<String, &MatrixCell> = HashMap::new();

    for (cell, options) in cells {
        let key = options.build_key(&cell.toolchain);
        if let Some(first) = seen.get(&key) {
            return Err(MatrixError::DuplicateBuildKey {
                key,
                first: first.to_string(),
                second: cell.to_string(),
            });
        }
        seen.insert(key, cell);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tables() -> ProfileTables {
        let mut tables = ProfileTables::empty();
        tables.abis_32 = vec!["x86".to_string()];
        tables.abis_64 = vec!["x86_64".to_string()];
        tables.stls = vec!["c++_static".to_string(), "c++_shared".to_string()];
        tables.packaged_stls = vec!["c++_shared".to_string()];
        tables.full = vec![
            ToolchainEntry::new("r20", vec![19, 21]),
            ToolchainEntry::new("r23", vec![19, 21, 24]),
        ];
        tables.reduced = vec![ToolchainEntry::new("r23", vec![19, 24])];
        tables
    }

    fn total_levels(entries: &[ToolchainEntry]) -> usize {
        entries.iter().map(|e| e.api_levels.len()).sum()
    }

    #[test]
    fn test_full_profile_is_complete_cross_product() {
        let tables = ProfileTables::default();
        let cells = enumerate(&tables, ReleaseProfile::Full).unwrap();

        let expected = tables.all_abis().count() * tables.stls.len() * total_levels(&tables.full);
        assert_eq!(cells.len(), expected);
        assert_eq!(cells.len(), 4 * 2 * 52);
    }

    #[test]
    fn test_ordering_is_abi_stl_toolchain_level() {
        let cells = enumerate(&small_tables(), ReleaseProfile::Full).unwrap();
        let rendered: Vec<String> = cells
            .iter()
            .take(6)
            .map(|c| format!("{}/{}/{}/{}", c.abi, c.stl, c.toolchain.version, c.toolchain.api_level))
            .collect();

        assert_eq!(
            rendered,
            [
                "x86/c++_static/r20/19",
                "x86/c++_static/r20/21",
                "x86/c++_static/r23/19",
                "x86/c++_static/r23/21",
                "x86/c++_static/r23/24",
                "x86/c++_shared/r20/19",
            ]
        );
        assert_eq!(cells.len(), 2 * 2 * 5);
        assert_eq!(cells.last().unwrap().abi, "x86_64");
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let tables = ProfileTables::default();
        for profile in ReleaseProfile::ALL {
            assert_eq!(
                enumerate(&tables, profile).unwrap(),
                enumerate(&tables, profile).unwrap()
            );
        }
    }

    #[test]
    fn test_packaged_restricts_64_bit_levels() {
        let tables = ProfileTables::default();
        let cells = enumerate(&tables, ReleaseProfile::Packaged).unwrap();

        assert!(cells.iter().all(|c| c.stl == "c++_shared"));
        assert!(cells
            .iter()
            .filter(|c| tables.is_64_bit(&c.abi))
            .all(|c| c.toolchain.api_level >= 21));
        // 32-bit ABIs keep API 19.
        assert!(cells
            .iter()
            .any(|c| c.abi == "x86" && c.toolchain.api_level == 19));

        // 6 toolchains each list API 19 once: only 64-bit cells lose it.
        let per_abi_32 = total_levels(&tables.full);
        let per_abi_64 = per_abi_32 - 6;
        assert_eq!(cells.len(), 2 * per_abi_32 + 2 * per_abi_64);
    }

    #[test]
    fn test_reduced_packaged_uses_reduced_table_with_restriction() {
        let cells = enumerate(&small_tables(), ReleaseProfile::ReducedPackaged).unwrap();
        let rendered: Vec<String> = cells
            .iter()
            .map(|c| format!("{}/{}", c.abi, c.toolchain.api_level))
            .collect();

        assert_eq!(rendered, ["x86/19", "x86/24", "x86_64/24"]);
    }

    #[test]
    fn test_abi_without_levels_contributes_nothing() {
        let mut tables = small_tables();
        tables.full = vec![ToolchainEntry::new("r19", vec![16, 19])];

        let cells = enumerate(&tables, ReleaseProfile::Packaged).unwrap();
        assert!(cells.iter().all(|c| c.abi == "x86"));
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn test_empty_toolchain_table_yields_empty_matrix() {
        let mut tables = small_tables();
        tables.full.clear();

        assert!(enumerate(&tables, ReleaseProfile::Full).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_tables_fail_before_enumeration() {
        let mut tables = small_tables();
        tables.reduced = vec![ToolchainEntry::new("r23", vec![24, 19])];

        assert!(enumerate(&tables, ReleaseProfile::Full).is_err());
    }

    #[test]
    fn test_keys_unique_across_default_matrix() {
        let tables = ProfileTables::default();
        let cells = enumerate(&tables, ReleaseProfile::Full).unwrap();
        let options: Vec<BuildOptions> = cells.iter().map(|c| c.options("Release", false)).collect();

        assert!(check_unique_keys(cells.iter().zip(options.iter())).is_ok());
    }

    #[test]
    fn test_key_collision_detected() {
        let mut tables = small_tables();
        tables.full = vec![
            ToolchainEntry::new("r21", vec![21]),
            ToolchainEntry::new("r21e", vec![21]),
        ];
        let cells = enumerate(&tables, ReleaseProfile::Full).unwrap();
        let options: Vec<BuildOptions> = cells.iter().map(|c| c.options("Release", false)).collect();

        let err = check_unique_keys(cells.iter().zip(options.iter())).unwrap_err();
        assert!(matches!(err, MatrixError::DuplicateBuildKey { ref key, .. } if key == "x86_API21_NDK21_cpp_static_Release"));
    }
}
