//! buildmatrix - cross-compile native libraries across an ABI/STL/NDK matrix
//!
//! This crate enumerates the build matrix for a release profile, selects the
//! libraries each cell can build, and runs the cells in bounded parallel
//! chunks with fail-fast error handling and a remaining-time estimate.

pub mod builder;
pub mod core;
pub mod matrix;
pub mod ops;
pub mod util;

/// Test doubles for buildmatrix unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{run_chunked, BuildInvoker, ChunkedExecutor};
pub use crate::core::{build_key, BuildOptions, LibrarySpec, MatrixCell, ToolchainDescriptor};
pub use crate::matrix::{enumerate, filter_libraries, is_eligible, ProfileTables, ReleaseProfile};
