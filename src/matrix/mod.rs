//! Build matrix enumeration and library compatibility.
//!
//! The matrix is the cross product of ABIs, STL variants and
//! (toolchain, API level) pairs selected by a [`ReleaseProfile`]. Each cell is
//! independent; [`filter_libraries`] narrows the requested libraries to those
//! a cell can build.

pub mod enumerate;
pub mod errors;
pub mod filter;
pub mod profile;

pub use enumerate::{check_unique_keys, enumerate};
pub use errors::MatrixError;
pub use filter::{filter_libraries, is_eligible, Incompatibility};
pub use profile::{ProfileTables, ReleaseProfile, ToolchainEntry};
