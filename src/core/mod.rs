//! Core value types shared by enumeration, filtering and execution.

pub mod cell;
pub mod library;
pub mod options;
pub mod toolchain;

pub use cell::MatrixCell;
pub use library::LibrarySpec;
pub use options::{build_key, BuildOptions};
pub use toolchain::ToolchainDescriptor;
