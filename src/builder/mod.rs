//! Matrix execution.
//!
//! This module runs enumerated cells in parallel chunks and hands each one to a
//! [`BuildInvoker`].

pub mod cmake;
pub mod estimate;
pub mod events;
pub mod executor;
pub mod invoker;
pub mod progress;
pub mod toolchain;

pub use cmake::CMakeInvoker;
pub use estimate::DurationEstimator;
pub use events::MatrixEvent;
pub use executor::{run_chunked, ChunkedExecutor, ExecutorError};
pub use invoker::{BuildInvoker, BuildOutput, DryRunInvoker};
pub use progress::{BarProgress, JsonProgress, LogProgress, ProgressSink};
pub use toolchain::{ToolchainLocator, ToolchainPaths};
