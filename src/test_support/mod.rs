//! Test doubles for the executor and build invoker.
//!
//! # Example
//!
//! ```rust,ignore
//! use buildmatrix::test_support::{RecordingInvoker, RecordingProgress};
//!
//! #[test]
//! fn test_example() {
//!     let invoker = Arc::new(RecordingInvoker::new().fail_on("x86_API21_NDK23_cpp_static_Release"));
//!     let progress = Arc::new(RecordingProgress::new());
//!
//!     // Run a plan against the mocks, then inspect invoker.calls()...
//! }
//! ```

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::builder::invoker::{BuildInvoker, BuildOutput};
use crate::builder::progress::{ChunkReport, ChunkStart, ProgressSink};
use crate::core::library::LibrarySpec;
use crate::core::options::BuildOptions;
use crate::core::toolchain::ToolchainDescriptor;

/// One progress callback, without timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressRecord {
    Started {
        index: usize,
        count: usize,
        cells: usize,
        has_eta: bool,
    },
    Finished {
        index: usize,
        count: usize,
    },
}

/// Progress sink that remembers every callback.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    records: Mutex<Vec<ProgressRecord>>,
    last_remaining: Mutex<Option<Duration>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        RecordingProgress::default()
    }

    pub fn records(&self) -> Vec<ProgressRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Remaining-time estimate of the last finished chunk.
    pub fn last_remaining(&self) -> Option<Duration> {
        *self.last_remaining.lock().unwrap()
    }
}

impl ProgressSink for RecordingProgress {
    fn chunk_started(&self, start: &ChunkStart<'_>) {
        self.records.lock().unwrap().push(ProgressRecord::Started {
            index: start.index,
            count: start.count,
            cells: start.cells,
            has_eta: start.estimated_remaining.is_some(),
        });
    }

    fn chunk_finished(&self, report: &ChunkReport<'_>) {
        self.records.lock().unwrap().push(ProgressRecord::Finished {
            index: report.index,
            count: report.count,
        });
        *self.last_remaining.lock().unwrap() = Some(report.estimated_remaining);
    }
}

/// A recorded call to [`RecordingInvoker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerCall {
    pub key: String,
    pub libraries: Vec<String>,
}

/// Build invoker that records calls and fails on chosen build keys.
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<InvokerCall>>,
    failing: BTreeSet<String>,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        RecordingInvoker::default()
    }

    /// Fail every invocation for the cell with this build key.
    pub fn fail_on(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    /// Calls in the order they were received.
    pub fn calls(&self) -> Vec<InvokerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Build keys of all calls, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.calls().into_iter().map(|c| c.key).collect();
        keys.sort();
        keys
    }
}

impl BuildInvoker for RecordingInvoker {
    fn invoke(
        &self,
        toolchain: &ToolchainDescriptor,
        options: &BuildOptions,
        libraries: &[LibrarySpec],
    ) -> Result<BuildOutput> {
        let output = BuildOutput::new(toolchain, options, libraries);
        self.calls.lock().unwrap().push(InvokerCall {
            key: output.key.clone(),
            libraries: output.libraries.clone(),
        });

        if self.failing.contains(&output.key) {
            bail!("mock build failed for {}", output.key);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_invoker_fails_on_key() {
        let invoker = RecordingInvoker::new().fail_on("x86_API21_NDK23_cpp_static_Release");
        let toolchain = ToolchainDescriptor::new(21, "r23");

        let ok = BuildOptions::new("Release", false, "c++_shared", "x86");
        assert!(invoker.invoke(&toolchain, &ok, &[]).is_ok());

        let bad = BuildOptions::new("Release", false, "c++_static", "x86");
        let err = invoker.invoke(&toolchain, &bad, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "mock build failed for x86_API21_NDK23_cpp_static_Release"
        );
        assert_eq!(invoker.calls().len(), 2);
    }
}
