//! Matrix event types for JSON output.
//!
//! These events are emitted one per line with `--message-format=json`.
//!
//! # Event Types
//!
//! - `matrix-started`: A run was scheduled
//! - `chunk-started`: A chunk of cells was dispatched
//! - `chunk-finished`: A chunk completed, with the remaining-time estimate
//! - `cell-skipped`: A cell had no compatible libraries
//! - `matrix-finished`: The run completed (success or failure)

use serde::Serialize;

/// A matrix event emitted during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum MatrixEvent {
    #[serde(rename = "matrix-started")]
    MatrixStarted {
        /// Release profile name
        profile: String,
        /// Number of cells that will be built
        jobs: u64,
        /// Number of cells with nothing to build
        skipped: u64,
        chunk_size: u64,
    },

    #[serde(rename = "chunk-started")]
    ChunkStarted {
        label: String,
        /// 1-based chunk number
        chunk: u64,
        chunks: u64,
        cells: u64,
        /// Absent until the first chunk has finished
        #[serde(skip_serializing_if = "Option::is_none")]
        eta_ms: Option<u64>,
    },

    #[serde(rename = "chunk-finished")]
    ChunkFinished {
        label: String,
        chunk: u64,
        chunks: u64,
        duration_ms: u64,
        eta_ms: u64,
    },

    #[serde(rename = "cell-skipped")]
    CellSkipped {
        /// Build key of the skipped cell
        key: String,
    },

    #[serde(rename = "matrix-finished")]
    MatrixFinished {
        success: bool,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        built: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl MatrixEvent {
    /// Create a successful matrix finished event.
    pub fn finished(duration_ms: u64, built: u64) -> Self {
        MatrixEvent::MatrixFinished {
            success: true,
            duration_ms,
            built: Some(built),
            error: None,
        }
    }

    /// Create a failed matrix finished event.
    pub fn failed(duration_ms: u64, error: impl Into<String>) -> Self {
        MatrixEvent::MatrixFinished {
            success: false,
            duration_ms,
            built: None,
            error: Some(error.into()),
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_started_omits_missing_eta() {
        let event = MatrixEvent::ChunkStarted {
            label: "release".to_string(),
            chunk: 1,
            chunks: 4,
            cells: 8,
            eta_ms: None,
        };
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"chunk-started\""));
        assert!(json.contains("\"chunk\":1"));
        assert!(!json.contains("eta_ms"));
    }

    #[test]
    fn test_chunk_finished_serialization() {
        let event = MatrixEvent::ChunkFinished {
            label: "release".to_string(),
            chunk: 2,
            chunks: 4,
            duration_ms: 1200,
            eta_ms: 2160,
        };
        let json = event.to_json();
        assert!(json.contains("\"reason\":\"chunk-finished\""));
        assert!(json.contains("\"eta_ms\":2160"));
    }

    #[test]
    fn test_finished_events() {
        let json = MatrixEvent::finished(2340, 12).to_json();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"built\":12"));
        assert!(!json.contains("error"));

        let json = MatrixEvent::failed(10, "ninja exited with status 1").to_json();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("ninja exited with status 1"));
    }
}
