//! Progress reporting for chunked runs.
//!
//! The executor reports through a [`ProgressSink`] between chunks, always from
//! the orchestrating thread. Sinks are observational only.

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::estimate::format_duration;
use crate::builder::events::MatrixEvent;

/// A chunk about to be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkStart<'a> {
    pub label: &'a str,
    /// 0-based chunk index.
    pub index: usize,
    pub count: usize,
    /// Cells in this chunk.
    pub cells: usize,
    /// `None` until at least one chunk has finished.
    pub estimated_remaining: Option<Duration>,
}

/// A chunk that completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkReport<'a> {
    pub label: &'a str,
    /// 0-based chunk index.
    pub index: usize,
    pub count: usize,
    pub elapsed: Duration,
    /// Remaining chunks times the smoothed chunk duration.
    pub estimated_remaining: Duration,
}

/// Receives chunk progress from the executor.
pub trait ProgressSink: Send + Sync {
    fn chunk_started(&self, _start: &ChunkStart<'_>) {}

    fn chunk_finished(&self, report: &ChunkReport<'_>);
}

/// Reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn chunk_started(&self, start: &ChunkStart<'_>) {
        match start.estimated_remaining {
            Some(eta) => tracing::info!(
                "{} {}/{}: {} cell(s), est. time left {}",
                start.label,
                start.index + 1,
                start.count,
                start.cells,
                format_duration(eta)
            ),
            None => tracing::info!(
                "{} {}/{}: {} cell(s)",
                start.label,
                start.index + 1,
                start.count,
                start.cells
            ),
        }
    }

    fn chunk_finished(&self, report: &ChunkReport<'_>) {
        tracing::info!(
            "{} {}/{} took {}, est. time left {}",
            report.label,
            report.index + 1,
            report.count,
            format_duration(report.elapsed),
            format_duration(report.estimated_remaining)
        );
    }
}

/// Draws a progress bar over chunks.
#[derive(Debug, Default)]
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        BarProgress::default()
    }

    fn with_bar(&self, count: usize, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };

        let bar = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new(count as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });
        f(bar);
    }
}

impl ProgressSink for BarProgress {
    fn chunk_started(&self, start: &ChunkStart<'_>) {
        self.with_bar(start.count, |pb| {
            let msg = match start.estimated_remaining {
                Some(eta) => format!("{} (~{} left)", start.label, format_duration(eta)),
                None => start.label.to_string(),
            };
            pb.set_message(msg);
        });
    }

    fn chunk_finished(&self, report: &ChunkReport<'_>) {
        self.with_bar(report.count, |pb| {
            pb.inc(1);
            if report.index + 1 == report.count {
                pb.finish_with_message(format!("{} done", report.label));
            }
        });
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                if !pb.is_finished() {
                    pb.abandon();
                }
            }
        }
    }
}

/// Writes one JSON [`MatrixEvent`] per line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonProgress;

impl JsonProgress {
    pub fn emit(&self, event: &MatrixEvent) {
        if let Err(e) = write_event(&mut io::stdout().lock(), event) {
            tracing::debug!("failed to write JSON event: {}", e);
        }
    }
}

fn write_event(out: &mut impl Write, event: &MatrixEvent) -> io::Result<()> {
    writeln!(out, "{}", event.to_json())?;
    out.flush()
}

impl ProgressSink for JsonProgress {
    fn chunk_started(&self, start: &ChunkStart<'_>) {
        self.emit(&MatrixEvent::ChunkStarted {
            label: start.label.to_string(),
            chunk: start.index as u64 + 1,
            chunks: start.count as u64,
            cells: start.cells as u64,
            eta_ms: start.estimated_remaining.map(|d| d.as_millis() as u64),
        });
    }

    fn chunk_finished(&self, report: &ChunkReport<'_>) {
        self.emit(&MatrixEvent::ChunkFinished {
            label: report.label.to_string(),
            chunk: report.index as u64 + 1,
            chunks: report.count as u64,
            duration_ms: report.elapsed.as_millis() as u64,
            eta_ms: report.estimated_remaining.as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_progress_counts_chunks() {
        let sink = BarProgress::new();
        let start = ChunkStart {
            label: "release",
            index: 0,
            count: 2,
            cells: 3,
            estimated_remaining: None,
        };
        sink.chunk_started(&start);
        sink.chunk_finished(&ChunkReport {
            label: "release",
            index: 0,
            count: 2,
            elapsed: Duration::from_millis(10),
            estimated_remaining: Duration::from_millis(9),
        });

        let guard = sink.bar.lock().unwrap();
        let pb = guard.as_ref().unwrap();
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.length(), Some(2));
        assert!(!pb.is_finished());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_event_lines() {
        let mut out = Vec::new();
        write_event(&mut out, &MatrixEvent::finished(5, 2)).unwrap();
        write_event(&mut out, &MatrixEvent::failed(7, "boom")).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"matrix-finished\""));
        assert!(lines[1].contains("boom"));
    }

    #[test]
    fn test_write_event_reports_closed_output() {
        let err = write_event(&mut ClosedPipe, &MatrixEvent::finished(5, 2)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
