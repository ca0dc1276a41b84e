//! Chunked parallel execution of matrix cells.
//!
//! Cells run in fixed-size chunks. Every cell of a chunk is dispatched at once
//! to a pool sized to the chunk (or to `max_workers`, if smaller), and the next
//! chunk starts only after the previous one fully resolved. The first failure
//! observed ends the run: its error is returned as-is and no further chunk is
//! dispatched.
//!
//! Abort is best-effort. Siblings already running when a cell fails are not
//! interrupted and finish in the background; their results are discarded.
//! Siblings that have not started yet are skipped.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Instant;

use anyhow::Result;
use rayon::ThreadPool;
use thiserror::Error;

use crate::builder::estimate::{DurationEstimator, DEFAULT_WEIGHT};
use crate::builder::progress::{ChunkReport, ChunkStart, LogProgress, ProgressSink};

/// Failures of the executor itself, as opposed to failures of a cell.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("worker for cell {index} panicked: {message}")]
    WorkerPanicked { index: usize, message: String },

    #[error("worker for cell {index} exited without reporting a result")]
    WorkerLost { index: usize },

    #[error("failed to start worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Runs cells chunk by chunk with bounded concurrency and progress reporting.
pub struct ChunkedExecutor {
    chunk_size: usize,
    max_workers: Option<usize>,
    weight: f64,
    progress: Arc<dyn ProgressSink>,
}

impl ChunkedExecutor {
    /// Create an executor that dispatches `chunk_size` cells at a time.
    pub fn new(chunk_size: usize) -> Result<Self, ExecutorError> {
        if chunk_size == 0 {
            return Err(ExecutorError::InvalidChunkSize);
        }

        Ok(ChunkedExecutor {
            chunk_size,
            max_workers: None,
            weight: DEFAULT_WEIGHT,
            progress: Arc::new(LogProgress),
        })
    }

    /// Cap the worker pool below the chunk size. `0` removes the cap.
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = (workers > 0).then_some(workers);
        self
    }

    /// Weight of the latest chunk in the duration estimate.
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Report progress to `sink` instead of the log.
    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks needed for `cells` cells.
    pub fn chunk_count(&self, cells: usize) -> usize {
        cells.div_ceil(self.chunk_size)
    }

    fn worker_count(&self) -> usize {
        match self.max_workers {
            Some(cap) => cap.min(self.chunk_size),
            None => self.chunk_size,
        }
    }

    /// Run `work` over every cell and return the results in cell order.
    ///
    /// An empty cell list returns immediately without reporting progress.
    pub fn run<C, T, F>(&self, label: &str, cells: Vec<C>, work: F) -> Result<Vec<T>>
    where
        C: Send + 'static,
        T: Send + 'static,
        F: Fn(C) -> Result<T> + Send + Sync + 'static,
    {
        if cells.is_empty() {
            return Ok(Vec::new());
        }

        let count = self.chunk_count(cells.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count())
            .thread_name(|i| format!("buildmatrix-worker-{}", i))
            .build()
            .map_err(ExecutorError::from)?;

        let work = Arc::new(work);
        let abort = Arc::new(AtomicBool::new(false));
        let mut estimator = DurationEstimator::with_weight(self.weight);

        let mut results = Vec::with_capacity(cells.len());
        let mut cells = cells.into_iter();

        for index in 0..count {
            let chunk: Vec<C> = cells.by_ref().take(self.chunk_size).collect();

            self.progress.chunk_started(&ChunkStart {
                label,
                index,
                count,
                cells: chunk.len(),
                estimated_remaining: estimator.remaining(count - index),
            });

            let start = Instant::now();
            let offset = results.len();
            let outputs = run_chunk(&pool, offset, chunk, &work, &abort)?;
            let elapsed = start.elapsed();

            estimator.observe(elapsed);
            self.progress.chunk_finished(&ChunkReport {
                label,
                index,
                count,
                elapsed,
                estimated_remaining: estimator.remaining(count - index - 1).unwrap_or_default(),
            });

            results.extend(outputs);
        }

        Ok(results)
    }
}

enum Outcome<T> {
    Done(Result<T>),
    Panicked(String),
}

/// Dispatch one chunk and collect its results in cell order, returning early
/// on the first failure received.
fn run_chunk<C, T, F>(
    pool: &ThreadPool,
    offset: usize,
    chunk: Vec<C>,
    work: &Arc<F>,
    abort: &Arc<AtomicBool>,
) -> Result<Vec<T>>
where
    C: Send + 'static,
    T: Send + 'static,
    F: Fn(C) -> Result<T> + Send + Sync + 'static,
{
    let len = chunk.len();
    let (tx, rx) = mpsc::channel::<(usize, Outcome<T>)>();

    for (slot, cell) in chunk.into_iter().enumerate() {
        let tx = tx.clone();
        let work = Arc::clone(work);
        let abort = Arc::clone(abort);

        pool.spawn(move || {
            if abort.load(Ordering::Acquire) {
                return;
            }
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| work(cell))) {
                Ok(result) => Outcome::Done(result),
                Err(payload) => Outcome::Panicked(panic_message(payload.as_ref())),
            };
            // The receiver is gone once the run has failed.
            let _ = tx.send((slot, outcome));
        });
    }
    drop(tx);

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
    for _ in 0..len {
        let Ok((slot, outcome)) = rx.recv() else {
            let missing = slots.iter().position(Option::is_none).unwrap_or(0);
            return Err(ExecutorError::WorkerLost {
                index: offset + missing,
            }
            .into());
        };

        match outcome {
            Outcome::Done(Ok(value)) => slots[slot] = Some(value),
            Outcome::Done(Err(err)) => {
                abort.store(true, Ordering::Release);
                return Err(err);
            }
            Outcome::Panicked(message) => {
                abort.store(true, Ordering::Release);
                return Err(ExecutorError::WorkerPanicked {
                    index: offset + slot,
                    message,
                }
                .into());
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `work` over `cells` in chunks of `chunk_size`, logging progress.
pub fn run_chunked<C, T, F>(cells: Vec<C>, chunk_size: usize, label: &str, work: F) -> Result<Vec<T>>
where
    C: Send + 'static,
    T: Send + 'static,
    F: Fn(C) -> Result<T> + Send + Sync + 'static,
{
    ChunkedExecutor::new(chunk_size)?.run(label, cells, work)
}
