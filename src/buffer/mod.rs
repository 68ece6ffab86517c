//! In-memory event buffering.
//!
//! Accumulates records and hands them to a sink in batches, triggered by
//! occupancy or by a periodic timer. The buffer owns all of its mutable
//! state (no ambient globals), so independent sessions in one process can
//! run independent buffers.
//!
//! # Failure semantics
//!
//! Sink failures are never escalated: the un-flushed snapshot is spliced
//! back at the front of the queue and retried on the next trigger. There is
//! no backoff or retry cap; for a low-volume local pipeline the next add or
//! timer tick is soon enough. Sink writes must therefore be idempotent per
//! record id.

use crate::Result;
use crate::config::BufferConfig;
use crate::models::Record;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Instant;

/// Destination for flushed batches.
///
/// Implemented by the storage engine; writes must be idempotent per record
/// id because a failed batch is retried wholesale.
pub trait RecordSink: Send + Sync {
    /// Persists a batch of records.
    ///
    /// # Errors
    ///
    /// Returns an error if any record in the batch could not be persisted;
    /// the buffer will restore the batch and retry later.
    fn persist(&self, batch: &[Record]) -> Result<()>;
}

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (due to a panic in a previous critical section),
/// we recover the inner value and log a warning. Buffered records are more
/// valuable than strict poisoning semantics here.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("buffer mutex was poisoned, recovering");
            poisoned.into_inner()
        },
    }
}

/// State shared between the owning buffer and its timer thread.
struct BufferShared {
    /// Records awaiting persistence, oldest first.
    pending: Mutex<Vec<Record>>,
    /// Set while a flush is mid-execution; overlapping calls collapse.
    flush_in_progress: AtomicBool,
    /// Timestamp of the last successful flush.
    last_flush: Mutex<Option<Instant>>,
    /// The flush destination.
    sink: Arc<dyn RecordSink>,
    /// Occupancy that triggers a synchronous flush.
    max_records: usize,
}

impl BufferShared {
    fn add(&self, record: Record) {
        let should_flush = {
            let mut pending = acquire_lock(&self.pending);
            pending.push(record);
            pending.len() >= self.max_records
        };

        // Backpressure by blocking the caller on the triggered flush, never
        // by dropping events.
        if should_flush {
            self.flush();
        }
    }

    fn flush(&self) {
        // At most one flush executes at a time; the running one owns the
        // current batch and a later trigger gets whatever accumulates next.
        if self.flush_in_progress.swap(true, Ordering::AcqRel) {
            return;
        }

        let snapshot: Vec<Record> = {
            let mut pending = acquire_lock(&self.pending);
            std::mem::take(&mut *pending)
        };

        if snapshot.is_empty() {
            self.flush_in_progress.store(false, Ordering::Release);
            return;
        }

        match self.sink.persist(&snapshot) {
            Ok(()) => {
                *acquire_lock(&self.last_flush) = Some(Instant::now());
                metrics::counter!("buffer_flush_total", "status" => "success").increment(1);
                tracing::debug!(records = snapshot.len(), "flushed buffer");
            },
            Err(e) => {
                metrics::counter!("buffer_flush_total", "status" => "error").increment(1);
                tracing::warn!(
                    error = %e,
                    records = snapshot.len(),
                    "flush failed, restoring batch for retry"
                );
                // Restore exactly the un-flushed snapshot, in front of
                // anything added while the sink was running, so insertion
                // order survives the retry.
                let mut pending = acquire_lock(&self.pending);
                let mut restored = snapshot;
                restored.append(&mut pending);
                *pending = restored;
            },
        }

        self.flush_in_progress.store(false, Ordering::Release);
    }

    fn len(&self) -> usize {
        acquire_lock(&self.pending).len()
    }
}

/// In-memory accumulator with size- and time-based auto-flush.
///
/// Nothing on the public surface panics or propagates sink errors.
pub struct EventBuffer {
    shared: Arc<BufferShared>,
    config: BufferConfig,
    timer: Option<JoinHandle<()>>,
    shutdown_tx: Option<Sender<()>>,
}

impl EventBuffer {
    /// Creates a buffer draining into `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn RecordSink>, config: BufferConfig) -> Self {
        Self {
            shared: Arc::new(BufferShared {
                pending: Mutex::new(Vec::new()),
                flush_in_progress: AtomicBool::new(false),
                last_flush: Mutex::new(None),
                sink,
                max_records: config.max_records.max(1),
            }),
            config,
            timer: None,
            shutdown_tx: None,
        }
    }

    /// Appends a record, flushing synchronously when occupancy reaches the
    /// configured maximum.
    pub fn add(&self, record: Record) {
        self.shared.add(record);
    }

    /// Flushes buffered records to the sink.
    ///
    /// No-op when the buffer is empty or another flush is mid-execution.
    pub fn flush(&self) {
        self.shared.flush();
    }

    /// Returns the number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns true when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns when the last successful flush completed.
    #[must_use]
    pub fn last_flush_at(&self) -> Option<Instant> {
        *acquire_lock(&self.shared.last_flush)
    }

    /// Starts the periodic flush timer. Idempotent.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let interval = self.config.flush_interval;

        let handle = std::thread::Builder::new()
            .name("engram-flush".to_string())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => shared.flush(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match handle {
            Ok(h) => {
                self.timer = Some(h);
                self.shutdown_tx = Some(tx);
            },
            Err(e) => {
                // Degraded but functional: size-triggered flushes still run.
                tracing::warn!(error = %e, "failed to spawn flush timer");
            },
        }
    }

    /// Stops the periodic timer, flushing remaining records first when
    /// `flush_remaining` is set (the default for session teardown —
    /// termination must not silently drop buffered events). Idempotent.
    pub fn stop(&mut self, flush_remaining: bool) {
        if flush_remaining {
            self.shared.flush();
        }

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.timer.take() {
            if handle.join().is_err() {
                tracing::warn!("flush timer thread panicked");
            }
        }
    }
}

impl Drop for EventBuffer {
    fn drop(&mut self) {
        // Safety net only; sessions are expected to call stop(true) so the
        // final flush happens before the store closes.
        self.stop(false);
    }
}
