//! Handle on a running batch

use super::worker::WorkerReport;
use crate::state::ResultRecord;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::DropGuard;

/// Everything a finished batch produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Records not already taken through [`BatchStream::next`]
    pub records: Vec<ResultRecord>,

    /// One report per worker that exited normally, ordered by worker id
    pub workers: Vec<WorkerReport>,

    /// URLs the producer put on the work queue
    pub submitted: usize,

    /// Records delivered over the whole batch, streamed or collected
    pub received: usize,

    /// Workers that panicked or were aborted
    pub lost_workers: usize,

    pub elapsed: Duration,
}

impl BatchReport {
    /// True when every submitted URL produced exactly one record
    pub fn is_complete(&self) -> bool {
        self.lost_workers == 0 && self.received == self.submitted
    }

    /// Sum of URLs processed across workers
    pub fn processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed).sum()
    }
}

/// A batch in flight
///
/// Records arrive in completion order, not submission order. Dropping the
/// stream before it is exhausted cancels the batch.
pub struct BatchStream {
    results: mpsc::Receiver<ResultRecord>,
    producer: JoinHandle<usize>,
    workers: JoinSet<WorkerReport>,
    received: usize,
    started: Instant,
    _cancel_on_drop: DropGuard,
}

impl BatchStream {
    pub(crate) fn new(
        results: mpsc::Receiver<ResultRecord>,
        producer: JoinHandle<usize>,
        workers: JoinSet<WorkerReport>,
        cancel_on_drop: DropGuard,
    ) -> Self {
        Self {
            results,
            producer,
            workers,
            received: 0,
            started: Instant::now(),
            _cancel_on_drop: cancel_on_drop,
        }
    }

    /// Waits for the next completed record
    ///
    /// Returns `None` once every worker has exited, which happens only after
    /// the work queue is closed and drained.
    pub async fn next(&mut self) -> Option<ResultRecord> {
        let record = self.results.recv().await?;
        self.received += 1;
        Some(record)
    }

    /// Number of records delivered so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Drains the remaining records and joins the producer and workers
    pub async fn finish(mut self) -> BatchReport {
        let mut records = Vec::new();
        while let Some(record) = self.next().await {
            records.push(record);
        }

        let submitted = match (&mut self.producer).await {
            Ok(submitted) => submitted,
            Err(e) => {
                tracing::error!("Producer task failed: {}", e);
                0
            }
        };

        let mut workers = Vec::with_capacity(self.workers.len());
        let mut lost_workers = 0;
        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok(report) => workers.push(report),
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                    lost_workers += 1;
                }
            }
        }
        workers.sort_by_key(|w| w.worker);

        let report = BatchReport {
            records,
            workers,
            submitted,
            received: self.received,
            lost_workers,
            elapsed: self.started.elapsed(),
        };

        if report.is_complete() {
            tracing::info!(
                "Batch finished: {} records in {:.2?}",
                report.received,
                report.elapsed
            );
        } else {
            tracing::warn!(
                "Batch incomplete: {} of {} records ({} workers lost)",
                report.received,
                report.submitted,
                report.lost_workers
            );
        }

        report
    }
}
