//! Worker pool for fetching a batch of URLs
//!
//! This module fans a batch out over a fixed number of workers and funnels
//! the outcomes back to a single consumer:
//! - A producer task feeds the bounded work queue, then closes it
//! - `concurrency` workers each pull a URL, fetch it, and push a record
//! - The caller drains the bounded result queue until every worker is done
//!
//! The two queues are the only shared state. The work queue delivers each
//! URL to exactly one worker, so no locking is involved.

mod batch;
mod worker;

pub use batch::{BatchReport, BatchStream};
pub use worker::WorkerReport;

use crate::config::FetcherConfig;
use crate::fetcher::Fetcher;
use crate::state::ResultRecord;
use crate::SumiError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Queue capacity used when none is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Fixed-size pool of fetch workers
///
/// The pool itself is only a description; every call to [`WorkerPool::spawn`]
/// or [`WorkerPool::run`] starts a fresh producer and worker set.
#[derive(Clone)]
pub struct WorkerPool {
    fetcher: Arc<Fetcher>,
    concurrency: usize,
    queue_capacity: usize,
    cancel: CancellationToken,
    deadline: Option<Duration>,
}

impl WorkerPool {
    /// Creates a pool with `concurrency` workers
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - The pool
    /// * `Err(SumiError::InvalidConcurrency)` - `concurrency` was zero
    pub fn new(fetcher: Arc<Fetcher>, concurrency: usize) -> Result<Self, SumiError> {
        if concurrency == 0 {
            return Err(SumiError::InvalidConcurrency(concurrency));
        }

        Ok(Self {
            fetcher,
            concurrency,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            cancel: CancellationToken::new(),
            deadline: None,
        })
    }

    /// Creates a pool sized and bounded by the fetcher configuration
    pub fn from_config(fetcher: Arc<Fetcher>, config: &FetcherConfig) -> Result<Self, SumiError> {
        Ok(Self::new(fetcher, config.concurrency)?
            .with_queue_capacity(config.queue_capacity)
            .with_deadline(config.batch_deadline_ms.map(Duration::from_millis)))
    }

    /// Bounds the work and result queues; the producer blocks when full
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Cancels every batch of this pool when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancels a batch that has not finished after `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Starts a batch and returns a stream of its records
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<I>(&self, urls: I) -> BatchStream
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        tracing::info!(
            "Starting batch with {} workers (queue capacity {})",
            self.concurrency,
            self.queue_capacity
        );

        let batch_token = self.cancel.child_token();
        let (work_tx, work_rx) = async_channel::bounded::<String>(self.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel::<ResultRecord>(self.queue_capacity);

        let producer = tokio::spawn(worker::produce(urls.into_iter(), work_tx));

        let mut workers = JoinSet::new();
        for id in 0..self.concurrency {
            workers.spawn(worker::run_worker(
                id,
                Arc::clone(&self.fetcher),
                work_rx.clone(),
                result_tx.clone(),
                batch_token.clone(),
            ));
        }

        // Only workers may hold these; the result queue closes when the last one exits
        drop(work_rx);
        drop(result_tx);

        if let Some(deadline) = self.deadline {
            let token = batch_token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(deadline) => {
                        tracing::warn!("Batch deadline of {:?} elapsed; cancelling", deadline);
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            });
        }

        BatchStream::new(result_rx, producer, workers, batch_token.drop_guard())
    }

    /// Runs a batch to completion and collects every record
    pub async fn run<I>(&self, urls: I) -> BatchReport
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        self.spawn(urls).finish().await
    }
}

/// Fetches every URL with `concurrency` workers and returns one record per URL
///
/// Records come back in completion order; use [`ResultRecord::url`] to
/// correlate them with the input.
///
/// # Returns
///
/// * `Ok(Vec<ResultRecord>)` - Exactly `urls.len()` records
/// * `Err(SumiError::InvalidConcurrency)` - `concurrency` was zero
/// * `Err(SumiError::IncompleteBatch)` - a worker was lost before reporting
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_fetch::config::{FetcherConfig, UserAgentConfig};
/// use sumi_fetch::url::default_validator;
/// use sumi_fetch::{aggregate, Fetcher, ReqwestClient};
///
/// # async fn example() -> sumi_fetch::Result<()> {
/// let client = ReqwestClient::from_config(&UserAgentConfig::default(), &FetcherConfig::default())?;
/// let fetcher = Arc::new(Fetcher::new(client, default_validator()));
///
/// let urls = vec!["https://example.com/".to_string(), "www.example.org".to_string()];
/// for record in aggregate(urls, fetcher, 2).await? {
///     println!("{} -> {:?}", record.url, record.outcome.failure_kind());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate(
    urls: Vec<String>,
    fetcher: Arc<Fetcher>,
    concurrency: usize,
) -> Result<Vec<ResultRecord>, SumiError> {
    let pool = WorkerPool::new(fetcher, concurrency)?;
    if urls.is_empty() {
        return Ok(Vec::new());
    }

    let submitted = urls.len();
    let report = pool.run(urls).await;
    if !report.is_complete() || report.records.len() != submitted {
        return Err(SumiError::IncompleteBatch {
            received: report.records.len(),
            submitted,
        });
    }

    Ok(report.records)
}
