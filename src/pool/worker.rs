//! Producer and worker loops
//!
//! The producer is the only sender on the work queue; dropping it when the
//! input is exhausted closes the queue. Each worker pulls until the queue is
//! closed *and* drained, so no URL is left behind and no URL is delivered
//! twice.

use crate::fetcher::Fetcher;
use crate::state::{FailureKind, FetchFailure, FetchOutcome, ResultRecord};
use async_channel::{Receiver, Sender};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How much work a single worker did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker id, `0..concurrency`
    pub worker: usize,

    /// Number of URLs this worker dequeued and reported
    pub processed: usize,
}

/// Enqueues every URL in submission order, then closes the queue
///
/// Returns the number of URLs accepted by the queue. Sending blocks while
/// the bounded queue is full.
pub(crate) async fn produce<I>(urls: I, queue: Sender<String>) -> usize
where
    I: Iterator<Item = String>,
{
    let mut submitted = 0;

    for url in urls {
        if queue.send(url).await.is_err() {
            tracing::warn!(
                "Work queue closed after {} URLs; remaining input dropped",
                submitted
            );
            break;
        }
        submitted += 1;
    }

    // Dropping the only sender closes the queue
    drop(queue);
    tracing::debug!("Producer finished: {} URLs enqueued", submitted);
    submitted
}

/// Runs one worker until the work queue is closed and empty
pub(crate) async fn run_worker(
    id: usize,
    fetcher: Arc<Fetcher>,
    queue: Receiver<String>,
    results: mpsc::Sender<ResultRecord>,
    cancel: CancellationToken,
) -> WorkerReport {
    tracing::trace!("Worker {} started", id);
    let mut processed = 0;

    while let Ok(url) = queue.recv().await {
        let outcome = match AssertUnwindSafe(fetcher.fetch_with_cancel(&url, &cancel))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = format!("HTTP client panicked: {}", panic_message(&*payload));
                tracing::error!("Worker {} recovered from panic on {}: {}", id, url, message);
                FetchOutcome::Failure(FetchFailure::new(FailureKind::Transport, message))
            }
        };
        processed += 1;

        let record = ResultRecord {
            url,
            outcome,
            worker: id,
        };
        if results.send(record).await.is_err() {
            tracing::debug!("Result queue closed; worker {} stopping", id);
            break;
        }
    }

    tracing::trace!("Worker {} finished after {} URLs", id, processed);
    WorkerReport {
        worker: id,
        processed,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
