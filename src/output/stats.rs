//! Statistics for a finished batch
//!
//! This module provides functionality for summarizing batch outcomes and
//! displaying them.

use crate::pool::BatchReport;
use crate::state::{FailureKind, ResultRecord};
use crate::WorkerReport;
use std::collections::HashMap;
use std::time::Duration;

/// Batch statistics summary
#[derive(Debug, Clone, Default)]
pub struct BatchStatistics {
    /// Total number of records
    pub total: u64,

    /// Records holding a page
    pub succeeded: u64,

    /// Count of failures by kind
    pub failures_by_kind: HashMap<FailureKind, u64>,

    /// Bytes of page content across all successes
    pub total_bytes: u64,

    /// URLs the producer enqueued
    pub submitted: u64,

    /// URLs processed by each worker, ordered by worker id
    pub per_worker: Vec<WorkerReport>,

    pub elapsed: Duration,
}

impl BatchStatistics {
    /// Summarizes a set of records
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let mut stats = Self::default();

        for record in records {
            stats.total += 1;
            match record.outcome.failure_kind() {
                None => {
                    stats.succeeded += 1;
                    stats.total_bytes += record.outcome.content().len() as u64;
                }
                Some(kind) => *stats.failures_by_kind.entry(kind).or_insert(0) += 1,
            }
        }

        stats.submitted = stats.total;
        stats
    }

    /// Summarizes records together with the batch's worker and timing data
    ///
    /// `records` must hold every record of the batch, including any taken
    /// from the stream before the report was produced.
    pub fn from_report(records: &[ResultRecord], report: &BatchReport) -> Self {
        let mut stats = Self::from_records(records);
        stats.submitted = report.submitted as u64;
        stats.per_worker = report.workers.clone();
        stats.elapsed = report.elapsed;
        stats
    }

    pub fn failures(&self) -> u64 {
        self.total - self.succeeded
    }

    /// Success rate as a percentage; zero for an empty batch
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &BatchStatistics) {
    println!("=== Batch Statistics ===\n");

    println!("Overview:");
    println!("  URLs submitted: {}", stats.submitted);
    println!("  Records received: {}", stats.total);
    println!("  Content fetched: {} bytes", stats.total_bytes);
    println!("  Elapsed: {:.2?}", stats.elapsed);
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failures by Kind:");
        for kind in FailureKind::all_kinds() {
            if let Some(count) = stats.failures_by_kind.get(&kind) {
                println!("  {}: {}", kind, count);
            }
        }
        println!();
    }

    if !stats.per_worker.is_empty() {
        println!("Workers ({}):", stats.per_worker.len());
        for worker in &stats.per_worker {
            println!("  #{}: {} URLs", worker.worker, worker.processed);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs fetched)",
        stats.success_rate(),
        stats.succeeded,
        stats.total
    );
}
