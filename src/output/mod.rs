//! Output module for batch results
//!
//! This module handles:
//! - Rendering one line per result record
//! - Summarizing a batch into statistics

pub mod stats;

pub use stats::{print_statistics, BatchStatistics};

use crate::state::{FetchOutcome, ResultRecord};

/// Formats a record as a single line of text
///
/// Successes show the status and body size, failures show their kind and
/// cause, so a consumer can branch on the second column.
///
/// # Examples
///
/// ```
/// use sumi_fetch::output::format_record;
/// use sumi_fetch::{FetchOutcome, Page, ResultRecord};
///
/// let record = ResultRecord {
///     url: "https://example.com/".to_string(),
///     outcome: FetchOutcome::Success(Page { content: b"hi".to_vec(), status_code: 200 }),
///     worker: 0,
/// };
/// assert_eq!(format_record(&record), "https://example.com/\tok\t200\t2 bytes");
/// ```
pub fn format_record(record: &ResultRecord) -> String {
    match &record.outcome {
        FetchOutcome::Success(page) => format!(
            "{}\tok\t{}\t{} bytes",
            record.url,
            page.status_code,
            page.content.len()
        ),
        FetchOutcome::Failure(failure) => match failure.status_code {
            Some(status) => format!(
                "{}\t{}\t{}\t{}",
                record.url, failure.kind, status, failure.message
            ),
            None => format!("{}\t{}\t-\t{}", record.url, failure.kind, failure.message),
        },
    }
}
