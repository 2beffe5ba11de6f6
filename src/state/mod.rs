//! State module for fetch outcomes
//!
//! This module provides the typed result of fetching one URL.
//!
//! # Components
//!
//! - `FailureKind`: Classifies why a fetch produced no page (invalid URL, transport, 404, read, cancelled)
//! - `FetchOutcome`: Success with a `Page`, or a tagged `FetchFailure`
//! - `ResultRecord`: An outcome paired with its originating URL

mod failure_kind;
mod outcome;

// Re-export main types
pub use failure_kind::FailureKind;
pub use outcome::{FetchFailure, FetchOutcome, Page, ResultRecord};
