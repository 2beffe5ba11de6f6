/// Failure classification for a single fetch
///
/// This module defines every way a URL can fail to produce a page.
use std::fmt;

/// Represents why a fetch did not yield a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    // ===== Policy =====
    /// The URL was rejected by the validator; no request was issued
    InvalidUrl,

    // ===== Network =====
    /// The transport failed (connection refused, DNS failure, timeout), or
    /// the HTTP client panicked
    Transport,

    // ===== Response =====
    /// The server answered HTTP 404
    NotFound,

    /// The status was fine but the body could not be fully read
    Read,

    // ===== Batch control =====
    /// The batch was cancelled or its deadline elapsed before completion
    ///
    /// This can happen before the request, while waiting on it, or while
    /// reading the body; in the last case the status code is kept.
    Cancelled,
}

impl FailureKind {
    /// Stable label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Transport => "transport_error",
            Self::NotFound => "not_found",
            Self::Read => "read_error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all failure kinds in reporting order
    pub fn all_kinds() -> [Self; 5] {
        [
            Self::InvalidUrl,
            Self::Transport,
            Self::NotFound,
            Self::Read,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
