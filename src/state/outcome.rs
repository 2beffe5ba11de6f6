//! Typed results of fetching a URL

use super::FailureKind;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Raw response body, exactly as the transport produced it
    pub content: Vec<u8>,

    /// HTTP status code of the response
    pub status_code: u16,
}

/// Why a fetch failed, with a human-readable cause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Status code when the server answered before the failure
    pub status_code: Option<u16>,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

/// Outcome of one validate + fetch + classify cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(Page),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub(crate) fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(FetchFailure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure kind, or None for a success
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.kind),
        }
    }

    /// Page content; always empty for failures
    pub fn content(&self) -> &[u8] {
        match self {
            Self::Success(page) => &page.content,
            Self::Failure(_) => &[],
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success(page) => Some(page.status_code),
            Self::Failure(failure) => failure.status_code,
        }
    }
}

/// An outcome tagged with the URL that produced it
///
/// Batch results complete in any order, so every outcome travels with its
/// originating URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub url: String,
    pub outcome: FetchOutcome,
    /// Id of the worker that processed this URL
    pub worker: usize,
}
