//! Single-URL fetch pipeline
//!
//! This module performs one validate + fetch + classify cycle:
//! - Validating the URL before any network I/O
//! - Issuing the GET through the injected capability
//! - Classifying the status code
//! - Reading the body to completion
//!
//! Every step races the caller's cancellation token.

use super::http::{BodyStream, HttpClient};
use crate::state::{FailureKind, FetchFailure, FetchOutcome, Page};
use crate::url::UrlValidator;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Status code classified as [`FailureKind::NotFound`]
const NOT_FOUND: u16 = 404;

/// Fetches one URL at a time and classifies the outcome
///
/// A `Fetcher` is cheap to share: wrap it in an `Arc` and hand it to a
/// [`WorkerPool`](crate::pool::WorkerPool).
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    validator: Arc<dyn UrlValidator>,
    max_body_bytes: Option<usize>,
}

impl Fetcher {
    /// Creates a fetcher from a capability and a validation policy
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumi_fetch::config::{FetcherConfig, UserAgentConfig};
    /// use sumi_fetch::url::default_validator;
    /// use sumi_fetch::{Fetcher, ReqwestClient};
    ///
    /// # async fn example() {
    /// let client = ReqwestClient::from_config(&UserAgentConfig::default(), &FetcherConfig::default()).unwrap();
    /// let fetcher = Fetcher::new(client, default_validator());
    /// let outcome = fetcher.fetch("https://example.com/").await;
    /// println!("success: {}", outcome.is_success());
    /// # }
    /// ```
    pub fn new<C, V>(client: C, validator: V) -> Self
    where
        C: HttpClient + 'static,
        V: UrlValidator + 'static,
    {
        Self::from_shared(Arc::new(client), Arc::new(validator))
    }

    /// Creates a fetcher from already shared components
    pub fn from_shared(client: Arc<dyn HttpClient>, validator: Arc<dyn UrlValidator>) -> Self {
        Self {
            client,
            validator,
            max_body_bytes: None,
        }
    }

    /// Limits how many body bytes a single fetch may read
    pub fn with_max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Fetches a URL without external cancellation
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        self.fetch_with_cancel(url, &CancellationToken::new()).await
    }

    /// Fetches a URL, giving up with [`FailureKind::Cancelled`] once `cancel` fires
    ///
    /// # Request Flow
    ///
    /// | Step | Condition | Outcome |
    /// |------|-----------|---------|
    /// | 1 | Validator rejects the URL | `InvalidUrl`, no request |
    /// | 2 | Token already cancelled | `Cancelled`, no request |
    /// | 3 | Transport fails | `Transport` |
    /// | 4 | HTTP 404 | `NotFound`, body not read |
    /// | 5 | Body chunk fails or exceeds the limit | `Read` |
    /// | 6 | Otherwise | `Success` with status preserved |
    pub async fn fetch_with_cancel(&self, url: &str, cancel: &CancellationToken) -> FetchOutcome {
        if !self.validator.validate(url) {
            tracing::debug!("Rejected invalid URL: {}", url);
            return FetchOutcome::failure(
                FailureKind::InvalidUrl,
                format!("invalid URL requested: {:?}", url),
            );
        }

        if cancel.is_cancelled() {
            return cancelled(url);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(url),
            result = self.client.get(url) => result,
        };

        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return FetchOutcome::failure(
                    FailureKind::Transport,
                    format!("failed to fetch page {:?}: {}", url, e),
                );
            }
        };

        let status = response.status;
        if status == NOT_FOUND {
            drop(response);
            tracing::debug!("Page not found: {}", url);
            return FetchOutcome::Failure(
                FetchFailure::new(FailureKind::NotFound, format!("could not find page {:?}", url))
                    .with_status(status),
            );
        }

        match self.read_body(&mut response.body, cancel).await {
            Ok(content) => {
                tracing::debug!("Fetched {} ({} bytes, status {})", url, content.len(), status);
                FetchOutcome::Success(Page {
                    content,
                    status_code: status,
                })
            }
            Err(failure) => {
                tracing::debug!("Body of {} not read: {}", url, failure.message);
                FetchOutcome::Failure(failure.with_status(status))
            }
        }
    }

    /// Drains the body stream, enforcing the size limit
    async fn read_body(
        &self,
        body: &mut BodyStream,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, FetchFailure> {
        let mut content = Vec::new();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(FetchFailure::new(
                        FailureKind::Cancelled,
                        "cancelled while reading response body",
                    ));
                }
                chunk = body.next() => chunk,
            };

            match chunk {
                None => return Ok(content),
                Some(Ok(bytes)) => {
                    if let Some(limit) = self.max_body_bytes {
                        if content.len() + bytes.len() > limit {
                            return Err(FetchFailure::new(
                                FailureKind::Read,
                                format!("response body exceeds {} bytes", limit),
                            ));
                        }
                    }
                    content.extend_from_slice(&bytes);
                }
                Some(Err(e)) => {
                    return Err(FetchFailure::new(
                        FailureKind::Read,
                        format!("cannot read body content from response: {}", e),
                    ));
                }
            }
        }
    }
}

fn cancelled(url: &str) -> FetchOutcome {
    tracing::debug!("Cancelled before fetching {}", url);
    FetchOutcome::failure(FailureKind::Cancelled, format!("fetch of {:?} cancelled", url))
}
