//! HTTP capability
//!
//! The fetch pipeline never builds its own network access. It is handed an
//! [`HttpClient`], which production code backs with `reqwest` and tests back
//! with in-memory doubles.

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::url::to_request_url;
use crate::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Client;
use std::fmt;
use std::io;
use std::time::Duration;

/// Streamed response body
pub type BodyStream = BoxStream<'static, Result<Bytes, io::Error>>;

/// A response whose status is known and whose body has not been read yet
///
/// The response owns its body stream; dropping the response releases the
/// underlying connection.
pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl HttpResponse {
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// A response whose whole body is available up front
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::from_chunks(status, vec![Ok(body)])
    }

    /// A response whose body arrives as the given chunks, errors included
    pub fn from_chunks(status: u16, chunks: Vec<Result<Bytes, io::Error>>) -> Self {
        Self::new(status, stream::iter(chunks).boxed())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Network capability used by the [`Fetcher`](super::Fetcher)
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a GET request and returns once the status line is known
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Builds a `reqwest` client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetcher` - Timeouts for requests and connects
///
/// # Example
///
/// ```no_run
/// use sumi_fetch::config::{FetcherConfig, UserAgentConfig};
/// use sumi_fetch::fetcher::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetcher: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_millis(fetcher.request_timeout_ms))
        .connect_timeout(Duration::from_millis(fetcher.connect_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production [`HttpClient`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    default_scheme: String,
}

impl ReqwestClient {
    pub fn new(client: Client, default_scheme: impl Into<String>) -> Self {
        Self {
            client,
            default_scheme: default_scheme.into(),
        }
    }

    /// Builds the client from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetcher: &FetcherConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, fetcher)?;
        Ok(Self::new(client, fetcher.default_scheme.clone()))
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let request_url = to_request_url(url, &self.default_scheme)?;

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
            .boxed();

        Ok(HttpResponse::new(status, body))
    }
}

/// Maps a `reqwest` send error onto the transport taxonomy
fn classify_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
