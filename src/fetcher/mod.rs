//! Fetcher module for single-URL fetching
//!
//! This module contains:
//! - The injectable HTTP capability and its `reqwest` implementation
//! - The validate + fetch + classify pipeline for one URL

mod fetch;
mod http;

pub use fetch::Fetcher;
pub use http::{build_http_client, BodyStream, HttpClient, HttpResponse, ReqwestClient};
