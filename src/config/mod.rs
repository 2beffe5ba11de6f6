//! Configuration module for Sumi-Fetch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_fetch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fetch.toml")).unwrap();
//! println!("Fetching with {} workers", config.fetcher.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, UserAgentConfig, ValidatorConfig, ValidatorPolicy};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
