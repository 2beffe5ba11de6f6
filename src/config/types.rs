use serde::Deserialize;

/// Main configuration structure for Sumi-Fetch
///
/// Every section is optional; missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
}

/// Fetch and worker pool behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetcherConfig {
    /// Number of parallel workers
    pub concurrency: usize,

    /// Capacity of the work and result queues
    pub queue_capacity: usize,

    /// Whole-request timeout (milliseconds)
    pub request_timeout_ms: u64,

    /// TCP connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Deadline for a whole batch (milliseconds); unset means no deadline
    pub batch_deadline_ms: Option<u64>,

    /// Upper bound on a response body; larger bodies are read errors
    pub max_body_bytes: Option<usize>,

    /// Scheme used for URLs submitted without one
    pub default_scheme: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            queue_capacity: 64,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            batch_deadline_ms: None,
            max_body_bytes: None,
            default_scheme: "https".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Name of the client
    pub crawler_name: String,

    /// Version of the client
    pub crawler_version: String,

    /// URL with information about the client
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiFetch".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// URL acceptance policy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ValidatorConfig {
    pub policy: ValidatorPolicy,

    /// Domain patterns (e.g., "example.com" or "*.example.com"); empty allows all
    pub allowed_domains: Vec<String>,
}

/// Base validation policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorPolicy {
    /// Absolute http/https URLs only
    Scheme,
    /// Scheme-less `www.<name>.<tld>` hosts only
    HostShape,
    /// Either of the above
    #[default]
    SchemeOrHost,
}
