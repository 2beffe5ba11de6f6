use crate::config::types::{Config, FetcherConfig, UserAgentConfig, ValidatorConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Smallest timeout accepted for requests and connects
const MIN_TIMEOUT_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_fetcher_config(&config.fetcher)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_validator_config(&config.validator)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue-capacity must be >= 1, got {}",
            config.queue_capacity
        )));
    }

    if config.request_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "request-timeout-ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.request_timeout_ms
        )));
    }

    if config.connect_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.connect_timeout_ms
        )));
    }

    if config.batch_deadline_ms == Some(0) {
        return Err(ConfigError::Validation(
            "batch-deadline-ms must be > 0 when set".to_string(),
        ));
    }

    if config.max_body_bytes == Some(0) {
        return Err(ConfigError::Validation(
            "max-body-bytes must be > 0 when set".to_string(),
        ));
    }

    if config.default_scheme != "http" && config.default_scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "default-scheme must be 'http' or 'https', got '{}'",
            config.default_scheme
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates the URL acceptance policy
fn validate_validator_config(config: &ValidatorConfig) -> Result<(), ConfigError> {
    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
