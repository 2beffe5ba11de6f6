//! URL handling module for Sumi-Fetch
//!
//! This module provides the injectable URL validation policies and the
//! conversion of accepted URLs into absolute request URLs.

mod request;
mod validator;

use crate::config::{ValidatorConfig, ValidatorPolicy};

// Re-export main types
pub use request::to_request_url;
pub use validator::{
    AllOf, AnyOf, DomainAllowlist, HostShapeValidator, SchemeValidator, UrlValidator,
};

/// Returns the validator used when nothing else is configured
///
/// Accepts absolute `http`/`https` URLs as well as scheme-less hosts of the
/// shape `www.<name>.<tld>`.
///
/// # Examples
///
/// ```
/// use sumi_fetch::url::{default_validator, UrlValidator};
///
/// let validator = default_validator();
/// assert!(validator.validate("www.example.com"));
/// assert!(validator.validate("https://example.com/"));
/// assert!(!validator.validate("example.com"));
/// assert!(!validator.validate(".hello"));
/// ```
pub fn default_validator() -> AnyOf {
    AnyOf(vec![Box::new(SchemeValidator), Box::new(HostShapeValidator)])
}

/// Builds the validator described by the configuration
///
/// The base policy is chosen first; a non-empty allowlist is then required
/// in addition to it.
pub fn validator_from_config(config: &ValidatorConfig) -> Box<dyn UrlValidator> {
    let base: Box<dyn UrlValidator> = match config.policy {
        ValidatorPolicy::Scheme => Box::new(SchemeValidator),
        ValidatorPolicy::HostShape => Box::new(HostShapeValidator),
        ValidatorPolicy::SchemeOrHost => Box::new(default_validator()),
    };

    let allowlist = DomainAllowlist::new(config.allowed_domains.iter().cloned());
    if allowlist.is_empty() {
        base
    } else {
        Box::new(AllOf(vec![base, Box::new(allowlist)]))
    }
}
