use url::Url;

/// Decides whether a raw string is acceptable as a fetch target
///
/// Implementations must be pure: no I/O, no side effects, and malformed
/// input yields `false` instead of an error. Any `Fn(&str) -> bool` closure
/// is a validator, which keeps the policy injectable.
pub trait UrlValidator: Send + Sync {
    fn validate(&self, url: &str) -> bool;
}

impl<F> UrlValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, url: &str) -> bool {
        self(url)
    }
}

/// Accepts absolute `http`/`https` URLs that carry a host
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeValidator;

impl UrlValidator for SchemeValidator {
    fn validate(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => {
                matches!(parsed.scheme(), "http" | "https")
                    && parsed.host_str().is_some_and(|h| !h.is_empty())
            }
            Err(_) => false,
        }
    }
}

/// Accepts scheme-less hosts shaped like `www.<name>.<tld>`
///
/// An optional path, query or fragment may follow the host. Ports, credentials and schemes are
/// rejected; the top-level label must be alphabetic and at least two
/// characters long.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostShapeValidator;

impl UrlValidator for HostShapeValidator {
    fn validate(&self, url: &str) -> bool {
        if url.contains("://") {
            return false;
        }

        let host = url.split(['/', '?', '#']).next().unwrap_or_default();
        let Some(rest) = strip_www(host) else {
            return false;
        };

        let labels: Vec<&str> = rest.split('.').collect();
        if labels.len() < 2 || !labels.iter().all(|l| is_valid_label(l)) {
            return false;
        }

        labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
    }
}

fn strip_www(host: &str) -> Option<&str> {
    match (host.get(..4), host.get(4..)) {
        (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case("www.") && !rest.is_empty() => {
            Some(rest)
        }
        _ => None,
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Accepts URLs whose host matches one of a set of domain patterns
///
/// Patterns are either exact (`example.com`) or wildcards (`*.example.com`),
/// where a wildcard also covers the bare base domain. Hosts are compared
/// lowercase.
#[derive(Debug, Clone, Default)]
pub struct DomainAllowlist {
    patterns: Vec<String>,
}

impl DomainAllowlist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn allows_host(&self, host: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| match pattern.strip_prefix("*.") {
                Some(base) => {
                    host == base
                        || host
                            .strip_suffix(base)
                            .is_some_and(|prefix| prefix.ends_with('.'))
                }
                None => host == pattern,
            })
    }
}

impl UrlValidator for DomainAllowlist {
    fn validate(&self, url: &str) -> bool {
        match host_of(url) {
            Some(host) => self.allows_host(&host),
            None => false,
        }
    }
}

/// Extracts the lowercase host from an absolute or scheme-less URL
fn host_of(url: &str) -> Option<String> {
    if url.contains("://") {
        return Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));
    }

    let host = url.split(['/', '?', '#']).next()?;
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

/// Accepts a URL when any inner validator does; empty accepts nothing
pub struct AnyOf(pub Vec<Box<dyn UrlValidator>>);

impl UrlValidator for AnyOf {
    fn validate(&self, url: &str) -> bool {
        self.0.iter().any(|v| v.validate(url))
    }
}

/// Accepts a URL only when every inner validator does; empty accepts everything
pub struct AllOf(pub Vec<Box<dyn UrlValidator>>);

impl UrlValidator for AllOf {
    fn validate(&self, url: &str) -> bool {
        self.0.iter().all(|v| v.validate(url))
    }
}
