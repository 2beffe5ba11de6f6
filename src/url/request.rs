use crate::{UrlError, UrlResult};
use url::Url;

/// Builds an absolute request URL from an accepted raw URL string
///
/// # Steps
///
/// 1. If the input has no scheme (e.g. `www.example.com`), prefix the
///    default scheme
/// 2. Parse the URL; reject if malformed
/// 3. Reject anything other than HTTP and HTTPS
/// 4. Reject URLs without a host
///
/// # Arguments
///
/// * `raw` - The URL as submitted to the batch
/// * `default_scheme` - Scheme to use for scheme-less input (`http` or `https`)
///
/// # Examples
///
/// ```
/// use sumi_fetch::url::to_request_url;
///
/// let url = to_request_url("www.example.com", "https").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/");
///
/// let url = to_request_url("http://site1.com/a", "https").unwrap();
/// assert_eq!(url.as_str(), "http://site1.com/a");
/// ```
pub fn to_request_url(raw: &str, default_scheme: &str) -> UrlResult<Url> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("{}://{}", default_scheme, raw)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}
