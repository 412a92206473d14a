//! Destination URL checks and redaction.

use url::Url;

/// Domains accepted when no allow-list is configured.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["slack.com", "hooks.slack.com"];

/// Accepts or rejects webhook URLs by host name.
///
/// A host is accepted when it equals an allow-listed domain or is a
/// subdomain of one. Only the shape of the URL is checked; nothing is
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationValidator {
    allowed_domains: Vec<String>,
}

impl Default for DestinationValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()))
    }
}

impl DestinationValidator {
    pub fn new(allowed_domains: impl IntoIterator<Item = String>) -> Self {
        let allowed_domains = allowed_domains
            .into_iter()
            .map(|domain| domain.trim().trim_matches('.').to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self { allowed_domains }
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// True when `url` parses and its host is on the allow-list.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.trim_end_matches('.').to_ascii_lowercase();

        self.allowed_domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Redact a destination URL for logs and responses.
///
/// Keeps the scheme, host and first path segment and replaces the rest with
/// `/***`, e.g. `https://hooks.slack.com/services/***`.
pub fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => {
            let host = parsed.host_str().unwrap_or_default();
            let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
            let first_segment = parsed
                .path_segments()
                .and_then(|mut segments| segments.next())
                .filter(|segment| !segment.is_empty());
            match first_segment {
                Some(segment) => format!("{}://{host}{port}/{segment}/***", parsed.scheme()),
                None => format!("{}://{host}{port}/***", parsed.scheme()),
            }
        }
        _ => "***".to_string(),
    }
}
