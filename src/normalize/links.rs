use regex::Regex;
use url::Url;

/// Pattern to extract the status ID from a permalink.
static STATUS_ID_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"/status/(\d+)").unwrap());

/// Extract the numeric status ID from a permalink such as `/jack/status/20#m`.
#[must_use]
pub fn extract_status_id(permalink: &str) -> Option<String> {
    STATUS_ID_PATTERN
        .captures(permalink)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Keep only absolute links to external hosts, preserving order.
///
/// Mirror-internal links (hashtags, mentions) are rendered as relative paths
/// and are dropped.
#[must_use]
pub fn filter_external_urls(links: &[String]) -> Vec<String> {
    links
        .iter()
        .filter(|link| is_absolute(link))
        .cloned()
        .collect()
}

fn is_absolute(link: &str) -> bool {
    Url::parse(link)
        .map(|u| u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}
