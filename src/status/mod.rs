//! Best-effort host status-page scraping.
//!
//! Status text is informational only and never on the provisioning path, so
//! every failure mode degrades to a fixed fallback string.

#[cfg(test)]
mod tests;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Text reported when the status page cannot be fetched or parsed.
pub const STATUS_UNAVAILABLE: &str = "status unavailable";

static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div[^>]*class="[^"]*page-status[^"]*"[^>]*>(.*?)</div>"#)
        .unwrap_or_else(|err| panic!("invalid status banner pattern: {err}"))
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]+>").unwrap_or_else(|err| panic!("invalid tag pattern: {err}"))
});

/// Fetches a status page and extracts its banner text.
///
/// Transport failures, unreadable bodies, and pages without a recognisable
/// banner all yield [`STATUS_UNAVAILABLE`].
pub(crate) async fn fetch_status(client: &reqwest::Client, url: &str) -> String {
    let body = match client.get(url).send().await {
        Ok(response) => match response.text().await {
            Ok(text) => text,
            Err(err) => {
                debug!(url, error = %err, "status page body unreadable");
                return STATUS_UNAVAILABLE.to_owned();
            }
        },
        Err(err) => {
            debug!(url, error = %err, "status page unreachable");
            return STATUS_UNAVAILABLE.to_owned();
        }
    };
    extract_banner(&body).unwrap_or_else(|| STATUS_UNAVAILABLE.to_owned())
}

/// Pulls the banner text out of a status page body.
pub(crate) fn extract_banner(html: &str) -> Option<String> {
    let captured = BANNER.captures(html)?.get(1)?;
    let text = TAG.replace_all(captured.as_str(), " ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
