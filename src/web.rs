//! Web page fetching.
//!
//! Downloads a URL and reduces the HTML to visible text via
//! [`crate::extract::html_to_text`]. Fetching is bounded by a fixed timeout;
//! non-success statuses and network failures surface as [`RagError::Fetch`].

use std::time::Duration;

use crate::error::RagError;
use crate::extract;

const FETCH_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Fetch a URL and return the page's visible text.
pub async fn fetch_url(url: &str) -> Result<String, RagError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| RagError::Fetch(e.to_string()))?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .map_err(|e| RagError::Fetch(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RagError::Fetch(format!("{}: HTTP {}", url, status)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| RagError::Fetch(format!("{}: {}", url, e)))?;

    Ok(extract::html_to_text(&body))
}
