// src/fetch/mod.rs
//! HTTP side of the scrapers. Each submodule fetches one kind of data and
//! hands the body to a pure parser; nothing here retries.

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ScrapeError};

pub mod dividends;
pub mod pages;
pub mod prices;
pub mod statements;

/// GET `url` and return the body; a non-2xx status is an upstream failure.
pub(crate) async fn get_text(client: &Client, url: &Url) -> Result<String> {
    debug!(url = %redacted(url), "GET");
    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        warn!(url = %redacted(url), %status, "non-success status");
        return Err(ScrapeError::UpstreamFetch {
            url: redacted(url),
            reason: format!("HTTP status {status}"),
        });
    }
    Ok(resp.text().await?)
}

/// Parses a base URL, making sure relative joins append to its path.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| ScrapeError::InvalidArgument(format!("bad base URL {raw:?}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| ScrapeError::InvalidArgument(format!("bad path {path:?}: {e}")))
}

/// URL text with the `apikey` query value masked, for logs and errors.
pub(crate) fn redacted(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "apikey") {
        return url.to_string();
    }
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
