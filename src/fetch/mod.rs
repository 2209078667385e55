//! HTTP access for the live city feeds.
//!
//! All requests go through the [`HttpClient`] trait so auth wrappers can be
//! stacked and tests can point at a local server.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request URL: {url}")]
    InvalidUrl { url: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Issues a GET for `url` and decodes the response body as JSON.
///
/// # Errors
///
/// Returns [`FetchError`] on an unparseable URL, a transport failure, a
/// non-success status, or a body that is not valid JSON.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<Value, FetchError> {
    let parsed = url.parse().map_err(|_| FetchError::InvalidUrl {
        url: url.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
