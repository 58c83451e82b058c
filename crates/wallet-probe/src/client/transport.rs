//! Transport abstraction and the values that cross it.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Url;
use thiserror::Error;

/// A single GET against the balance endpoint.
#[derive(Debug, Clone)]
pub struct BalanceRequest {
    /// Fully built endpoint URL.
    pub url: Url,

    /// Request headers, `Authorization` marked sensitive.
    pub headers: HeaderMap,

    /// Per-request timeout, if any.
    pub timeout: Option<Duration>,
}

/// Response as received from the wire, body not yet decoded.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response headers. Repeated names are joined with `", "`.
    pub headers: BTreeMap<String, String>,

    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// Failures a transport can report.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, TLS, blocked).
    #[error("{0}")]
    Fetch(String),

    /// No response within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Headers arrived but the body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Sends a [`BalanceRequest`] and returns the raw response.
///
/// Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: BalanceRequest) -> Result<RawResponse, TransportError>;
}

/// Flatten a header map into name/value pairs, joining repeated names.
pub(crate) fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}
