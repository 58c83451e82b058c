//! reqwest-backed transport.

use std::error::Error as _;

use async_trait::async_trait;

use super::transport::{collect_headers, BalanceRequest, RawResponse, Transport, TransportError};

/// HTTP transport built on a shared [`reqwest::Client`].
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with client defaults (no overall timeout).
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wallet-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Create a transport with a custom client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: BalanceRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.get(request.url).headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(send_error)?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(error_chain(&e))
            } else {
                TransportError::Body(error_chain(&e))
            }
        })?;

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Map a send failure the way a browser fetch layer surfaces it.
fn send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(error_chain(&e))
    } else {
        TransportError::Fetch(format!("Failed to fetch: {}", error_chain(&e)))
    }
}

/// Render an error with its sources, `outer: inner: root`.
fn error_chain(e: &reqwest::Error) -> String {
    let mut rendered = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
