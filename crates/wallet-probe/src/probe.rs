//! Wallet balance probe.
//!
//! Sends exactly one authenticated GET to `{origin}/v1/wallet/{user_id}/balance`,
//! logs what came back and decodes the body as JSON. Any HTTP status counts as
//! a response; only transport failures and undecodable bodies are errors.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Serialize;

use crate::client::{BalanceRequest, RawResponse, ReqwestTransport, Transport, TransportError};
use crate::config::{self, ProbeConfig};
use crate::error::ProbeError;

/// Decoded outcome of a probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response headers.
    pub headers: BTreeMap<String, String>,

    /// JSON body.
    pub body: serde_json::Value,
}

/// Balance endpoint probe over a pluggable transport.
pub struct Probe<T = ReqwestTransport> {
    transport: T,
}

impl Probe<ReqwestTransport> {
    /// Create a probe backed by reqwest.
    pub fn new() -> Self {
        Self {
            transport: ReqwestTransport::new(),
        }
    }
}

impl Default for Probe<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Probe<T> {
    /// Create a probe with a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Probe the balance endpoint and return the decoded JSON body.
    pub async fn run(&self, config: &ProbeConfig) -> Result<serde_json::Value, ProbeError> {
        self.execute(config).await.map(|response| response.body)
    }

    /// Probe the balance endpoint and return status, headers and body.
    ///
    /// Failures are logged before being returned.
    pub async fn execute(&self, config: &ProbeConfig) -> Result<ProbeResponse, ProbeError> {
        self.try_execute(config).await.inspect_err(report_failure)
    }

    async fn try_execute(&self, config: &ProbeConfig) -> Result<ProbeResponse, ProbeError> {
        let request = build_request(config)?;

        tracing::info!(
            url = %request.url,
            token = %config.token_preview(),
            "Probing wallet balance endpoint"
        );

        let raw = self.transport.send(request).await.map_err(classify)?;

        tracing::info!(status = raw.status, "Response status");
        tracing::info!(headers = ?raw.headers, "Response headers");

        let response = decode(raw)?;
        tracing::info!(body = %response.body, "Response data");

        Ok(response)
    }
}

/// Probe `{base_url}/v1/wallet/{user_id}/balance` with the given token.
///
/// Uses the reqwest transport with no timeout.
pub async fn run_probe(
    token: &str,
    user_id: u64,
    base_url: &str,
) -> Result<serde_json::Value, ProbeError> {
    let config = ProbeConfig::new(base_url, user_id, token).inspect_err(report_failure)?;
    Probe::new().run(&config).await
}

/// Build the balance endpoint URL for an origin.
///
/// The origin is re-validated since `ProbeConfig` fields are public.
pub fn balance_url(origin: &Url, user_id: u64) -> Result<Url, ProbeError> {
    config::validate_user_id(user_id)?;
    let origin = config::parse_origin(origin.as_str())?;

    let url = format!(
        "{}/v1/wallet/{}/balance",
        origin.as_str().trim_end_matches('/'),
        user_id
    );
    Url::parse(&url).map_err(|e| ProbeError::InvalidInput(format!("invalid balance url {url:?}: {e}")))
}

/// Headers sent with every probe.
pub fn request_headers(token: &str) -> Result<HeaderMap, ProbeError> {
    config::validate_token(token)?;

    let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ProbeError::InvalidInput(format!("token is not a valid header value: {e}")))?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Assemble the single request a probe sends.
pub fn build_request(config: &ProbeConfig) -> Result<BalanceRequest, ProbeError> {
    Ok(BalanceRequest {
        url: balance_url(&config.base_url, config.user_id)?,
        headers: request_headers(&config.token)?,
        timeout: config.timeout,
    })
}

fn classify(error: TransportError) -> ProbeError {
    match error {
        TransportError::Fetch(message) => ProbeError::from_transport_message(message),
        other => ProbeError::Network(other.to_string()),
    }
}

fn decode(raw: RawResponse) -> Result<ProbeResponse, ProbeError> {
    let body = serde_json::from_slice(&raw.body).map_err(|e| ProbeError::Decode {
        status: raw.status,
        message: e.to_string(),
    })?;

    Ok(ProbeResponse {
        status: raw.status,
        headers: raw.headers,
        body,
    })
}

fn report_failure(error: &ProbeError) {
    tracing::error!(kind = error.kind(), error = %error, "Wallet probe failed");

    if error.is_likely_cors() {
        tracing::error!("This is likely a CORS error (heuristic, the same message covers DNS and refused connections)");
        for hint in error.remediation() {
            tracing::error!("Check: {}", hint);
        }
    }
}
