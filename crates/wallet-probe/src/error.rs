//! Probe error types.

use thiserror::Error;

/// Messages a fetch layer produces when a request is blocked or never reaches
/// the server (Chromium, Firefox and WebKit wording, lowercased).
const FETCH_FAILURE_PATTERNS: &[&str] = &[
    "failed to fetch",
    "networkerror when attempting to fetch resource",
    "load failed",
];

/// Remediation hints logged alongside a likely CORS failure.
const CORS_REMEDIATION: &[&str] = &[
    "Inspect the network tab (or a packet capture) for the blocked request",
    "Look for CORS-related messages next to the failure",
    "Check the server CORS configuration for this origin",
];

/// Errors that can occur while probing the balance endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An input constraint was violated; nothing was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The environment could not be turned into a probe configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The transport could not complete the exchange.
    #[error("Network error: {0}")]
    Network(String),

    /// Generic fetch-layer failure, most likely a CORS rejection.
    ///
    /// This is a heuristic: DNS failures and refused connections produce
    /// the same message.
    #[error("Network error (likely CORS): {0}")]
    LikelyCors(String),

    /// A response arrived but its body is not JSON.
    #[error("Decode error (status {status}): {message}")]
    Decode { status: u16, message: String },
}

impl ProbeError {
    /// Classify a transport failure message.
    ///
    /// Returns [`ProbeError::LikelyCors`] when the message matches a known
    /// generic fetch failure, [`ProbeError::Network`] otherwise.
    pub fn from_transport_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if looks_like_fetch_failure(&message) {
            ProbeError::LikelyCors(message)
        } else {
            ProbeError::Network(message)
        }
    }

    /// Stable label used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::InvalidInput(_) => "InvalidInput",
            ProbeError::Config(_) => "ConfigError",
            ProbeError::Network(_) => "NetworkError",
            ProbeError::LikelyCors(_) => "LikelyCORSError",
            ProbeError::Decode { .. } => "DecodeError",
        }
    }

    /// True for both plain network failures and likely CORS failures.
    pub fn is_network(&self) -> bool {
        matches!(self, ProbeError::Network(_) | ProbeError::LikelyCors(_))
    }

    /// True when the failure was classified as a likely CORS rejection.
    pub fn is_likely_cors(&self) -> bool {
        matches!(self, ProbeError::LikelyCors(_))
    }

    /// Hints worth showing the operator, empty unless CORS is suspected.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            ProbeError::LikelyCors(_) => CORS_REMEDIATION,
            _ => &[],
        }
    }
}

/// Case-insensitive substring match against [`FETCH_FAILURE_PATTERNS`].
pub fn looks_like_fetch_failure(message: &str) -> bool {
    let lowered = message.to_lowercase();
    FETCH_FAILURE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProbeError::LikelyCors("Failed to fetch".to_string());
        assert_eq!(err.to_string(), "Network error (likely CORS): Failed to fetch");

        let err = ProbeError::Decode {
            status: 502,
            message: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Decode error (status 502): expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_classify_fetch_failure() {
        let err = ProbeError::from_transport_message("TypeError: Failed to fetch");
        assert!(err.is_likely_cors());
        assert!(err.is_network());
        assert_eq!(err.kind(), "LikelyCORSError");
        assert_eq!(err.remediation().len(), 3);

        let err = ProbeError::from_transport_message(
            "NetworkError when attempting to fetch resource.",
        );
        assert!(err.is_likely_cors());
    }

    #[test]
    fn test_classify_other_network_failure() {
        let err = ProbeError::from_transport_message("operation timed out");
        assert!(matches!(err, ProbeError::Network(_)));
        assert!(err.is_network());
        assert!(!err.is_likely_cors());
        assert!(err.remediation().is_empty());
    }

    #[test]
    fn test_decode_is_not_network() {
        let err = ProbeError::Decode {
            status: 200,
            message: "expected ident at line 1 column 2".to_string(),
        };
        assert!(!err.is_network());
        assert_eq!(err.kind(), "DecodeError");
    }
}
