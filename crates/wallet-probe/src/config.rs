//! Probe configuration.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Url;

use crate::error::ProbeError;

/// Default wallet service origin.
pub const DEFAULT_BASE_URL: &str = "https://wallet-service.example.com";

/// Default user to probe.
pub const DEFAULT_USER_ID: u64 = 1;

/// Balance probe configuration.
#[derive(Clone)]
pub struct ProbeConfig {
    /// Wallet service origin (scheme, host, optional port).
    pub base_url: Url,

    /// User whose balance is requested.
    pub user_id: u64,

    /// Bearer token sent in the `Authorization` header.
    pub token: String,

    /// Request timeout. `None` leaves the client default in place.
    pub timeout: Option<Duration>,
}

impl ProbeConfig {
    /// Build a configuration from explicit values, validating each one.
    pub fn new(base_url: &str, user_id: u64, token: impl Into<String>) -> Result<Self, ProbeError> {
        let token = token.into();
        validate_token(&token)?;
        validate_user_id(user_id)?;

        Ok(Self {
            base_url: parse_origin(base_url)?,
            user_id,
            token,
            timeout: None,
        })
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ProbeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("WALLET_PROBE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let user_id = match lookup("WALLET_PROBE_USER_ID") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ProbeError::Config(format!("WALLET_PROBE_USER_ID={raw:?} is not a valid user id: {e}"))
            })?,
            None => DEFAULT_USER_ID,
        };

        let token = lookup("WALLET_PROBE_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProbeError::Config("WALLET_PROBE_TOKEN is not set".to_string()))?;

        let timeout = match lookup("WALLET_PROBE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ProbeError::Config(format!("WALLET_PROBE_TIMEOUT_SECS={raw:?} is not a number: {e}"))
                })?;
                if secs == 0 {
                    return Err(ProbeError::Config(
                        "WALLET_PROBE_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self::new(&base_url, user_id, token)?.with_timeout(timeout))
    }

    /// First 50 characters of the token, for log output.
    pub fn token_preview(&self) -> String {
        token_preview(&self.token)
    }
}

// The token never appears in Debug output.
impl std::fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("base_url", &self.base_url.as_str())
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Truncate a token to 50 characters followed by `...`.
pub fn token_preview(token: &str) -> String {
    let preview: String = token.chars().take(50).collect();
    format!("{preview}...")
}

pub(crate) fn validate_token(token: &str) -> Result<(), ProbeError> {
    if token.is_empty() {
        return Err(ProbeError::InvalidInput("token must not be empty".to_string()));
    }
    if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ProbeError::InvalidInput(
            "token must not contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_user_id(user_id: u64) -> Result<(), ProbeError> {
    if user_id == 0 {
        return Err(ProbeError::InvalidInput("user id must be a positive integer".to_string()));
    }
    Ok(())
}

/// Parse and validate a service origin.
///
/// Accepts `https` origins, and `http` only for loopback hosts. Paths other
/// than `/`, queries, fragments and credentials are rejected.
pub fn parse_origin(raw: &str) -> Result<Url, ProbeError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ProbeError::InvalidInput(format!("base url {raw:?} is not a valid URL: {e}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::InvalidInput(format!("base url {raw:?} has no host")))?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback(host) => {}
        scheme => {
            return Err(ProbeError::InvalidInput(format!(
                "base url {raw:?} must use https (got {scheme})"
            )));
        }
    }

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ProbeError::InvalidInput(format!(
            "base url {raw:?} must be an origin without path, query or fragment"
        )));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(ProbeError::InvalidInput(format!(
            "base url {raw:?} must not embed credentials"
        )));
    }

    Ok(url)
}

fn is_loopback(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = ProbeConfig::from_lookup(lookup_from(&[("WALLET_PROBE_TOKEN", "abc")])).unwrap();
        assert_eq!(config.base_url.as_str(), "https://wallet-service.example.com/");
        assert_eq!(config.user_id, 1);
        assert_eq!(config.token, "abc");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("WALLET_PROBE_BASE_URL", "https://wallet.internal:8443"),
            ("WALLET_PROBE_USER_ID", "42"),
            ("WALLET_PROBE_TOKEN", "tok"),
            ("WALLET_PROBE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.port(), Some(8443));
        assert_eq!(config.user_id, 42);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_config_missing_token() {
        let err = ProbeConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));

        let err = ProbeConfig::from_lookup(lookup_from(&[("WALLET_PROBE_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_config_bad_numbers() {
        let err = ProbeConfig::from_lookup(lookup_from(&[
            ("WALLET_PROBE_TOKEN", "tok"),
            ("WALLET_PROBE_USER_ID", "-3"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));

        let err = ProbeConfig::from_lookup(lookup_from(&[
            ("WALLET_PROBE_TOKEN", "tok"),
            ("WALLET_PROBE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_token_is_trimmed_from_env() {
        let config = ProbeConfig::from_lookup(lookup_from(&[("WALLET_PROBE_TOKEN", "tok\n")])).unwrap();
        assert_eq!(config.token, "tok");
    }

    #[test]
    fn test_invalid_tokens_rejected() {
        for token in ["", "two words", "tab\tinside", " padded"] {
            let err = ProbeConfig::new(DEFAULT_BASE_URL, 1, token).unwrap_err();
            assert!(matches!(err, ProbeError::InvalidInput(_)), "token {:?}", token);
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ProbeConfig::from_lookup(lookup_from(&[
            ("WALLET_PROBE_TOKEN", "tok"),
            ("WALLET_PROBE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_zero_user_id_rejected() {
        let err = ProbeConfig::new(DEFAULT_BASE_URL, 0, "tok").unwrap_err();
        assert!(matches!(err, ProbeError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_origin() {
        assert!(parse_origin("https://wallet-service.example.com").is_ok());
        assert!(parse_origin("https://wallet-service.example.com/").is_ok());
        assert!(parse_origin("http://127.0.0.1:9000").is_ok());
        assert!(parse_origin("http://localhost:9000").is_ok());
        assert!(parse_origin("http://[::1]:9000").is_ok());

        assert!(parse_origin("http://wallet-service.example.com").is_err());
        assert!(parse_origin("https://wallet-service.example.com/api").is_err());
        assert!(parse_origin("https://wallet-service.example.com?x=1").is_err());
        assert!(parse_origin("https://user:pw@wallet-service.example.com").is_err());
        assert!(parse_origin("ftp://wallet-service.example.com").is_err());
        assert!(parse_origin("not a url").is_err());
    }

    #[test]
    fn test_token_preview() {
        let token = "a".repeat(80);
        let preview = token_preview(&token);
        assert_eq!(preview.len(), 53);
        assert!(preview.ends_with("..."));

        assert_eq!(token_preview("short"), "short...");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProbeConfig::new(DEFAULT_BASE_URL, 1, "super-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
