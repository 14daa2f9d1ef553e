//! Configuration for the verification client
//!
//! The service base URL has no default and must be provided. Front ends map
//! `PHILID_API_URL` and `PHILID_REQUEST_TIMEOUT_SECS` onto `ClientConfig::new`.

use anyhow::Result;
use std::time::Duration;

use crate::client::VALIDATE_PATH;

/// Default whole-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Verification client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the verification service, without trailing slash
    pub api_url: String,

    /// Timeout applied to the whole request/response exchange
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration from an explicit base URL
    pub fn new(api_url: &str, request_timeout: Duration) -> Result<Self> {
        let config = Self {
            api_url: normalize_url(api_url)?,
            request_timeout,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            anyhow::bail!("PHILID_REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        Ok(())
    }

    /// Full URL of the validation endpoint
    pub fn validate_endpoint(&self) -> String {
        format!("{}{}", self.api_url, VALIDATE_PATH)
    }
}

fn normalize_url(raw: &str) -> Result<String> {
    let scheme_and_rest = raw
        .trim()
        .split_once("://")
        .filter(|(scheme, _)| *scheme == "http" || *scheme == "https");
    let Some((scheme, rest)) = scheme_and_rest else {
        anyhow::bail!("PHILID_API_URL must start with http:// or https://, got '{}'", raw);
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        anyhow::bail!("PHILID_API_URL has no host: '{}'", raw);
    }

    Ok(format!("{}://{}", scheme, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = ClientConfig::new("http://localhost:5000", Duration::from_secs(30))
            .expect("Failed to build config");

        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_validate_endpoint_strips_trailing_slash() {
        let config =
            ClientConfig::new("https://verify.example.com/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            config.validate_endpoint(),
            "https://verify.example.com/api/validate"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(ClientConfig::new("ftp://example.com", Duration::from_secs(5)).is_err());
        assert!(ClientConfig::new("localhost:5000", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_rejects_missing_host() {
        let err = ClientConfig::new("http://", Duration::from_secs(5)).unwrap_err();
        assert!(err.to_string().contains("has no host"));
        assert!(ClientConfig::new("https:///", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let result = ClientConfig::new("http://localhost:5000", Duration::ZERO);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be greater than 0"));
    }
}
