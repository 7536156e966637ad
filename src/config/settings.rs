//! # Provider Settings
//!
//! Connection settings for the policy server, validated once after every
//! source has been merged.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::{Error, Result};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Fully resolved connection settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProviderSettings {
    /// Base URL of the policy server, e.g. `https://10.9.8.7`
    #[validate(custom(function = "validate_server_url"))]
    pub server: String,

    #[validate(length(min = 1, message = "User cannot be empty"))]
    pub user: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,

    /// Skip TLS certificate verification
    pub insecure: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl ProviderSettings {
    /// Validate the merged settings
    pub fn validate_settings(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.server.trim_end_matches('/')
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"***")
            .field("insecure", &self.insecure)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn validate_server_url(server: &str) -> std::result::Result<(), ValidationError> {
    let parsed = url::Url::parse(server).map_err(|_| {
        let mut error = ValidationError::new("invalid_url");
        error.message = Some("Server must be a valid URL".into());
        error
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        _ => {
            let mut error = ValidationError::new("invalid_scheme");
            error.message = Some("Server must be an http or https URL with a host".into());
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProviderSettings {
        ProviderSettings {
            server: "https://psm.example.com/".to_string(),
            user: "admin".to_string(),
            password: "secret".to_string(),
            insecure: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(settings().validate_settings().is_ok());
        assert_eq!(settings().base_url(), "https://psm.example.com");
        assert_eq!(settings().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_server() {
        let mut s = settings();
        s.server = "psm.example.com".to_string();
        let error = s.validate_settings().unwrap_err();
        assert!(error.is_configuration());

        s.server = "ftp://psm.example.com".to_string();
        assert!(s.validate_settings().is_err());
    }

    #[test]
    fn test_timeout_range() {
        let mut s = settings();
        s.timeout_seconds = 0;
        assert!(s.validate_settings().is_err());
        s.timeout_seconds = 301;
        assert!(s.validate_settings().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", settings());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("***"));
    }
}
