//! Secure credential handling for HTTP providers.
//!
//! Credentials are wrapped immediately on load so they cannot appear in
//! Debug output or logs; the value is zeroed on drop and must be explicitly
//! exposed at the point of use.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from. Useful for diagnosing configuration
/// issues without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env_var
                ))
            })
    }

    /// Explicitly expose the credential value. Call only at the point of use
    /// (an HTTP header), never in a format string.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let cred = ApiCredential::new("sk-super-secret", CredentialSource::Programmatic, "test key");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_returns_value() {
        let cred = ApiCredential::new("sk-123", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.expose(), "sk-123");
        assert!(!cred.is_empty());
    }

    #[test]
    fn test_missing_env_var() {
        let result = ApiCredential::from_env("VETTER_TEST_KEY_THAT_DOES_NOT_EXIST", "test key");
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
