//! Connection configuration for the news API.
//!
//! A [`ConnectionConfig`] is resolved once, validated, and then handed to
//! [`ArticleSource`](crate::api::ArticleSource) by value. It can be built
//! directly, from the process environment, or from a YAML secrets file that
//! uses the same two keys as the environment:
//!
//! ```yaml
//! NEWSAPI_KEY: "0123456789abcdef"
//! NEWSAPI_BASE_URL: "https://newsapi.org/v2/"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, instrument};
use url::Url;

/// Environment / secrets key holding the API key.
pub const API_KEY_VAR: &str = "NEWSAPI_KEY";
/// Environment / secrets key holding the API base URL.
pub const BASE_URL_VAR: &str = "NEWSAPI_BASE_URL";

/// Immutable credentials and endpoint root for the news API.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    api_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "NEWSAPI_KEY")]
    api_key: Option<String>,
    #[serde(rename = "NEWSAPI_BASE_URL")]
    base_url: Option<String>,
}

impl ConnectionConfig {
    /// Validate and build a configuration.
    ///
    /// The key must be non-empty after trimming. The base URL must be an
    /// absolute `http` or `https` URL; a trailing `/` is appended when
    /// missing so that endpoint names resolve beneath it rather than
    /// replacing its last path segment.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::Missing(API_KEY_VAR));
        }

        let raw = base_url.trim();
        if raw.is_empty() {
            return Err(ConfigError::Missing(BASE_URL_VAR));
        }
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };

        let base_url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme `{}`", base_url.scheme()),
            });
        }
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL cannot serve as a base".to_string(),
            });
        }
        if base_url.query().is_some() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "base URL must not carry a query string".to_string(),
            });
        }

        Ok(Self { api_key, base_url })
    }

    /// Read `NEWSAPI_KEY` and `NEWSAPI_BASE_URL` from the environment.
    #[instrument(level = "debug")]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve both values through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        Self::new(api_key, &base_url)
    }

    /// Resolve from command-line sources: a secrets file, when given, wins
    /// over the explicit key and base URL (which may themselves come from
    /// the environment).
    pub fn resolve(
        secrets: Option<&Path>,
        api_key: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = secrets {
            return Self::from_secrets_file(path);
        }
        Self::from_lookup(|name| match name {
            API_KEY_VAR => api_key.map(str::to_string),
            BASE_URL_VAR => base_url.map(str::to_string),
            _ => None,
        })
    }

    /// Load the configuration from a YAML secrets file.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_secrets_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_secrets_str(&text).map_err(|e| match e {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    fn from_secrets_str(text: &str) -> Result<Self, ConfigError> {
        let secrets: SecretsFile =
            serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
                path: String::from("<inline>"),
                source,
            })?;
        debug!(
            has_key = secrets.api_key.is_some(),
            has_base_url = secrets.base_url.is_some(),
            "Parsed secrets file"
        );
        let api_key = secrets.api_key.ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let base_url = secrets.base_url.ok_or(ConfigError::Missing(BASE_URL_VAR))?;
        Self::new(api_key, &base_url)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The normalized base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_new_appends_trailing_slash() {
        let config = ConnectionConfig::new("key", "https://newsapi.org/v2").unwrap();
        assert_eq!(config.base_url().as_str(), "https://newsapi.org/v2/");
    }

    #[test]
    fn test_new_keeps_trailing_slash() {
        let config = ConnectionConfig::new("key", "https://newsapi.org/v2/").unwrap();
        assert_eq!(config.base_url().as_str(), "https://newsapi.org/v2/");
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = ConnectionConfig::new("   ", "https://newsapi.org/v2/").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_KEY_VAR)));
    }

    #[test]
    fn test_new_rejects_bad_url() {
        let err = ConnectionConfig::new("key", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ConnectionConfig::new("key", "ftp://example.com/").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ConnectionConfig::new("key", "https://example.com/?a=b").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (API_KEY_VAR, "abc123"),
            (BASE_URL_VAR, "http://localhost:8080/v2/"),
        ]);
        let config =
            ConnectionConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_key(), "abc123");
        assert_eq!(config.base_url().as_str(), "http://localhost:8080/v2/");
    }

    #[test]
    fn test_from_lookup_missing_base_url() {
        let err = ConnectionConfig::from_lookup(|name| {
            (name == API_KEY_VAR).then(|| "abc123".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(BASE_URL_VAR)));
    }

    #[test]
    fn test_from_secrets_str() {
        let yaml = "NEWSAPI_KEY: \"k\"\nNEWSAPI_BASE_URL: \"https://newsapi.org/v2/\"\n";
        let config = ConnectionConfig::from_secrets_str(yaml).unwrap();
        assert_eq!(config.api_key(), "k");
    }

    #[test]
    fn test_from_secrets_str_missing_key() {
        let yaml = "NEWSAPI_BASE_URL: \"https://newsapi.org/v2/\"\n";
        let err = ConnectionConfig::from_secrets_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_KEY_VAR)));
    }

    #[test]
    fn test_from_secrets_file_not_found() {
        let err = ConnectionConfig::from_secrets_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    fn secrets_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_secrets_file_valid() {
        let file = secrets_file("NEWSAPI_KEY: \"file-key\"\nNEWSAPI_BASE_URL: \"https://newsapi.org/v2\"\n");
        let config = ConnectionConfig::from_secrets_file(file.path()).unwrap();
        assert_eq!(config.api_key(), "file-key");
        assert_eq!(config.base_url().as_str(), "https://newsapi.org/v2/");
    }

    #[test]
    fn test_from_secrets_file_malformed_reports_real_path() {
        let file = secrets_file("NEWSAPI_KEY: [unterminated\n");
        let err = ConnectionConfig::from_secrets_file(file.path()).unwrap_err();
        match err {
            ConfigError::Yaml { path, .. } => {
                assert_eq!(path, file.path().display().to_string());
                assert_ne!(path, "<inline>");
            }
            other => panic!("expected a YAML error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_secrets_file_missing_key() {
        let file = secrets_file("NEWSAPI_BASE_URL: \"https://newsapi.org/v2/\"\n");
        let err = ConnectionConfig::from_secrets_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_KEY_VAR)));
    }

    #[test]
    fn test_resolve_secrets_file_wins_over_flags() {
        let file = secrets_file("NEWSAPI_KEY: \"file-key\"\nNEWSAPI_BASE_URL: \"https://file.example/v2/\"\n");
        let config = ConnectionConfig::resolve(
            Some(file.path()),
            Some("flag-key"),
            Some("https://flag.example/v2/"),
        )
        .unwrap();
        assert_eq!(config.api_key(), "file-key");
        assert_eq!(config.base_url().as_str(), "https://file.example/v2/");
    }

    #[test]
    fn test_resolve_from_flags() {
        let config =
            ConnectionConfig::resolve(None, Some("flag-key"), Some("https://flag.example/v2")).unwrap();
        assert_eq!(config.api_key(), "flag-key");
        assert_eq!(config.base_url().as_str(), "https://flag.example/v2/");

        let err = ConnectionConfig::resolve(None, Some("flag-key"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(BASE_URL_VAR)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ConnectionConfig::new("supersecret", "https://newsapi.org/v2/").unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("supersecret"));
        assert!(shown.contains("<redacted>"));
    }
}
