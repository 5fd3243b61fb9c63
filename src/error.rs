//! Error types for configuration and article fetching.
//!
//! Configuration problems are fatal and surface as [`ConfigError`] when a
//! [`ConnectionConfig`](crate::config::ConnectionConfig) is built. Everything
//! that can go wrong afterwards, while talking to the news API, is a
//! [`FetchError`]. Fetch errors are `Clone` so a failed outcome can be stored
//! in the cache and handed out again on later hits.

use thiserror::Error;

/// Failure to resolve the connection configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was absent or empty.
    #[error("missing required configuration value `{0}`")]
    Missing(&'static str),

    /// The base URL could not be parsed or is not http(s).
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The secrets file could not be read.
    #[error("failed to read secrets file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The secrets file is not valid YAML.
    #[error("failed to parse secrets file `{path}`: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The HTTP client could not be constructed (TLS backend failure).
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Status,
    Parse,
    Shape,
}

/// Failure while fetching or shaping articles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connect, TLS or timeout failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    ///
    /// `code` and `message` are lifted from a NewsAPI error document
    /// (`{"status":"error","code":..,"message":..}`) when the body is one.
    #[error("HTTP {status}{}", describe_api_error(.code, .message))]
    Status {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    /// The body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Parse(String),

    /// The JSON did not have the expected `articles` layout.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Shape(_) => ErrorKind::Shape,
        }
    }
}

fn describe_api_error(code: &Option<String>, message: &Option<String>) -> String {
    match (code, message) {
        (Some(c), Some(m)) => format!(" ({c}): {m}"),
        (Some(c), None) => format!(" ({c})"),
        (None, Some(m)) => format!(": {m}"),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_with_api_error() {
        let err = FetchError::Status {
            status: 401,
            code: Some("apiKeyInvalid".to_string()),
            message: Some("Your API key is invalid.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 401 (apiKeyInvalid): Your API key is invalid."
        );
    }

    #[test]
    fn test_status_display_bare() {
        let err = FetchError::Status {
            status: 500,
            code: None,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_kind() {
        assert_eq!(FetchError::Parse("eof".into()).kind(), ErrorKind::Parse);
        assert_eq!(FetchError::Shape("x".into()).kind(), ErrorKind::Shape);
        assert_eq!(
            FetchError::Transport("refused".into()).kind(),
            ErrorKind::Transport
        );
    }
}
