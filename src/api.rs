//! NewsAPI adapter: request, validate, shape, cache.
//!
//! [`ArticleSource`] turns two calls into HTTP requests against a
//! NewsAPI-compatible service and turns the JSON answer into an
//! [`ArticleTable`]:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | [`ArticleSource::query`] | `{base}everything?q={topic}&apiKey={key}` |
//! | [`ArticleSource::top`] | `{base}top-headlines?country={cc}&category={cat}&apiKey={key}` |
//!
//! # Pipeline
//!
//! 1. **Cache lookup**: a fresh entry for the same arguments is returned as-is
//! 2. **Fetch**: one GET, any non-2xx status is a failure, body parsed as JSON
//! 3. **Shape**: the `articles` array becomes the table rows
//! 4. **Store**: the outcome is cached for the TTL (failures too, by default)
//!
//! Every failure reaches the caller as a [`FetchError`] and is additionally
//! reported once to the configured [`ErrorSurface`]. There is no retry and
//! no timeout beyond the HTTP client's defaults. Concurrent misses on the
//! same key are not de-duplicated; each issues its own request.

use crate::cache::{ArticleCache, CachePolicy, DEFAULT_TTL, MemoryCache, Outcome};
use crate::config::ConnectionConfig;
use crate::error::{ConfigError, FetchError};
use crate::models::{ArticleTable, QueryKey};
use crate::surface::{ErrorSurface, TracingSurface};
use crate::utils::{error_chain, redact_url, truncate_for_log};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Body NewsAPI sends alongside an error status.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Adapter between this crate's calls and the news API's wire format.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct ArticleSource {
    config: ConnectionConfig,
    client: reqwest::Client,
    cache: Arc<dyn ArticleCache>,
    surface: Arc<dyn ErrorSurface>,
    policy: CachePolicy,
    default_ttl: Duration,
}

impl fmt::Debug for ArticleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleSource")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ArticleSource`] with injectable cache and error surface.
pub struct ArticleSourceBuilder {
    config: ConnectionConfig,
    client: Option<reqwest::Client>,
    cache: Option<Arc<dyn ArticleCache>>,
    surface: Option<Arc<dyn ErrorSurface>>,
    policy: CachePolicy,
    default_ttl: Duration,
}

impl ArticleSourceBuilder {
    /// Use a specific cache store. Defaults to a fresh [`MemoryCache`].
    pub fn cache(mut self, cache: Arc<dyn ArticleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Where failure messages go. Defaults to [`TracingSurface`].
    pub fn surface(mut self, surface: Arc<dyn ErrorSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// TTL used by [`ArticleSource::query`] and [`ArticleSource::top`].
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Supply a preconfigured `reqwest::Client`.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<ArticleSource, ConfigError> {
        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(ConfigError::HttpClient)?,
        };

        info!(
            base_url = %self.config.base_url(),
            default_ttl_secs = self.default_ttl.as_secs(),
            cache_failures = self.policy.cache_failures,
            "ArticleSource connected"
        );

        Ok(ArticleSource {
            config: self.config,
            client,
            cache: self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new())),
            surface: self.surface.unwrap_or_else(|| Arc::new(TracingSurface)),
            policy: self.policy,
            default_ttl: self.default_ttl,
        })
    }
}

impl ArticleSource {
    /// Build an adapter with default cache, surface, policy and TTL.
    pub fn connect(config: ConnectionConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ConnectionConfig) -> ArticleSourceBuilder {
        ArticleSourceBuilder {
            config,
            client: None,
            cache: None,
            surface: None,
            policy: CachePolicy::default(),
            default_ttl: DEFAULT_TTL,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Search all articles for `topic`, cached for the default TTL.
    pub async fn query(&self, topic: &str) -> Outcome {
        self.query_with_ttl(topic, self.default_ttl).await
    }

    /// Search all articles for `topic`, cached for `ttl`.
    pub async fn query_with_ttl(&self, topic: &str, ttl: Duration) -> Outcome {
        let key = QueryKey::Everything {
            topic: topic.to_string(),
        };
        self.load(key, ttl).await
    }

    /// Top headlines for a 2-letter country code and a category, cached for
    /// the default TTL. Neither argument is validated locally.
    pub async fn top(&self, country: &str, category: &str) -> Outcome {
        self.top_with_ttl(country, category, self.default_ttl).await
    }

    /// Top headlines for `country` and `category`, cached for `ttl`.
    pub async fn top_with_ttl(&self, country: &str, category: &str, ttl: Duration) -> Outcome {
        let key = QueryKey::TopHeadlines {
            country: country.to_string(),
            category: category.to_string(),
        };
        self.load(key, ttl).await
    }

    /// Full request URL for `key`, parameters percent-encoded, key last.
    pub fn request_url(&self, key: &QueryKey) -> Url {
        let mut url = self.config.base_url().clone();
        // Config validation guarantees the base URL can take path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(key.endpoint());
        }
        url.query_pairs_mut()
            .extend_pairs(key.params())
            .append_pair("apiKey", self.config.api_key());
        url
    }

    #[instrument(level = "info", skip_all, fields(%key, ttl_secs = ttl.as_secs()))]
    async fn load(&self, key: QueryKey, ttl: Duration) -> Outcome {
        if let Some(hit) = self.cache.get(&key) {
            debug!(ok = hit.is_ok(), "Cache hit");
            return hit;
        }
        debug!("Cache miss");

        let url = self.request_url(&key);
        let outcome = self
            .fetch_json(&url)
            .await
            .and_then(Self::shape_articles)
            .map(Arc::new);

        match &outcome {
            Ok(table) => info!(rows = table.len(), columns = table.columns().len(), "Fetched articles"),
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "Fetch failed");
                self.surface
                    .report(&format!("Error: {e} for URL: {}", redact_url(&url)));
            }
        }

        if self.policy.should_store(&outcome) {
            self.cache.put(key, outcome.clone(), ttl);
        }
        outcome
    }

    /// Issue one GET and parse the body as JSON.
    ///
    /// Any non-2xx status is a [`FetchError::Status`]; when the body is a
    /// NewsAPI error document its `code` and `message` are attached.
    #[instrument(level = "debug", skip_all, fields(url = %redact_url(url)))]
    pub async fn fetch_json(&self, url: &Url) -> Result<Value, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(error_chain(&e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            // A body that cannot be read must not mask the status.
            let body = response.text().await.ok();
            debug!(status = status.as_u16(), elapsed = ?t0.elapsed(), "Received error status");
            let (code, message) = body
                .and_then(|b| serde_json::from_str::<ApiErrorBody>(&b).ok())
                .map(|b| (b.code, b.message))
                .unwrap_or((None, None));
            return Err(FetchError::Status {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(error_chain(&e.without_url())))?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed = ?t0.elapsed(),
            "Received response"
        );

        serde_json::from_str(&body).map_err(|e| {
            debug!(body_preview = %truncate_for_log(&body, 300), "Body is not JSON");
            FetchError::Parse(e.to_string())
        })
    }

    /// Materialize the `articles` array of a response as a table.
    ///
    /// A missing or `null` `articles` key yields an empty table. A non-object
    /// response, a non-array `articles` value, or a non-object element is a
    /// [`FetchError::Shape`].
    pub fn shape_articles(json: Value) -> Result<ArticleTable, FetchError> {
        let mut root = match json {
            Value::Object(root) => root,
            other => {
                return Err(FetchError::Shape(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )));
            }
        };

        let items = match root.remove("articles") {
            None | Some(Value::Null) => return Ok(ArticleTable::default()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(FetchError::Shape(format!(
                    "`articles` is {}, expected an array",
                    json_type(&other)
                )));
            }
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(FetchError::Shape(format!(
                    "article {i} is {}, expected an object",
                    json_type(&other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ArticleTable::from_records(records))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
