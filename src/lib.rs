//! # News Tables
//!
//! A thin adapter over a NewsAPI-compatible REST service that returns
//! article search results and top headlines as display-ready tables.
//!
//! ## Features
//!
//! - Free-text search (`everything`) and top headlines by country/category
//! - Responses shaped into an [`ArticleTable`] with rows in API order and
//!   columns as the union of article fields
//! - Explicit, swappable TTL cache ([`ArticleCache`]) with a visible policy
//!   for caching failures
//! - Typed failures ([`FetchError`]) plus an optional [`ErrorSurface`] for
//!   user-facing messages
//! - Markdown and JSON renderers for tables
//!
//! ## Usage
//!
//! ```no_run
//! use news_tables::{ArticleSource, ConnectionConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectionConfig::from_env()?;
//! let source = ArticleSource::connect(config)?;
//! let table = source.top("us", "business").await?;
//! println!("{} headlines", table.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod surface;
pub mod utils;

pub use api::{ArticleSource, ArticleSourceBuilder};
pub use cache::{ArticleCache, CachePolicy, DEFAULT_TTL, MemoryCache, Outcome};
pub use config::ConnectionConfig;
pub use error::{ConfigError, ErrorKind, FetchError};
pub use models::{ArticleRecord, ArticleTable, QueryKey};
pub use surface::{ErrorSurface, NullSurface, TracingSurface};
