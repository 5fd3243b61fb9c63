//! Command-line interface definitions for News Tables.
//!
//! Credentials come from flags, from the `NEWSAPI_KEY` / `NEWSAPI_BASE_URL`
//! environment variables, or from a YAML secrets file.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the News Tables application.
///
/// # Examples
///
/// ```sh
/// # Search everything for a topic, print a Markdown table
/// news_tables query "rust language"
///
/// # Top business headlines in the US, written as JSON
/// news_tables --format json --output ./out/us-business.json top -c us -g business
///
/// # Credentials from a secrets file
/// news_tables --secrets ./secrets.yaml query climate
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// NewsAPI base URL, e.g. https://newsapi.org/v2/
    #[arg(long, env = "NEWSAPI_BASE_URL")]
    pub base_url: Option<String>,

    /// YAML secrets file holding NEWSAPI_KEY and NEWSAPI_BASE_URL (takes precedence over --api-key/--base-url)
    #[arg(short, long)]
    pub secrets: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
    pub format: Format,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum characters per Markdown cell
    #[arg(long, default_value_t = 80)]
    pub max_cell: usize,

    #[command(subcommand)]
    pub command: Command,
}

/// The two API operations.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Search all articles for a free-text topic
    Query {
        /// Search terms
        topic: String,
    },
    /// Top headlines for a country and category
    Top {
        /// 2-letter ISO 3166-1 country code
        #[arg(short, long)]
        country: String,

        /// Category, e.g. business, entertainment, general, health, science, sports, technology
        #[arg(short = 'g', long)]
        category: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Json,
}
