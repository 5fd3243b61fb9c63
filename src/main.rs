//! `news_tables` command-line entry point.
//!
//! Resolves credentials, runs one `query` or `top` call and prints the
//! resulting table as Markdown, or writes it as JSON.
//!
//! ```sh
//! NEWSAPI_KEY=... NEWSAPI_BASE_URL=https://newsapi.org/v2/ news_tables top -c us -g business
//! ```

use chrono::Local;
use clap::Parser;
use news_tables::outputs::{json, markdown};
use news_tables::{ArticleSource, ConnectionConfig};
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command, Format};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(command = ?args.command, format = ?args.format, "Parsed CLI arguments");

    let config = match ConnectionConfig::resolve(
        args.secrets.as_deref(),
        args.api_key.as_deref(),
        args.base_url.as_deref(),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration is incomplete");
            return Err(e.into());
        }
    };
    let source = ArticleSource::connect(config)?;

    let (title, outcome) = match &args.command {
        Command::Query { topic } => (format!("Articles about \"{topic}\""), source.query(topic).await),
        Command::Top { country, category } => (
            format!("Top {category} headlines ({country})"),
            source.top(country, category).await,
        ),
    };
    let table = outcome?;

    match (args.format, &args.output) {
        (Format::Json, Some(path)) => json::write_table(&table, path).await?,
        (Format::Json, None) => println!("{}", json::table_to_json(&table)?),
        (Format::Markdown, output) => {
            let md = format!(
                "# {title}\n\n_Fetched {}, {} articles_\n\n{}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                table.len(),
                markdown::table_to_markdown(&table, args.max_cell)
            );
            match output {
                Some(path) => {
                    tokio::fs::write(path, md).await?;
                    info!(path = %path.display(), "Wrote Markdown table");
                }
                None => print!("{md}"),
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, rows = table.len(), "Execution complete");
    Ok(())
}
