//! JSON output of an article table.
//!
//! The rows are written as a JSON array of the original article objects,
//! exactly as the API returned them.

use crate::models::ArticleTable;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize the rows of `table` as a pretty-printed JSON array.
pub fn table_to_json(table: &ArticleTable) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(table.rows())
}

/// Write `table` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = table.len()))]
pub async fn write_table(table: &ArticleTable, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = table_to_json(table)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON table");
    Ok(())
}
