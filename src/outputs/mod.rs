//! Output rendering for article tables.
//!
//! # Submodules
//!
//! - [`json`]: Writes the table rows as a JSON array file
//! - [`markdown`]: Renders the table as a Markdown table for reading

pub mod json;
pub mod markdown;
