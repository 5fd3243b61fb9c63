//! Data models for article tables and cache keys.
//!
//! - [`ArticleRecord`]: one article exactly as the API returned it
//! - [`ArticleTable`]: ordered rows plus the union of their columns
//! - [`QueryKey`]: identity of a request, used to key the cache
//!
//! Records are kept as opaque JSON objects. The adapter never enforces a
//! schema, so fields the API adds later flow through untouched.

use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A single article as returned by the API, field-for-field.
pub type ArticleRecord = Map<String, Value>;

/// Ordered collection of articles exposed as rows and columns.
///
/// Row order is the order the API returned. Columns are the union of all
/// record keys, in the order each key was first seen. A record that lacks a
/// column simply has no value for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleTable {
    columns: Vec<String>,
    rows: Vec<ArticleRecord>,
}

impl ArticleTable {
    /// Build a table from records, deriving the column set.
    pub fn from_records(rows: Vec<ArticleRecord>) -> Self {
        let columns = rows
            .iter()
            .flat_map(|row| row.keys())
            .unique()
            .cloned()
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ArticleRecord] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, one entry per row. Rows without the field
    /// yield `None`. Returns `None` if no row has the column at all.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        if !self.columns.iter().any(|c| c == name) {
            return None;
        }
        Some(self.rows.iter().map(|row| row.get(name)).collect())
    }

    /// Single cell lookup.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// Identity of an upstream request, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Free-text search over all articles.
    Everything { topic: String },
    /// Top headlines for a country and category.
    TopHeadlines { country: String, category: String },
}

impl QueryKey {
    /// API endpoint path, relative to the base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Everything { .. } => "everything",
            Self::TopHeadlines { .. } => "top-headlines",
        }
    }

    /// Query parameters in wire order, excluding the API key.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Everything { topic } => vec![("q", topic.as_str())],
            Self::TopHeadlines { country, category } => {
                vec![("country", country.as_str()), ("category", category.as_str())]
            }
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everything { topic } => write!(f, "everything(q={topic})"),
            Self::TopHeadlines { country, category } => {
                write!(f, "top-headlines(country={country}, category={category})")
            }
        }
    }
}
