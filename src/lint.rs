//! Table existence linting
//!
//! Checks every table reference of a query against a metadata source and
//! reports the ones that do not exist. Missing tables are remembered in a
//! [`TableExistenceCache`] so repeated runs skip the metadata lookup.

use crate::lineage::{Lineage, TableReference, get_lineage_with_default_schema};
use crate::table_cache::TableExistenceCache;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Source of truth for which tables exist
pub trait TableMetadata {
    fn table_exists(&self, schema: &str, name: &str) -> bool;
}

/// Fixed set of known `schema.name` tables, matched case-insensitively
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownTables {
    tables: HashSet<String>,
}

impl KnownTables {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tables: tables.into_iter().map(|table| table.as_ref().trim().to_lowercase()).collect(),
        }
    }

    /// Parse one `schema.name` per line; blank lines and `#` comments are ignored
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableMetadata for KnownTables {
    fn table_exists(&self, schema: &str, name: &str) -> bool {
        self.tables.contains(&format!("{schema}.{name}").to_lowercase())
    }
}

/// A reference to a table the metadata source does not know
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub statement: usize,
    pub table: TableReference,
    pub message: String,
}

/// Report every reference in `lineage` whose table does not exist
pub fn lint_missing_tables(
    lineage: &Lineage,
    metadata: &dyn TableMetadata,
    cache: &dyn TableExistenceCache,
) -> Vec<LintFinding> {
    let mut findings = Vec::new();
    for (statement, reference) in lineage.all_references() {
        let key = reference.full_name();
        let missing = if cache.has(&key) {
            true
        } else if metadata.table_exists(&reference.schema, &reference.name) {
            false
        } else {
            debug!("Table {} not found, caching", key);
            cache.insert(key.clone());
            true
        };

        if missing {
            findings.push(LintFinding {
                statement,
                table: reference.clone(),
                message: format!("Table {key} does not exist"),
            });
        }
    }
    findings
}

/// Tokenize, extract lineage and lint `query` in one go
pub fn lint_query(
    query: &str,
    dialect: &str,
    default_schema: &str,
    metadata: &dyn TableMetadata,
    cache: &dyn TableExistenceCache,
) -> Vec<LintFinding> {
    let lineage = get_lineage_with_default_schema(query, dialect, default_schema);
    lint_missing_tables(&lineage, metadata, cache)
}
