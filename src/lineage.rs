//! Table and alias extraction per statement
//!
//! A small heuristic walker, not a parser. Each statement is scanned with a
//! single "table search" flag: keywords such as FROM or JOIN switch it on, the
//! next identifier becomes a table candidate, and identifiers right after a
//! candidate (optionally behind `AS`) become its aliases.
//!
//! The default schema is threaded from one statement to the next so that
//! `USE db` affects every statement after it.

use crate::lexer::tokenize;
use crate::statement::{filter_lineage_tokens, split_statements};
use crate::token::{Token, TokenType};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Schema assumed for unqualified table names until a `USE` says otherwise
pub const DEFAULT_SCHEMA: &str = "default";

const INITIAL_STATEMENT_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "with", "create", "alter", "drop", "describe",
    "desc", "show", "msck", "use",
];

/// Keywords that end the CTE name scan of a WITH statement
const DML_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "with", "create", "alter", "drop",
];

const TABLE_KEYWORDS: &[&str] = &["table", "from", "join", "into"];

/// Only trigger a table search as the first keyword of a statement
const INITIAL_TABLE_KEYWORDS: &[&str] = &["describe", "desc", "show", "msck"];

/// Keywords allowed between a trigger keyword and the table name
const CONTINUE_SEARCH_KEYWORDS: &[&str] = &[
    "if", "not", "exists", "formatted", "repair", "partitions", "extended",
];

/// A resolved physical table mentioned in a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableReference {
    pub schema: String,
    pub name: String,
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl TableReference {
    /// `schema.name`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Tables and aliases of every statement, keyed by statement index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lineage {
    pub references: BTreeMap<usize, Vec<TableReference>>,
    pub aliases: BTreeMap<usize, BTreeMap<String, TableReference>>,
}

impl Lineage {
    pub fn statement_count(&self) -> usize {
        self.references.len()
    }

    /// Every reference in statement order
    pub fn all_references(&self) -> impl Iterator<Item = (usize, &TableReference)> {
        self.references.iter().flat_map(|(index, references)| {
            references.iter().map(move |reference| (*index, reference))
        })
    }
}

/// Result of analyzing one statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementLineage {
    pub references: Vec<TableReference>,
    pub aliases: BTreeMap<String, TableReference>,
    /// Default schema in effect for the following statement
    pub default_schema: String,
}

/// Extract tables and aliases from one statement's lineage tokens.
///
/// `tokens` is a single statement as produced by
/// [`split_statements`] over [`filter_lineage_tokens`] output.
pub fn analyze_statement(tokens: &[Token], default_schema: &str) -> StatementLineage {
    let mut result = StatementLineage {
        default_schema: default_schema.to_string(),
        ..Default::default()
    };

    let first = match tokens.first() {
        Some(token) if token.is_keyword("explain") => 1,
        Some(_) => 0,
        None => return result,
    };
    let Some(lead) = tokens.get(first) else {
        return result;
    };
    if lead.token_type != TokenType::Keyword
        || !INITIAL_STATEMENT_KEYWORDS.contains(&lead.text.as_str())
    {
        return result;
    }

    if lead.is_keyword("use") {
        // schema names such as `default` lex as keywords
        let schema = tokens.get(first + 1).filter(|token| {
            matches!(token.token_type, TokenType::Variable | TokenType::Keyword)
        });
        if let Some(schema) = schema {
            result.default_schema = strip_backticks(&schema.text).to_lowercase();
        }
        return result;
    }

    let placeholders = if lead.is_keyword("with") {
        with_placeholders(tokens, first + 1)
    } else {
        HashSet::new()
    };

    // Token indices of table candidates, plus alias -> candidate index
    let mut candidates: Vec<usize> = Vec::new();
    let mut alias_candidates: Vec<(String, usize)> = Vec::new();
    let mut table_search = false;
    let mut last_table: Option<usize> = None;

    for (index, token) in tokens.iter().enumerate().skip(first) {
        match token.token_type {
            TokenType::Keyword => {
                let keyword = token.text.as_str();
                if TABLE_KEYWORDS.contains(&keyword) {
                    table_search = true;
                } else if index == first && INITIAL_TABLE_KEYWORDS.contains(&keyword) {
                    table_search = true;
                } else if !CONTINUE_SEARCH_KEYWORDS.contains(&keyword) {
                    table_search = false;
                }
            }
            TokenType::Bracket => table_search = false,
            TokenType::Variable if table_search => {
                if token.raw_type != TokenType::Placeholder
                    && !placeholders.contains(&token.text.to_lowercase())
                {
                    candidates.push(index);
                    last_table = Some(index);
                }
                table_search = false;
            }
            TokenType::Variable if index > 0 => {
                let Some(table_index) = last_table else {
                    continue;
                };
                let hive_style = table_index + 1 == index;
                let presto_style = table_index + 2 == index && tokens[index - 1].is_keyword("as");
                let alias = token.text.to_lowercase();
                if (hive_style || presto_style) && !placeholders.contains(&alias) {
                    alias_candidates.push((alias, table_index));
                }
            }
            _ => {}
        }
    }

    let mut resolved: BTreeMap<usize, TableReference> = BTreeMap::new();
    for index in candidates {
        let token = &tokens[index];
        match resolve_table_name(&token.text, &result.default_schema) {
            Some((schema, name)) => {
                let reference = TableReference {
                    schema,
                    name,
                    line: token.line,
                    start_col: token.start_col,
                    end_col: token.end_col,
                };
                result.references.push(reference.clone());
                resolved.insert(index, reference);
            }
            None => warn!(
                "Dropping table candidate '{}' at {}:{}",
                token.text, token.line, token.start_col
            ),
        }
    }

    for (alias, table_index) in alias_candidates {
        if let Some(reference) = resolved.get(&table_index) {
            result.aliases.insert(alias, reference.clone());
        }
    }

    result
}

/// CTE names introduced by a WITH statement, lowercased.
///
/// Scans from `start` to the first DML keyword, jumping over bracketed
/// sub-expressions.
fn with_placeholders(tokens: &[Token], start: usize) -> HashSet<String> {
    let mut placeholders = HashSet::new();
    let mut index = start;
    while let Some(token) = tokens.get(index) {
        if token.token_type == TokenType::Keyword && DML_KEYWORDS.contains(&token.text.as_str()) {
            break;
        }
        if token.is_open_bracket() {
            let close = token.bracket_match_index.unwrap_or(index);
            index = close.max(index) + 1;
            continue;
        }
        if token.token_type == TokenType::Variable {
            placeholders.insert(token.text.to_lowercase());
        }
        index += 1;
    }
    placeholders
}

/// Split a dotted identifier into lowercase `(schema, name)`.
///
/// Returns `None` unless there are one or two non-empty segments.
fn resolve_table_name(text: &str, default_schema: &str) -> Option<(String, String)> {
    let segments = split_identifier(text);
    if segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }
    match segments.as_slice() {
        [name] => Some((default_schema.to_string(), name.clone())),
        [schema, name] => Some((schema.clone(), name.clone())),
        _ => None,
    }
}

/// Split on dots outside backticks, stripping the backticks
fn split_identifier(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in text.chars() {
        match ch {
            '`' => quoted = !quoted,
            '.' if !quoted => segments.push(std::mem::take(&mut current).to_lowercase()),
            _ => current.push(ch),
        }
    }
    segments.push(current.to_lowercase());
    segments
}

fn strip_backticks(text: &str) -> String {
    text.chars().filter(|&ch| ch != '`').collect()
}

/// Analyze an already tokenized query
pub fn find_table_references(tokens: &[Token], default_schema: &str) -> Lineage {
    let statements = split_statements(&filter_lineage_tokens(tokens));
    let mut lineage = Lineage::default();
    let mut schema = default_schema.to_string();

    for (index, statement) in statements.iter().enumerate() {
        let analyzed = analyze_statement(statement, &schema);
        schema = analyzed.default_schema;
        lineage.references.insert(index, analyzed.references);
        lineage.aliases.insert(index, analyzed.aliases);
    }
    lineage
}

/// Tables and aliases of every statement in `query`
pub fn get_lineage(query: &str, dialect: &str) -> Lineage {
    get_lineage_with_default_schema(query, dialect, DEFAULT_SCHEMA)
}

pub fn get_lineage_with_default_schema(
    query: &str,
    dialect: &str,
    default_schema: &str,
) -> Lineage {
    find_table_references(&tokenize(query, dialect), default_schema)
}
