//! Best-effort SQL lexer and statement analyzer for editor tooling.
//!
//! A query and a dialect name go in; tokens, per-statement table lineage,
//! a per-line cursor context map and statement ranges come out. Nothing
//! here fails on malformed SQL: partial input yields partial results.

pub mod char_stream;
pub mod config;
pub mod context_map;
pub mod dialect;
pub mod error;
pub mod format;
pub mod highlighter;
pub mod lexer;
pub mod lineage;
pub mod lint;
pub mod logging;
pub mod range;
pub mod statement;
pub mod table_cache;
pub mod token;

pub use config::Config;
pub use context_map::{CursorContext, LineContext, get_context_map};
pub use dialect::{DEFAULT_DIALECT, LanguageSetting, language_setting};
pub use error::{QueryLensError, Result};
pub use lexer::{LexMode, Tokenizer, tokenize};
pub use lineage::{Lineage, TableReference, get_lineage};
pub use range::{
    Position, Range, get_query_as_explain, get_selected_query, get_statement_ranges,
    position_from_utf16, position_to_utf16,
};
pub use statement::split_statements;
pub use token::{Token, TokenType};
