use clap::{Parser, Subcommand, ValueEnum};
use querylens::error::QueryLensError;
use querylens::format::KeywordCase;
use querylens::range::{Position, Range};
use std::path::PathBuf;

/// querylens - SQL lexer and statement analyzer for editor tooling
#[derive(Parser, Debug, Clone)]
#[command(name = "querylens")]
#[command(version, long_about = None)]
#[command(about = "Tokenize SQL and report tables, aliases, cursor context and statement ranges")]
pub struct Args {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQL dialect (hive, presto, trino, sparksql, mysql, postgresql, sqlite)
    #[arg(short, long, global = true)]
    pub dialect: Option<String>,

    /// Read the query from a file instead of stdin
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print every token as JSON
    Tokens,
    /// Print table references and aliases per statement
    Lineage {
        /// Schema for unqualified tables before any USE
        #[arg(long)]
        default_schema: Option<String>,
    },
    /// Print the per-line statement and context breakpoints
    Context,
    /// Print the byte range of every statement
    Ranges(SelectionArgs),
    /// Print the statements touched by a selection
    Selected(SelectionArgs),
    /// Print every statement as an EXPLAIN query
    Explain,
    /// Print the text of every statement
    Statements,
    /// Rewrite keywords in the configured case
    Format {
        #[arg(long, value_enum)]
        case: Option<KeywordCase>,
    },
    /// Print the query with ANSI colours
    Highlight,
    /// Report tables missing from a list of known tables
    Lint {
        /// File with one `schema.table` per line
        #[arg(long, value_name = "FILE")]
        tables: PathBuf,
        #[arg(long)]
        default_schema: Option<String>,
    },
    /// List supported dialects
    Dialects,
}

/// Optional editor selection, positions given as LINE:COL
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct SelectionArgs {
    #[arg(long, value_name = "LINE:COL", value_parser = parse_position)]
    pub from: Option<Position>,
    #[arg(long, value_name = "LINE:COL", value_parser = parse_position)]
    pub to: Option<Position>,
}

impl SelectionArgs {
    /// A lone `--from` is a cursor; a lone `--to` selects from the start
    pub fn range(&self) -> Option<Range> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(Range { from, to }),
            (Some(from), None) => Some(Range { from, to: from }),
            (None, Some(to)) => Some(Range {
                from: Position::new(0, 0),
                to,
            }),
            (None, None) => None,
        }
    }
}

/// Parse `LINE:COL`, both zero-based
pub fn parse_position(value: &str) -> Result<Position, QueryLensError> {
    let invalid = || QueryLensError::InvalidPosition(value.to_string());
    let (line, col) = value.split_once(':').ok_or_else(invalid)?;
    let line = line.trim().parse().map_err(|_| invalid())?;
    let col = col.trim().parse().map_err(|_| invalid())?;
    Ok(Position::new(line, col))
}

/// Supported shells for completion generation
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
