//! Per-line cursor context for autocomplete
//!
//! For every source line this records which statement owns each column and
//! whether the cursor there expects a table name, a column name or neither.
//! Both are stored as run-length breakpoints: `(col, value)` means `value`
//! holds from `col` up to the next breakpoint.

use crate::lexer::tokenize;
use crate::range::Position;
use crate::token::{Token, TokenType};
use serde::Serialize;
use strum::Display;

/// What the cursor is expected to complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CursorContext {
    Table,
    Column,
    #[default]
    None,
}

/// Breakpoints of one source line, each list starting at column 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineContext {
    pub statement_breakpoints: Vec<(usize, usize)>,
    pub context_breakpoints: Vec<(usize, CursorContext)>,
}

impl LineContext {
    fn starting_with(statement: usize, context: CursorContext) -> Self {
        Self {
            statement_breakpoints: vec![(0, statement)],
            context_breakpoints: vec![(0, context)],
        }
    }

    /// Context in effect at `col`
    pub fn context_at(&self, col: usize) -> CursorContext {
        value_at(&self.context_breakpoints, col).unwrap_or_default()
    }

    /// Index of the statement owning `col`
    pub fn statement_at(&self, col: usize) -> usize {
        value_at(&self.statement_breakpoints, col).unwrap_or(0)
    }
}

fn value_at<T: Copy>(breakpoints: &[(usize, T)], col: usize) -> Option<T> {
    breakpoints
        .iter()
        .take_while(|(start, _)| *start <= col)
        .last()
        .map(|(_, value)| *value)
}

/// Append `(col, value)` unless it repeats the current value.
///
/// A second change at the same column replaces the first, so columns stay
/// strictly increasing.
fn record<T: Copy + PartialEq>(breakpoints: &mut Vec<(usize, T)>, col: usize, value: T) {
    if breakpoints.last().is_some_and(|&(last_col, _)| last_col == col) {
        breakpoints.pop();
    }
    if breakpoints.last().is_some_and(|&(_, last)| last == value) {
        return;
    }
    breakpoints.push((col, value));
}

fn keyword_context(keyword: &str, leading: bool) -> Option<CursorContext> {
    match keyword {
        "select" | "where" | "by" | "set" => Some(CursorContext::Column),
        "from" | "table" | "join" | "update" => Some(CursorContext::Table),
        // `ORDER BY x DESC` must not switch to table context
        "desc" | "describe" if leading => Some(CursorContext::Table),
        "limit" => Some(CursorContext::None),
        _ => None,
    }
}

#[derive(Default)]
struct ContextState {
    statement: usize,
    context: CursorContext,
    stack: Vec<CursorContext>,
    /// No significant token seen yet in the current statement
    statement_start: bool,
}

impl ContextState {
    fn apply(&mut self, token: &Token) {
        let leading = self.statement_start;
        if token.token_type != TokenType::Comment {
            self.statement_start = false;
        }

        match token.token_type {
            TokenType::Keyword => {
                if let Some(context) = keyword_context(&token.text, leading) {
                    self.context = context;
                }
            }
            TokenType::Bracket if token.is_open_bracket() => self.stack.push(self.context),
            TokenType::Bracket if token.is_close_bracket() => {
                if let Some(context) = self.stack.pop() {
                    self.context = context;
                }
            }
            TokenType::Semi => {
                self.context = CursorContext::None;
                self.stack.clear();
                self.statement += 1;
                self.statement_start = true;
            }
            TokenType::Variable if self.context == CursorContext::Table => {
                self.context = CursorContext::None;
            }
            _ => {}
        }
    }
}

/// Build one [`LineContext`] per line from a query's tokens
pub fn build_context_map(tokens: &[Token], line_count: usize) -> Vec<LineContext> {
    let mut state = ContextState {
        statement_start: true,
        ..Default::default()
    };
    let mut tokens = tokens.iter().peekable();
    let mut lines = Vec::with_capacity(line_count);

    for line_no in 0..line_count {
        let mut line = LineContext::starting_with(state.statement, state.context);
        while let Some(token) = tokens.next_if(|token| token.line <= line_no) {
            state.apply(token);
            // multi-line strings and comments never change state
            if token.end_line == line_no {
                record(&mut line.statement_breakpoints, token.end_col, state.statement);
                record(&mut line.context_breakpoints, token.end_col, state.context);
            }
        }
        lines.push(line);
    }
    lines
}

/// Context map of `query`, one entry per `\n`-separated line
pub fn get_context_map(query: &str, dialect: &str) -> Vec<LineContext> {
    let line_count = query.split('\n').count();
    build_context_map(&tokenize(query, dialect), line_count)
}

/// Context at a cursor position; positions outside the map have no context
pub fn context_at_position(map: &[LineContext], position: Position) -> CursorContext {
    map.get(position.line)
        .map(|line| line.context_at(position.col))
        .unwrap_or_default()
}
