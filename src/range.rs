//! Offsets, positions and statement ranges
//!
//! Offsets are byte offsets into the full query; a [`Position`] is a
//! zero-based line plus a byte column within that line.

use crate::dialect::DEFAULT_DIALECT;
use crate::lexer::tokenize;
use crate::statement::split_statements;
use crate::token::TokenType;
use serde::{Deserialize, Serialize};

/// Zero-based line and column.
///
/// `col` counts UTF-8 bytes from the start of the line, the same unit as
/// token columns. Editors speaking UTF-16 columns convert with
/// [`position_from_utf16`] and [`position_to_utf16`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// A selection in the editor, `from` inclusive and `to` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub from: Position,
    pub to: Position,
}

/// Offset at which each line starts, plus one past the end.
///
/// The result has one more entry than `text` has lines, so the length of
/// line `i` including its newline is `index[i + 1] - index[i]`.
pub fn line_position_index(text: &str) -> Vec<usize> {
    let mut index = vec![0];
    let mut offset = 0;
    for line in text.split('\n') {
        offset += line.len() + 1;
        index.push(offset);
    }
    index
}

/// Convert a position to an offset into `text`.
///
/// Columns past the end of a line clamp to the line end, lines past the end
/// of the text clamp to `text.len()`. The result always lies on a char
/// boundary.
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let index = line_position_index(text);
    let offset = match (index.get(position.line), index.get(position.line + 1)) {
        (Some(&start), Some(&next)) => start + position.col.min(next - start - 1),
        _ => text.len(),
    };
    floor_char_boundary(text, offset)
}

/// Convert an offset into `text` to a position
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let offset = floor_char_boundary(text, offset);
    let index = line_position_index(text);
    let line = index.partition_point(|&start| start <= offset).saturating_sub(1);
    Position::new(line, offset - index[line])
}

/// Convert a position with a UTF-16 column into one with a byte column.
///
/// A column inside a surrogate pair maps to the start of that character and
/// columns past the line end clamp to it. Lines past the end are returned
/// unchanged.
pub fn position_from_utf16(text: &str, position: Position) -> Position {
    let Some(line) = text.split('\n').nth(position.line) else {
        return position;
    };
    let mut units = 0;
    let mut col = 0;
    for ch in line.chars() {
        units += ch.len_utf16();
        if units > position.col {
            break;
        }
        col += ch.len_utf8();
    }
    Position::new(position.line, col)
}

/// Convert a position with a byte column into one with a UTF-16 column
pub fn position_to_utf16(text: &str, position: Position) -> Position {
    let Some(line) = text.split('\n').nth(position.line) else {
        return position;
    };
    let col = floor_char_boundary(line, position.col);
    Position::new(position.line, line[..col].encode_utf16().count())
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Selection bounds as ordered offsets into `query`
fn selection_offsets(query: &str, selected: &Range) -> (usize, usize) {
    let from = position_to_offset(query, selected.from);
    let to = position_to_offset(query, selected.to);
    (from.min(to), from.max(to))
}

/// `(start, end)` offsets of every non-empty statement.
///
/// With a selection only the selected text is tokenized, but offsets are
/// still relative to the whole query. Comments do not count towards a
/// statement and the terminating semicolon is not part of the range.
pub fn get_statement_ranges(
    query: &str,
    selected: Option<&Range>,
    dialect: &str,
) -> Vec<(usize, usize)> {
    let (base, text) = match selected {
        Some(range) => {
            let (from, to) = selection_offsets(query, range);
            (from, &query[from..to])
        }
        None => (0, query),
    };

    let index = line_position_index(text);
    let tokens: Vec<_> = tokenize(text, dialect)
        .into_iter()
        .filter(|token| token.token_type != TokenType::Comment)
        .collect();

    split_statements(&tokens)
        .iter()
        .filter_map(|statement| {
            let first = statement.first()?;
            let last = statement.last()?;
            let start = base + index[first.line] + first.start_col;
            let end = base + index[last.end_line] + last.end_col;
            Some((start, end))
        })
        .collect()
}

/// Text to run for a selection.
///
/// Without a selection this is the whole query. Otherwise the selection is
/// widened to the statements it touches; a cursor (empty selection) picks the
/// statement it sits in. A selection touching no statement is returned as is.
pub fn get_selected_query(query: &str, selected: Option<&Range>) -> String {
    let Some(range) = selected else {
        return query.to_string();
    };
    let (from, to) = selection_offsets(query, range);

    let touched: Vec<(usize, usize)> = get_statement_ranges(query, None, DEFAULT_DIALECT)
        .into_iter()
        .filter(|&(start, end)| {
            if from == to {
                start <= from && from <= end
            } else {
                start < to && from < end
            }
        })
        .collect();

    match (touched.first(), touched.last()) {
        (Some(&(start, _)), Some(&(_, end))) => query[start..end].to_string(),
        _ => query[from..to].to_string(),
    }
}

/// Text of every non-empty statement, without terminators
pub fn get_statements(query: &str, dialect: &str) -> Vec<String> {
    get_statement_ranges(query, None, dialect)
        .into_iter()
        .map(|(start, end)| query[start..end].to_string())
        .collect()
}

/// Every statement wrapped as `EXPLAIN <statement>;`, one per line
pub fn get_query_as_explain(query: &str, dialect: &str) -> String {
    get_statements(query, dialect)
        .iter()
        .map(|statement| format!("EXPLAIN {statement};"))
        .collect::<Vec<_>>()
        .join("\n")
}
