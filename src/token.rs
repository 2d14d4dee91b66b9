//! Token model shared by the lexer and every analyzer

use serde::Serialize;
use strum::{Display, EnumString};

/// Scan category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Number,
    String,
    Comment,
    Operator,
    Punctuation,
    Bracket,
    Semi,
    Comma,
    TemplatedTag,
    TemplatedBlock,
    Url,
    Variable,
    /// Raw type of tokens matched by a dialect placeholder pattern such as `${var}`
    Placeholder,
    Word,
    Keyword,
    Bool,
    Type,
}

/// A classified, positioned span of source text
///
/// Columns are byte offsets into the line. `end_col` is relative to
/// `end_line`, which only differs from `line` for strings and block
/// comments that continue across lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub token_type: TokenType,
    pub raw_type: TokenType,
    pub text: String,
    pub line: usize,
    pub end_line: usize,
    pub start_col: usize,
    pub end_col: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_match_index: Option<usize>,
}

impl Token {
    /// Create a single-line token whose type and raw type are the same
    pub fn new(
        token_type: TokenType,
        text: impl Into<String>,
        line: usize,
        start_col: usize,
        end_col: usize,
    ) -> Self {
        Self {
            token_type,
            raw_type: token_type,
            text: text.into(),
            line,
            end_line: line,
            start_col,
            end_col,
            bracket_match_index: None,
        }
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_open_bracket(&self) -> bool {
        self.token_type == TokenType::Bracket && matches!(self.text.as_str(), "(" | "[")
    }

    pub fn is_close_bracket(&self) -> bool {
        self.token_type == TokenType::Bracket && matches!(self.text.as_str(), ")" | "]")
    }

    /// True when `self` is an open bracket closed by `close`
    pub fn closes_with(&self, close: &Token) -> bool {
        matches!(
            (self.text.as_str(), close.text.as_str()),
            ("(", ")") | ("[", "]")
        )
    }
}
