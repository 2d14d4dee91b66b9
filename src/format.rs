//! Keyword case normalization
//!
//! Only the bytes of KEYWORD tokens are rewritten; strings, comments,
//! identifiers and whitespace come through untouched.

use crate::lexer::tokenize;
use crate::range::line_position_index;
use crate::token::TokenType;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
    Preserve,
}

impl KeywordCase {
    fn apply(self, keyword: &str) -> String {
        match self {
            KeywordCase::Upper => keyword.to_uppercase(),
            KeywordCase::Lower => keyword.to_lowercase(),
            KeywordCase::Preserve => keyword.to_string(),
        }
    }
}

/// Rewrite every keyword of `query` in the requested case
pub fn format_keyword_case(query: &str, dialect: &str, case: KeywordCase) -> String {
    if case == KeywordCase::Preserve {
        return query.to_string();
    }

    let index = line_position_index(query);
    let mut formatted = String::with_capacity(query.len());
    let mut copied = 0;

    for token in tokenize(query, dialect) {
        if token.token_type != TokenType::Keyword {
            continue;
        }
        let start = index[token.line] + token.start_col;
        let end = index[token.end_line] + token.end_col;
        formatted.push_str(&query[copied..start]);
        formatted.push_str(&case.apply(&query[start..end]));
        copied = end;
    }
    formatted.push_str(&query[copied..]);
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(KeywordCase::Upper, "SELECT a, 'select' FROM t -- from here\nWHERE b = 1;")]
    #[case(KeywordCase::Lower, "select a, 'select' from t -- from here\nwhere b = 1;")]
    #[case(KeywordCase::Preserve, "Select a, 'select' FROM t -- from here\nwhere b = 1;")]
    fn test_keyword_case(#[case] case: KeywordCase, #[case] expected: &str) {
        let query = "Select a, 'select' FROM t -- from here\nwhere b = 1;";
        assert_eq!(format_keyword_case(query, "hive", case), expected);
    }

    #[test]
    fn test_identifiers_and_whitespace_are_untouched() {
        let query = "select\tMyCol ,  `from`\n\nfrom   Db.Tbl";
        assert_eq!(
            format_keyword_case(query, "hive", KeywordCase::Upper),
            "SELECT\tMyCol ,  `from`\n\nFROM   Db.Tbl"
        );
    }

    #[test]
    fn test_case_parses_from_config_strings() {
        assert_eq!("lower".parse::<KeywordCase>().unwrap(), KeywordCase::Lower);
        assert_eq!(KeywordCase::Preserve.to_string(), "preserve");
        assert_eq!(KeywordCase::default(), KeywordCase::Upper);
    }
}
