//! Statement splitting and bracket matching
//!
//! Every consumer splits the same way: a SEMI token ends the current
//! statement and belongs to neither side. Statement `i` is therefore the
//! run of tokens after the `i`-th semicolon.

use crate::token::{Token, TokenType};

/// Token types the table/alias extractor looks at
const LINEAGE_TOKEN_TYPES: &[TokenType] = &[
    TokenType::Keyword,
    TokenType::Bracket,
    TokenType::Semi,
    TokenType::Variable,
    TokenType::Number,
];

/// Split a flat token stream into statements on SEMI tokens.
///
/// Each SEMI closes a statement, even an empty one; tokens after the last
/// SEMI form a final statement only when there are any. Open brackets get
/// `bracket_match_index` set to the index of their closing bracket within
/// the statement, or to the statement's last index when left unclosed.
pub fn split_statements(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut statements = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut open_brackets: Vec<usize> = Vec::new();

    for token in tokens {
        if token.token_type == TokenType::Semi {
            close_unmatched(&mut current, &mut open_brackets);
            statements.push(std::mem::take(&mut current));
            continue;
        }

        let index = current.len();
        current.push(token.clone());

        if token.is_open_bracket() {
            open_brackets.push(index);
        } else if token.is_close_bracket() {
            if let Some(&open) = open_brackets.last() {
                if current[open].closes_with(token) {
                    open_brackets.pop();
                    current[open].bracket_match_index = Some(index);
                }
            }
        }
    }

    if !current.is_empty() {
        close_unmatched(&mut current, &mut open_brackets);
        statements.push(current);
    }
    statements
}

fn close_unmatched(statement: &mut [Token], open_brackets: &mut Vec<usize>) {
    let last = statement.len().saturating_sub(1);
    for open in open_brackets.drain(..) {
        statement[open].bracket_match_index = Some(last);
    }
}

/// Keep only the tokens relevant to table/alias extraction
pub fn filter_lineage_tokens(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .filter(|token| LINEAGE_TOKEN_TYPES.contains(&token.token_type))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn texts(statement: &[Token]) -> Vec<&str> {
        statement.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_semicolons_are_excluded() {
        let statements = split_statements(&tokenize("select 1; select 2;", "hive"));
        assert_eq!(statements.len(), 2);
        assert_eq!(texts(&statements[0]), vec!["select", "1"]);
        assert_eq!(texts(&statements[1]), vec!["select", "2"]);
    }

    #[test]
    fn test_empty_statements_keep_their_index() {
        let statements = split_statements(&tokenize("select 1;;select 2", "hive"));
        assert_eq!(statements.len(), 3);
        assert!(statements[1].is_empty());
        assert_eq!(texts(&statements[2]), vec!["select", "2"]);
    }

    #[test]
    fn test_bracket_match_points_at_close_bracket() {
        let tokens = tokenize("select * from t where a in (1, 2, (3, 4))", "hive");
        let statements = split_statements(&tokens);
        let statement = &statements[0];
        let mut checked = 0;
        for (index, token) in statement.iter().enumerate() {
            if token.is_close_bracket() {
                let open = statement
                    .iter()
                    .position(|t| t.bracket_match_index == Some(index))
                    .expect("every close bracket has an open bracket");
                assert!(statement[open].is_open_bracket());
                checked += 1;
            }
        }
        assert_eq!(checked, 2);

        let outer = statement.iter().position(|t| t.text == "(").unwrap();
        assert_eq!(outer, 7);
        assert_eq!(statement[outer].bracket_match_index, Some(statement.len() - 1));
    }

    #[test]
    fn test_unbalanced_brackets_close_at_statement_end() {
        let statements = split_statements(&tokenize("select count(a from t; select (1)", "hive"));
        let first = &statements[0];
        let open = first.iter().position(|t| t.text == "(").unwrap();
        assert_eq!(first[open].bracket_match_index, Some(first.len() - 1));

        let second = &statements[1];
        assert_eq!(second[1].bracket_match_index, Some(3));
    }

    #[test]
    fn test_mismatched_close_bracket_is_ignored() {
        let statements = split_statements(&tokenize("select a[1) from t", "hive"));
        let statement = &statements[0];
        let open = statement.iter().position(|t| t.text == "[").unwrap();
        assert_eq!(statement[open].bracket_match_index, Some(statement.len() - 1));
    }

    #[test]
    fn test_filter_lineage_tokens() {
        let tokens = tokenize("select a, 'x' -- c\nfrom t1 where b = 1;", "hive");
        let filtered = filter_lineage_tokens(&tokens);
        assert_eq!(texts(&filtered), vec!["select", "a", "from", "t1", "where", "b", "1", ";"]);
    }
}
