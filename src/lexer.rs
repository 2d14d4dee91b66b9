//! SQL tokenizer for editor tooling
//!
//! A best-effort lexer: it never fails and never validates. Each line is
//! scanned with a fresh [`CharStream`]; the only state carried from one line
//! to the next is the [`LexMode`], which records an open string literal or
//! block comment so it can continue on the following line.
//!
//! Token patterns are tried in a fixed priority order (numbers before
//! strings before comments, dotted identifiers before plain words, ...).
//! The first pattern that matches at the cursor wins; characters no pattern
//! accepts are skipped one at a time.

use crate::char_stream::CharStream;
use crate::dialect::{LanguageSetting, dialect_names, language_setting};
use crate::token::{Token, TokenType};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::trace;

const NUMBER_PATTERNS: &[&str] = &[
    // hex
    r"(?i)^0x[0-9a-f]+",
    r"(?i)^x'[0-9a-f]*'",
    // binary
    r"(?i)^b'[01]*'",
    r"^0b[01]+",
    // decimal
    r"(?i)^(?:\d+\.\d*|\.\d+)(?:e[+-]?\d+)?",
    r"(?i)^\d+e[+-]?\d+",
    // JDBC date/time/timestamp escapes
    r#"(?i)^\{\s*(?:d|t|ts)\s*'[^']*'\s*\}"#,
    r#"(?i)^\{\s*(?:d|t|ts)\s*"[^"]*"\s*\}"#,
    r"^\d+",
];

const STRING_PATTERNS: &[&str] = &[
    r"^'(?:[^'\\]|\\.)*'",
    r#"^"(?:[^"\\]|\\.)*""#,
    // an opening quote alone starts a string that continues on later lines
    r"^'",
    r#"^""#,
];

const COMMENT_PATTERNS: &[&str] = &[r"^--.*", r"^/\*.*?\*/", r"^/\*"];
const BRACKET_PATTERNS: &[&str] = &[r"^[()\[\]]"];
const SEMI_PATTERNS: &[&str] = &[r"^;"];
const COMMA_PATTERNS: &[&str] = &[r"^,"];
const TEMPLATED_TAG_PATTERNS: &[&str] = &[r"^\{\{.*?\}\}"];
const TEMPLATED_BLOCK_PATTERNS: &[&str] = &[r"^\{%.*?%\}"];
const URL_PATTERNS: &[&str] = &[r#"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s'"`,;()]+"#];
const VARIABLE_PATTERNS: &[&str] = &[
    r"^(?:`[^`]*`|[\w$]+)(?:\.(?:`[^`]*`|[\w$]+|\*))+",
    r"^`[^`]*`",
];
const WORD_PATTERNS: &[&str] = &[r"^[\w$]+"];

/// Scanner state threaded from one line to the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexMode {
    Base,
    InString { quote: char, pending: PendingToken },
    InBlockComment { pending: PendingToken },
}

/// A string or comment whose closing delimiter has not been seen yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingToken {
    pub text: String,
    pub line: usize,
    pub start_col: usize,
}

impl PendingToken {
    fn finish(self, token_type: TokenType, end_line: usize, end_col: usize) -> Token {
        Token {
            token_type,
            raw_type: token_type,
            text: self.text,
            line: self.line,
            end_line,
            start_col: self.start_col,
            end_col,
            bracket_match_index: None,
        }
    }
}

impl LexMode {
    /// Account for the newline between this line and the next
    fn end_line(&mut self) {
        match self {
            LexMode::Base => {}
            LexMode::InString { pending, .. } | LexMode::InBlockComment { pending } => {
                pending.text.push('\n');
            }
        }
    }

    /// Flush an unterminated string or comment at end of input
    fn finish(self, end_line: usize, end_col: usize) -> Option<Token> {
        match self {
            LexMode::Base => None,
            LexMode::InString { pending, .. } => {
                Some(pending.finish(TokenType::String, end_line, end_col))
            }
            LexMode::InBlockComment { pending } => {
                Some(pending.finish(TokenType::Comment, end_line, end_col))
            }
        }
    }
}

/// Outcome of trying the pattern table at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    Matched(TokenType, String),
}

/// Dialect-specific tokenizer; patterns are compiled once at construction
pub struct Tokenizer {
    setting: &'static LanguageSetting,
    patterns: Vec<(TokenType, Vec<Regex>)>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("token patterns are static and valid"))
        .collect()
}

impl Tokenizer {
    pub fn new(setting: &'static LanguageSetting) -> Self {
        let mut patterns = vec![
            (TokenType::Number, compile(NUMBER_PATTERNS)),
            (TokenType::String, compile(STRING_PATTERNS)),
            (TokenType::Comment, compile(COMMENT_PATTERNS)),
            (TokenType::Operator, vec![setting.operator_chars.clone()]),
            (TokenType::Punctuation, vec![setting.punctuation_chars.clone()]),
            (TokenType::Bracket, compile(BRACKET_PATTERNS)),
            (TokenType::Semi, compile(SEMI_PATTERNS)),
            (TokenType::Comma, compile(COMMA_PATTERNS)),
            (TokenType::TemplatedTag, compile(TEMPLATED_TAG_PATTERNS)),
            (TokenType::TemplatedBlock, compile(TEMPLATED_BLOCK_PATTERNS)),
            (TokenType::Url, compile(URL_PATTERNS)),
            (TokenType::Variable, compile(VARIABLE_PATTERNS)),
        ];
        if let Some(placeholder) = &setting.placeholder_variable {
            patterns.push((TokenType::Placeholder, vec![placeholder.clone()]));
        }
        patterns.push((TokenType::Word, compile(WORD_PATTERNS)));

        Self { setting, patterns }
    }

    pub fn setting(&self) -> &'static LanguageSetting {
        self.setting
    }

    /// Tokenize a whole query
    pub fn tokenize(&self, query: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut mode = LexMode::Base;
        let mut last_line = (0, 0);

        for (line_no, line) in query.split('\n').enumerate() {
            mode = self.tokenize_line(line, line_no, mode, &mut tokens);
            mode.end_line();
            last_line = (line_no, line.len());
        }

        if let Some(token) = mode.finish(last_line.0, last_line.1) {
            tokens.push(token);
        }
        tokens
    }

    /// Scan one line starting in `mode`, returning the mode for the next line
    pub fn tokenize_line(
        &self,
        line: &str,
        line_no: usize,
        mut mode: LexMode,
        tokens: &mut Vec<Token>,
    ) -> LexMode {
        let mut stream = CharStream::new(line);
        loop {
            mode = match mode {
                LexMode::Base => self.scan_base(&mut stream, line_no, tokens),
                LexMode::InString { quote, pending } => {
                    Self::scan_string(&mut stream, quote, pending, line_no, tokens)
                }
                LexMode::InBlockComment { pending } => {
                    Self::scan_block_comment(&mut stream, pending, line_no, tokens)
                }
            };
            if stream.eol() {
                return mode;
            }
        }
    }

    /// Try every pattern group in priority order at the cursor
    pub fn match_token(&self, stream: &mut CharStream<'_>) -> MatchResult {
        for (tag, patterns) in &self.patterns {
            for pattern in patterns {
                let matched = stream
                    .match_pattern(pattern, false)
                    .and_then(|captures| captures.get(0).map(|m| m.as_str()))
                    .filter(|text| !text.is_empty());
                if let Some(text) = matched {
                    stream.advance_by(text.len());
                    return MatchResult::Matched(*tag, text.to_string());
                }
            }
        }
        MatchResult::NoMatch
    }

    fn scan_base(
        &self,
        stream: &mut CharStream<'_>,
        line_no: usize,
        tokens: &mut Vec<Token>,
    ) -> LexMode {
        stream.eat_whitespace();
        if stream.eol() {
            return LexMode::Base;
        }

        let start_col = stream.pos();
        let (tag, text) = match self.match_token(stream) {
            MatchResult::Matched(tag, text) => (tag, text),
            MatchResult::NoMatch => {
                let skipped = stream.next();
                trace!(
                    "Skipping unrecognized character {:?} at {}:{}",
                    skipped, line_no, start_col
                );
                return LexMode::Base;
            }
        };
        let end_col = stream.pos();

        match tag {
            TokenType::String if text.len() == 1 => LexMode::InString {
                quote: text.chars().next().unwrap_or('\''),
                pending: PendingToken {
                    text,
                    line: line_no,
                    start_col,
                },
            },
            TokenType::Comment if text == "/*" => LexMode::InBlockComment {
                pending: PendingToken {
                    text,
                    line: line_no,
                    start_col,
                },
            },
            TokenType::Word => {
                tokens.push(self.classify_word(text, line_no, start_col, end_col));
                LexMode::Base
            }
            TokenType::Placeholder => {
                let mut token = Token::new(TokenType::Variable, text, line_no, start_col, end_col);
                token.raw_type = TokenType::Placeholder;
                tokens.push(token);
                LexMode::Base
            }
            _ => {
                tokens.push(Token::new(tag, text, line_no, start_col, end_col));
                LexMode::Base
            }
        }
    }

    fn scan_string(
        stream: &mut CharStream<'_>,
        quote: char,
        mut pending: PendingToken,
        line_no: usize,
        tokens: &mut Vec<Token>,
    ) -> LexMode {
        while let Some(ch) = stream.next() {
            pending.text.push(ch);
            if ch == '\\' {
                if let Some(escaped) = stream.next() {
                    pending.text.push(escaped);
                }
            } else if ch == quote {
                tokens.push(pending.finish(TokenType::String, line_no, stream.pos()));
                return LexMode::Base;
            }
        }
        LexMode::InString { quote, pending }
    }

    fn scan_block_comment(
        stream: &mut CharStream<'_>,
        mut pending: PendingToken,
        line_no: usize,
        tokens: &mut Vec<Token>,
    ) -> LexMode {
        let rest = stream.rest();
        match rest.find("*/") {
            Some(close) => {
                pending.text.push_str(&rest[..close + 2]);
                stream.advance_by(close + 2);
                tokens.push(pending.finish(TokenType::Comment, line_no, stream.pos()));
                LexMode::Base
            }
            None => {
                pending.text.push_str(rest);
                stream.seek_to_end();
                LexMode::InBlockComment { pending }
            }
        }
    }

    /// Re-classify a scanned word against the dialect's word sets
    fn classify_word(
        &self,
        text: String,
        line_no: usize,
        start_col: usize,
        end_col: usize,
    ) -> Token {
        let (token_type, text) = if self.setting.is_keyword(&text) {
            (TokenType::Keyword, text.to_lowercase())
        } else if self.setting.is_bool(&text) {
            (TokenType::Bool, text)
        } else if self.setting.is_type(&text) {
            (TokenType::Type, text)
        } else {
            (TokenType::Variable, text)
        };

        let mut token = Token::new(token_type, text, line_no, start_col, end_col);
        token.raw_type = TokenType::Word;
        token
    }
}

static TOKENIZERS: OnceLock<BTreeMap<&'static str, Tokenizer>> = OnceLock::new();

/// Shared tokenizer for `dialect`, falling back to the default dialect
pub fn tokenizer(dialect: &str) -> &'static Tokenizer {
    let tokenizers = TOKENIZERS.get_or_init(|| {
        dialect_names()
            .into_iter()
            .map(|name| (name, Tokenizer::new(language_setting(name))))
            .collect()
    });
    &tokenizers[language_setting(dialect).name]
}

/// Tokenize `query` with the named dialect
pub fn tokenize(query: &str, dialect: &str) -> Vec<Token> {
    tokenizer(dialect).tokenize(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn types(tokens: &[Token]) -> Vec<TokenType> {
        tokens.iter().map(|t| t.token_type).collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_simple_select() {
        let tokens = tokenize("SELECT a, b FROM db.tbl WHERE x = 'y';", "hive");
        assert_eq!(
            types(&tokens),
            vec![
                TokenType::Keyword,
                TokenType::Variable,
                TokenType::Comma,
                TokenType::Variable,
                TokenType::Keyword,
                TokenType::Variable,
                TokenType::Keyword,
                TokenType::Variable,
                TokenType::Operator,
                TokenType::String,
                TokenType::Semi,
            ]
        );
        assert_eq!(texts(&tokens)[0], "select");
        assert_eq!(texts(&tokens)[5], "db.tbl");
    }

    #[test]
    fn test_word_classification_keeps_raw_type() {
        let tokens = tokenize("Select TRUE, CAST(x AS String) from t", "hive");
        assert_eq!(tokens[0].token_type, TokenType::Keyword);
        assert_eq!(tokens[0].raw_type, TokenType::Word);
        assert_eq!(tokens[0].text, "select");
        assert_eq!(tokens[1].token_type, TokenType::Bool);
        assert_eq!(tokens[1].text, "TRUE");
        let string_type = tokens.iter().find(|t| t.text == "String").unwrap();
        assert_eq!(string_type.token_type, TokenType::Type);
        let dotted = tokenize("select a.b", "hive");
        assert_eq!(dotted[1].raw_type, TokenType::Variable);
    }

    #[rstest]
    #[case("0x1F")]
    #[case("x'1f'")]
    #[case("b'0101'")]
    #[case("0b101")]
    #[case("1.5e10")]
    #[case(".5")]
    #[case("3.")]
    #[case("2E-3")]
    #[case("{d '2020-01-01'}")]
    #[case("{ts \"2020-01-01 00:00:00\"}")]
    #[case("42")]
    fn test_number_literals(#[case] literal: &str) {
        let tokens = tokenize(&format!("select {literal} from t"), "hive");
        assert_eq!(tokens[1].token_type, TokenType::Number, "{literal}");
        assert_eq!(tokens[1].text, literal);
        assert_eq!(tokens[2].text, "from");
    }

    #[test]
    fn test_multi_line_string_is_one_token() {
        let tokens = tokenize("select 'abc\ndef' as x", "hive");
        let strings: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::String)
            .collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].text, "'abc\ndef'");
        assert_eq!(strings[0].line, 0);
        assert_eq!(strings[0].start_col, 7);
        assert_eq!(strings[0].end_line, 1);
        assert_eq!(strings[0].end_col, 4);

        // scanning resumes in base mode after the closing quote
        let rest: Vec<&str> = tokens.iter().skip(2).map(|t| t.text.as_str()).collect();
        assert_eq!(rest, vec!["as", "x"]);
        assert_eq!(tokens[2].token_type, TokenType::Keyword);
    }

    #[test]
    fn test_string_mode_is_threaded_between_lines() {
        let tokenizer = tokenizer("hive");
        let mut tokens = Vec::new();
        let mode = tokenizer.tokenize_line("select \"abc", 0, LexMode::Base, &mut tokens);
        assert_eq!(
            mode,
            LexMode::InString {
                quote: '"',
                pending: PendingToken {
                    text: "\"abc".to_string(),
                    line: 0,
                    start_col: 7
                },
            }
        );
        let mode = tokenizer.tokenize_line("def\" from t", 1, mode, &mut tokens);
        assert_eq!(mode, LexMode::Base);
        assert_eq!(texts(&tokens), vec!["select", "\"abcdef\"", "from", "t"]);
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let tokens = tokenize(r"select 'it\'s' from t", "hive");
        assert_eq!(tokens[1].text, r"'it\'s'");
        assert_eq!(tokens[2].text, "from");
    }

    #[test]
    fn test_block_comment_across_lines() {
        let tokens = tokenize("select /* one\ntwo\nthree */ 1", "hive");
        assert_eq!(texts(&tokens), vec!["select", "/* one\ntwo\nthree */", "1"]);
        assert_eq!(tokens[1].token_type, TokenType::Comment);
        assert_eq!(tokens[1].end_line, 2);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn test_single_line_comments() {
        let tokens = tokenize("select 1 -- trailing ; not a semi\n/* inline */ from t", "hive");
        assert_eq!(
            types(&tokens),
            vec![
                TokenType::Keyword,
                TokenType::Number,
                TokenType::Comment,
                TokenType::Comment,
                TokenType::Keyword,
                TokenType::Variable,
            ]
        );
    }

    #[test]
    fn test_unterminated_constructs_extend_to_end_of_input() {
        let tokens = tokenize("select 'abc", "hive");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "'abc\n");
        assert_eq!(tokens[1].end_col, 11);

        let tokens = tokenize("select 1 /* open\nstill open", "hive");
        assert_eq!(tokens.last().unwrap().text, "/* open\nstill open\n");
        assert_eq!(tokens.last().unwrap().token_type, TokenType::Comment);
    }

    #[test]
    fn test_templates_urls_and_placeholders() {
        let tokens = tokenize(
            "{% if x %}select * from {{ table }} where ds = '${ds}' \
             and p = s3://bucket/key {% endif %}",
            "hive",
        );
        assert_eq!(tokens[0].token_type, TokenType::TemplatedBlock);
        let tag = tokens.iter().find(|t| t.token_type == TokenType::TemplatedTag).unwrap();
        assert_eq!(tag.text, "{{ table }}");
        let url = tokens.iter().find(|t| t.token_type == TokenType::Url).unwrap();
        assert_eq!(url.text, "s3://bucket/key");

        let tokens = tokenize("select * from ${db}", "hive");
        let placeholder = tokens.last().unwrap();
        assert_eq!(placeholder.token_type, TokenType::Variable);
        assert_eq!(placeholder.raw_type, TokenType::Placeholder);
        assert_eq!(placeholder.text, "${db}");
    }

    #[test]
    fn test_backtick_identifiers() {
        let tokens = tokenize("select * from `my db`.`order` join `select`", "hive");
        assert_eq!(tokens[3].text, "`my db`.`order`");
        assert_eq!(tokens[3].token_type, TokenType::Variable);
        assert_eq!(tokens[5].text, "`select`");
        assert_eq!(tokens[5].token_type, TokenType::Variable);
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let query = "use db;\nselect a.b, 'x\ny' from t1 join t2 on t1.id = t2.id /* c\n*/;";
        assert_eq!(tokenize(query, "presto"), tokenize(query, "presto"));
    }

    #[test]
    fn test_tokens_cover_every_non_whitespace_char() {
        let query = "select a.b, count(*) from t where x >= 1.5;";
        let joined: String = tokenize(query, "hive").iter().map(|t| t.text.as_str()).collect();
        let expected: String = query.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_tokens_on_a_line_do_not_overlap() {
        let query = "select a,b,(c)from t1 x;select 'q' -- c\nfrom t2";
        let tokens = tokenize(query, "hive");
        for pair in tokens.windows(2) {
            if pair[0].end_line == pair[1].line {
                assert!(pair[0].end_col <= pair[1].start_col, "{:?}", pair);
            }
        }
    }

    #[test]
    fn test_unrecognized_characters_are_dropped() {
        let tokens = tokenize("select ¤ 1", "hive");
        assert_eq!(texts(&tokens), vec!["select", "1"]);
    }

    #[rstest]
    #[case("")]
    #[case("'unterminated")]
    #[case("\"unterminated\n\n")]
    #[case("/* unterminated")]
    #[case(";;;")]
    #[case("select 'é' from 表")]
    #[case("\u{1F600}\u{1F600}")]
    #[case("\\")]
    #[case("{{ {% `")]
    fn test_malformed_input_never_panics(#[case] query: &str) {
        for dialect in dialect_names() {
            let tokens = tokenize(query, dialect);
            assert!(tokens.len() <= query.len());
        }
    }

    #[test]
    fn test_semicolons_are_separate_tokens() {
        let tokens = tokenize(";;;", "hive");
        assert_eq!(types(&tokens), vec![TokenType::Semi; 3]);
    }

    #[test]
    fn test_unicode_identifiers_are_words() {
        let tokens = tokenize("select 'é' from 表", "hive");
        assert_eq!(tokens[3].text, "表");
        assert_eq!(tokens[3].token_type, TokenType::Variable);
        assert_eq!(tokens[3].start_col, 17);
    }

    #[test]
    fn test_match_token_reports_no_match() {
        let tokenizer = tokenizer("hive");
        let mut stream = CharStream::new("¤");
        assert_eq!(tokenizer.match_token(&mut stream), MatchResult::NoMatch);
        let mut stream = CharStream::new("<= 1");
        assert_eq!(
            tokenizer.match_token(&mut stream),
            MatchResult::Matched(TokenType::Operator, "<=".to_string())
        );
        assert_eq!(stream.pos(), 2);
    }
}
