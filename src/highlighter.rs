use crate::lexer::{Tokenizer, tokenizer};
use crate::range::line_position_index;
use crate::token::{Token, TokenType};
use nu_ansi_term::{Color, Style};

/// Identifiers styled as functions when followed by `(`
const SQL_FUNCTIONS: &[&str] = &[
    "abs", "array_agg", "avg", "ceil", "coalesce", "collect_list", "collect_set", "concat",
    "concat_ws", "count", "date_add", "date_format", "date_sub", "date_trunc", "datediff",
    "floor", "from_unixtime", "greatest", "if", "length", "least", "lower", "max", "min",
    "nullif", "nvl", "regexp_extract", "regexp_replace", "round", "row_number", "size",
    "split", "substr", "substring", "sum", "to_date", "trim", "unix_timestamp", "upper",
];

/// A run of text and the style it is printed with
pub type StyledSegment = (Style, String);

/// Token-driven ANSI highlighter for SQL
pub struct SqlHighlighter {
    tokenizer: &'static Tokenizer,
    keyword_style: Style,
    type_style: Style,
    function_style: Style,
    string_style: Style,
    number_style: Style,
    comment_style: Style,
    template_style: Style,
    placeholder_style: Style,
}

impl SqlHighlighter {
    pub fn new(dialect: &str) -> Self {
        SqlHighlighter {
            tokenizer: tokenizer(dialect),
            keyword_style: Style::new().fg(Color::Blue).bold(),
            type_style: Style::new().fg(Color::Green).bold(),
            function_style: Style::new().fg(Color::Purple).bold(),
            string_style: Style::new().fg(Color::Red),
            number_style: Style::new().fg(Color::Yellow),
            comment_style: Style::new().fg(Color::DarkGray).italic(),
            template_style: Style::new().fg(Color::Cyan),
            placeholder_style: Style::new().fg(Color::Cyan).bold(),
        }
    }

    fn style_for(&self, token: &Token, next: Option<&Token>) -> Style {
        match token.token_type {
            TokenType::Keyword => self.keyword_style,
            TokenType::Type => self.type_style,
            TokenType::Bool | TokenType::Number => self.number_style,
            TokenType::String | TokenType::Url => self.string_style,
            TokenType::Comment => self.comment_style,
            TokenType::TemplatedTag | TokenType::TemplatedBlock => self.template_style,
            TokenType::Variable if token.raw_type == TokenType::Placeholder => {
                self.placeholder_style
            }
            TokenType::Variable if is_function_call(token, next) => self.function_style,
            _ => Style::new(),
        }
    }

    /// Split `query` into styled segments that concatenate back to `query`
    pub fn segments(&self, query: &str) -> Vec<StyledSegment> {
        let index = line_position_index(query);
        let tokens = self.tokenizer.tokenize(query);
        let mut segments = Vec::new();
        let mut last_end = 0;

        for (position, token) in tokens.iter().enumerate() {
            let start = index[token.line] + token.start_col;
            let end = index[token.end_line] + token.end_col;

            // Whitespace and skipped characters keep the default style
            if start > last_end {
                segments.push((Style::new(), query[last_end..start].to_string()));
            }
            let style = self.style_for(token, tokens.get(position + 1));
            segments.push((style, query[start..end].to_string()));
            last_end = end;
        }

        if last_end < query.len() {
            segments.push((Style::new(), query[last_end..].to_string()));
        }
        segments
    }

    /// Render `query` with ANSI escape codes
    pub fn highlight(&self, query: &str) -> String {
        self.segments(query)
            .into_iter()
            .map(|(style, text)| {
                if style == Style::new() {
                    text
                } else {
                    style.paint(text).to_string()
                }
            })
            .collect()
    }
}

fn is_function_call(token: &Token, next: Option<&Token>) -> bool {
    let followed_by_paren = next.is_some_and(|next| {
        next.text == "(" && next.line == token.end_line && next.start_col == token.end_col
    });
    followed_by_paren && SQL_FUNCTIONS.contains(&token.text.to_lowercase().as_str())
}
