//! Cursor over a single line of query text
//!
//! One stream is created per line; nothing carries over between lines.
//! Positions are byte offsets and always sit on a char boundary.

use regex::{Captures, Regex};

pub struct CharStream<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> CharStream<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Unconsumed remainder of the line
    pub fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    pub fn eol(&self) -> bool {
        self.pos >= self.line.len()
    }

    /// Current char without advancing
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Current char, advancing past it
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Match `pattern` at the cursor. Patterns are expected to be anchored
    /// with `^`; a match that does not start at the cursor is rejected.
    pub fn match_pattern(&mut self, pattern: &Regex, consume: bool) -> Option<Captures<'a>> {
        let rest = self.rest();
        let captures = pattern.captures(rest)?;
        let whole = captures.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        if consume {
            self.pos += whole.end();
        }
        Some(captures)
    }

    /// Skip a run of whitespace, returning how many chars were skipped
    pub fn eat_whitespace(&mut self) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
            count += 1;
        }
        count
    }

    pub fn seek_to_end(&mut self) {
        self.pos = self.line.len();
    }

    /// Move the cursor forward by `bytes`, clamped to the end of the line
    pub(crate) fn advance_by(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.line.len());
    }
}
