//
// line scanning module
//
// A scanner runs a flattened list of producers over a single line:
// -----------------------------------------------------------------
// | producer[0] | space | producer[1] | space | ... | producer[n-1] |
// -----------------------------------------------------------------
// Each step emits exactly one token, possibly error-typed, so the
// consumer always reads the same number of tokens per line.
//

// std imports
use std::fmt;

// local imports
use crate::token::{Token, TokenKind};

// ---

const LEFT_DELIMITERS: &str = "([{<";
const RIGHT_DELIMITERS: &str = ")]}>";
const QUOTES: &str = "\"'`";

// ---

/// Forward-only cursor over a line.
///
/// Text between `start` and `pos` is the pending token.
/// End of line is reported as `None` by [`peek`](Cursor::peek) and [`bump`](Cursor::bump).
pub struct Cursor<'a> {
    input: &'a str,
    start: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(input: &'a str, pos: usize) -> Self {
        Self { input, start: pos, pos }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline]
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consumes the next character if it satisfies the predicate.
    #[inline]
    pub fn accept(&mut self, f: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(ch) if f(ch) => {
                self.pos += ch.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// Consumes a run of characters satisfying the predicate, returns true if any was consumed.
    #[inline]
    pub fn accept_run(&mut self, f: impl Fn(char) -> bool) -> bool {
        let start = self.pos;
        while self.accept(&f) {}
        self.pos != start
    }

    /// Consumes characters until the predicate matches or the line ends.
    #[inline]
    pub fn accept_until(&mut self, end: impl Fn(char) -> bool) -> bool {
        self.accept_run(|ch| !end(ch))
    }

    /// Emits the pending text as a token of the given kind and starts a new one.
    pub fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(kind, self.start, &self.input[self.start..self.pos]);
        self.start = self.pos;
        token
    }
}

// ---

/// A named rule recognizing one token shape at the cursor.
///
/// Scan functions return the kind to emit: either the producer's own kind or
/// [`TokenKind::Error`]. They never fail to emit.
#[derive(Clone, Copy)]
pub struct Producer {
    kind: TokenKind,
    scan: fn(&mut Cursor<'_>) -> TokenKind,
}

impl Producer {
    pub const ADDRESS: Self = Self::new(TokenKind::Address, scan_address);
    pub const WORD: Self = Self::new(TokenKind::Word, scan_word);
    pub const INTEGER: Self = Self::new(TokenKind::Integer, scan_integer);
    pub const LEFT_DELIMITER: Self = Self::new(TokenKind::LeftDelimiter, scan_left_delimiter);
    pub const RIGHT_DELIMITER: Self = Self::new(TokenKind::RightDelimiter, scan_right_delimiter);
    pub const QUOTED_STRING: Self = Self::new(TokenKind::QuotedString, scan_quoted_string);
    pub const SPACE: Self = Self::new(TokenKind::Space, scan_space);

    pub const fn new(kind: TokenKind, scan: fn(&mut Cursor<'_>) -> TokenKind) -> Self {
        Self { kind, scan }
    }

    /// Kind of the token emitted on success.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn produce(&self, cursor: &mut Cursor<'_>) -> Token {
        let kind = (self.scan)(cursor);
        cursor.emit(kind)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(&self.kind).finish()
    }
}

impl PartialEq for Producer {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

// ---

fn scan_address(c: &mut Cursor<'_>) -> TokenKind {
    c.accept_run(is_digit);
    for _ in 0..3 {
        c.accept(|ch| ch == '.');
        c.accept_run(is_digit);
    }
    TokenKind::Address
}

fn scan_word(c: &mut Cursor<'_>) -> TokenKind {
    c.accept_until(is_generic_delimiter);
    TokenKind::Word
}

fn scan_integer(c: &mut Cursor<'_>) -> TokenKind {
    c.accept_run(is_digit);
    // trailing garbage stays in the token so that the conversion rejects it as a whole
    c.accept_until(is_generic_delimiter);
    TokenKind::Integer
}

fn scan_left_delimiter(c: &mut Cursor<'_>) -> TokenKind {
    match c.bump() {
        Some(ch) if is_left_delimiter(ch) => TokenKind::LeftDelimiter,
        _ => TokenKind::Error,
    }
}

fn scan_right_delimiter(c: &mut Cursor<'_>) -> TokenKind {
    match c.bump() {
        Some(ch) if is_right_delimiter(ch) => TokenKind::RightDelimiter,
        _ => TokenKind::Error,
    }
}

fn scan_quoted_string(c: &mut Cursor<'_>) -> TokenKind {
    let quote = match c.bump() {
        Some(ch) if is_quote(ch) => ch,
        _ => return TokenKind::Error,
    };
    c.accept_until(|ch| ch == quote);
    match c.bump() {
        Some(_) => TokenKind::QuotedString,
        None => TokenKind::Error,
    }
}

fn scan_space(c: &mut Cursor<'_>) -> TokenKind {
    c.accept_run(is_space);
    TokenKind::Space
}

// ---

#[inline]
fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[inline]
fn is_space(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

#[inline]
fn is_left_delimiter(ch: char) -> bool {
    LEFT_DELIMITERS.contains(ch)
}

#[inline]
fn is_right_delimiter(ch: char) -> bool {
    RIGHT_DELIMITERS.contains(ch)
}

#[inline]
fn is_generic_delimiter(ch: char) -> bool {
    is_space(ch) || is_left_delimiter(ch) || is_right_delimiter(ch)
}

#[inline]
pub(crate) fn is_quote(ch: char) -> bool {
    QUOTES.contains(ch)
}

// ---

/// Produces tokens of a single line according to a flattened list of producers.
///
/// A space token is produced between every two consecutive producers,
/// so a line always yields [`expected`](Scanner::expected) tokens.
/// The scanner owns its line buffer and can be reused for the next line after [`reset`](Scanner::reset).
#[derive(Debug)]
pub struct Scanner {
    producers: Vec<Producer>,
    line: String,
    pos: usize,
    step: usize,
    unread: Option<Token>,
    running: bool,
}

impl Scanner {
    pub fn new(producers: Vec<Producer>) -> Self {
        Self {
            producers,
            line: String::new(),
            pos: 0,
            step: 0,
            unread: None,
            running: false,
        }
    }

    /// Total number of tokens produced for one line, including automatic space tokens.
    pub fn expected(&self) -> usize {
        (self.producers.len() * 2).saturating_sub(1)
    }

    /// Starts scanning the given line, discarding any state left from the previous one.
    pub fn run(&mut self, line: &str) {
        self.reset();
        self.line.push_str(line);
        self.running = true;
    }

    /// Pushes a token back so that the next call to [`next`](Iterator::next) returns it again.
    ///
    /// Only a single token of lookahead is kept.
    pub fn unread(&mut self, token: Token) {
        self.unread = Some(token);
    }

    pub fn reset(&mut self) {
        self.line.clear();
        self.pos = 0;
        self.step = 0;
        self.unread = None;
        self.running = false;
    }

    fn producer(&self, step: usize) -> &Producer {
        if step % 2 == 0 {
            &self.producers[step / 2]
        } else {
            &Producer::SPACE
        }
    }
}

impl Iterator for Scanner {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.unread.take() {
            return Some(token);
        }
        if !self.running || self.step >= self.expected() {
            return None;
        }

        let producer = *self.producer(self.step);
        let mut cursor = Cursor::new(&self.line, self.pos);
        let token = producer.produce(&mut cursor);
        self.pos = cursor.pos();
        self.step += 1;

        Some(token)
    }
}
