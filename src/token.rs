// third-party imports
use strum::{AsRefStr, Display};

// ---

/// Kind of a token emitted by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TokenKind {
    /// Input at the cursor did not have the shape the producer expected.
    Error,
    Space,
    Integer,
    Word,
    LeftDelimiter,
    RightDelimiter,
    QuotedString,
    Address,
}

// ---

/// Smallest typed unit of a line.
///
/// `pos` is the byte offset of the first character of `text` within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
    pub text: String,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, pos: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            text: text.into(),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }
}
