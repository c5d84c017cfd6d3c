// std imports
use std::fmt;
use std::net::IpAddr;
use std::num::ParseIntError;
use std::ops::Range;

// third-party imports
use chrono::{DateTime, FixedOffset};
use strum::{AsRefStr, Display};
use thiserror::Error;

// local imports
use crate::record::{Referrer, Request};
use crate::scanner::{Producer, is_quote};
use crate::token::Token;

// ---

/// Format of the delimited time field, e.g. `10/Oct/2020:13:55:36 -0700`.
pub const TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Placeholder text used for absent values.
pub const ABSENT: &str = "-";

pub type Span = Range<usize>;

// ---

/// Semantic kind of a record field, also used as the field name in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FieldKind {
    Address,
    Ignore,
    User,
    Time,
    Request,
    Status,
    BodyBytes,
    Referrer,
    UserAgent,
}

// ---

/// Value produced by a field parser, one variant per field kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `None` if the text could not be parsed as an IP address.
    Address(Option<IpAddr>),
    Ignored,
    User(String),
    Time(DateTime<FixedOffset>),
    Request(Request),
    Status(i64),
    BodyBytes(i64),
    /// `None` for the `-` placeholder.
    Referrer(Option<Referrer>),
    UserAgent(String),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Address(_) => FieldKind::Address,
            Self::Ignored => FieldKind::Ignore,
            Self::User(_) => FieldKind::User,
            Self::Time(_) => FieldKind::Time,
            Self::Request(_) => FieldKind::Request,
            Self::Status(_) => FieldKind::Status,
            Self::BodyBytes(_) => FieldKind::BodyBytes,
            Self::Referrer(_) => FieldKind::Referrer,
            Self::UserAgent(_) => FieldKind::UserAgent,
        }
    }
}

/// A value together with the byte span of the tokens it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    pub span: Span,
}

// ---

/// Reason a well-shaped token could not be converted to its field value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error(transparent)]
    Time(#[from] chrono::ParseError),
    #[error(transparent)]
    Integer(#[from] ParseIntError),
    /// Integer fields hold plain digits, an explicit sign is not allowed.
    #[error("unexpected sign in {0:?}")]
    Signed(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("invalid number of request parts: {0}")]
    RequestParts(usize),
    #[error("invalid request method {0:?}")]
    RequestMethod(String),
    #[error("empty request target")]
    RequestTarget,
    #[error("invalid HTTP version {0:?}")]
    HttpVersion(String),
}

/// Failure of a single field within a line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A token did not have the shape the field requires.
    #[error("invalid value:{pos}: {text}")]
    InvalidToken { field: FieldKind, pos: usize, text: String },
    #[error("{field}: {cause}")]
    Conversion {
        field: FieldKind,
        pos: usize,
        cause: ConversionError,
    },
    /// The field received a different number of tokens than its shape requires.
    /// This means the scanner and the parser went out of sync.
    #[error("invalid number of items: expected {expected}, got {actual}")]
    ItemCount {
        field: FieldKind,
        expected: usize,
        actual: usize,
    },
}

impl FieldError {
    pub fn field(&self) -> FieldKind {
        match self {
            Self::InvalidToken { field, .. } | Self::Conversion { field, .. } | Self::ItemCount { field, .. } => *field,
        }
    }

    /// Byte offset within the line the error is attributed to.
    pub fn pos(&self) -> usize {
        match self {
            Self::InvalidToken { pos, .. } | Self::Conversion { pos, .. } => *pos,
            Self::ItemCount { .. } => 0,
        }
    }
}

/// Field error attributed to an input line, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub line: u64,
    pub error: FieldError,
}

impl LineError {
    pub fn new(line: u64, error: FieldError) -> Self {
        Self { line, error }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.error)
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// ---

type Convert = fn(&[Token]) -> Result<Value, ConversionError>;

/// Binds a fixed window of token producers to a record field.
#[derive(Clone, Copy)]
pub struct FieldParser {
    kind: FieldKind,
    shape: &'static [Producer],
    convert: Option<Convert>,
}

impl FieldParser {
    pub const ADDRESS: Self = Self::new(FieldKind::Address, &[Producer::ADDRESS], Some(convert_address));
    pub const IGNORE: Self = Self::new(FieldKind::Ignore, &[Producer::WORD], None);
    pub const USER: Self = Self::new(FieldKind::User, &[Producer::WORD], Some(convert_user));
    pub const TIME: Self = Self::new(
        FieldKind::Time,
        &[
            Producer::LEFT_DELIMITER,
            Producer::WORD,
            Producer::WORD,
            Producer::RIGHT_DELIMITER,
        ],
        Some(convert_time),
    );
    pub const REQUEST: Self = Self::new(FieldKind::Request, &[Producer::QUOTED_STRING], Some(convert_request));
    pub const STATUS: Self = Self::new(FieldKind::Status, &[Producer::INTEGER], Some(convert_status));
    pub const BODY_BYTES: Self = Self::new(FieldKind::BodyBytes, &[Producer::INTEGER], Some(convert_body_bytes));
    pub const REFERRER: Self = Self::new(FieldKind::Referrer, &[Producer::QUOTED_STRING], Some(convert_referrer));
    pub const USER_AGENT: Self = Self::new(FieldKind::UserAgent, &[Producer::QUOTED_STRING], Some(convert_user_agent));

    /// Returns a new field parser.
    ///
    /// A parser without a conversion function consumes its tokens and yields [`Value::Ignored`].
    pub const fn new(kind: FieldKind, shape: &'static [Producer], convert: Option<Convert>) -> Self {
        Self { kind, shape, convert }
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[inline]
    pub fn shape(&self) -> &'static [Producer] {
        self.shape
    }

    /// Converts the tokens matched for this field into a value.
    ///
    /// Tokens whose kind differs from the corresponding producer in the shape are treated as malformed,
    /// the conversion is not attempted in that case.
    pub fn parse(&self, tokens: &[Token]) -> Result<Parsed, FieldError> {
        if tokens.len() != self.shape.len() {
            return Err(FieldError::ItemCount {
                field: self.kind,
                expected: self.shape.len(),
                actual: tokens.len(),
            });
        }

        let span = span(tokens);
        let Some(convert) = self.convert else {
            return Ok(Parsed {
                value: Value::Ignored,
                span,
            });
        };

        if let Some(token) = tokens
            .iter()
            .zip(self.shape)
            .find_map(|(token, producer)| (token.kind != producer.kind()).then_some(token))
        {
            return Err(FieldError::InvalidToken {
                field: self.kind,
                pos: token.pos,
                text: token.text.clone(),
            });
        }

        match convert(tokens) {
            Ok(value) => Ok(Parsed { value, span }),
            Err(cause) => Err(FieldError::Conversion {
                field: self.kind,
                pos: span.start,
                cause,
            }),
        }
    }
}

impl fmt::Debug for FieldParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldParser")
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .finish()
    }
}

fn span(tokens: &[Token]) -> Span {
    let start = tokens.iter().map(|t| t.pos).min().unwrap_or_default();
    let end = tokens.iter().map(|t| t.pos + t.text.len()).max().unwrap_or_default();
    start..end
}

// ---

fn convert_address(tokens: &[Token]) -> Result<Value, ConversionError> {
    // unparsable addresses are tolerated and reported as absent
    Ok(Value::Address(tokens[0].text.parse().ok()))
}

fn convert_user(tokens: &[Token]) -> Result<Value, ConversionError> {
    Ok(Value::User(tokens[0].text.clone()))
}

fn convert_time(tokens: &[Token]) -> Result<Value, ConversionError> {
    let text = format!("{} {}", tokens[1].text, tokens[2].text);
    Ok(Value::Time(DateTime::parse_from_str(&text, TIME_FORMAT)?))
}

fn convert_request(tokens: &[Token]) -> Result<Value, ConversionError> {
    Ok(Value::Request(unquote(&tokens[0].text).parse()?))
}

fn convert_status(tokens: &[Token]) -> Result<Value, ConversionError> {
    Ok(Value::Status(parse_unsigned(&tokens[0].text)?))
}

fn convert_body_bytes(tokens: &[Token]) -> Result<Value, ConversionError> {
    Ok(Value::BodyBytes(parse_unsigned(&tokens[0].text)?))
}

fn parse_unsigned(text: &str) -> Result<i64, ConversionError> {
    if text.starts_with(['+', '-']) {
        return Err(ConversionError::Signed(text.into()));
    }
    Ok(text.parse()?)
}

fn convert_referrer(tokens: &[Token]) -> Result<Value, ConversionError> {
    match unquote(&tokens[0].text) {
        ABSENT => Ok(Value::Referrer(None)),
        text => Ok(Value::Referrer(Some(text.parse()?))),
    }
}

fn convert_user_agent(tokens: &[Token]) -> Result<Value, ConversionError> {
    Ok(Value::UserAgent(unquote(&tokens[0].text).to_owned()))
}

/// Strips a matching pair of surrounding quotes.
fn unquote(s: &str) -> &str {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && is_quote(first) => chars.as_str(),
        _ => s,
    }
}

#[cfg(test)]
mod tests;
