// std imports
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

// third-party imports
use chrono::{DateTime, FixedOffset};
use url::Url;

// local imports
use crate::error::{Error, Result};
use crate::field::{ABSENT, ConversionError, FieldError, FieldKind, TIME_FORMAT, Value};

// ---

/// Parsed access log line.
///
/// Fields that failed to parse keep their default values, the first failure is stored in `error`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub address: Option<IpAddr>,
    pub user: String,
    pub time: Option<DateTime<FixedOffset>>,
    pub request: Option<Request>,
    pub status: i64,
    pub body_bytes: i64,
    pub referrer: Option<Referrer>,
    pub user_agent: String,
    pub error: Option<FieldError>,
}

impl Record {
    /// Stores a value produced by the parser of the given field.
    ///
    /// Fails if the value does not belong to the field.
    pub fn merge(&mut self, field: FieldKind, value: Value) -> Result<()> {
        if value.kind() != field {
            return Err(Error::ValueMismatch {
                field,
                actual: value.kind(),
            });
        }

        match value {
            Value::Address(address) => self.address = address,
            Value::Ignored => {}
            Value::User(user) => self.user = user,
            Value::Time(time) => self.time = Some(time),
            Value::Request(request) => self.request = Some(request),
            Value::Status(status) => self.status = status,
            Value::BodyBytes(body_bytes) => self.body_bytes = body_bytes,
            Value::Referrer(referrer) => self.referrer = referrer,
            Value::UserAgent(user_agent) => self.user_agent = user_agent,
        }

        Ok(())
    }

    /// Records a field failure unless an earlier field has already failed.
    pub fn fail(&mut self, error: FieldError) {
        self.error.get_or_insert(error);
    }
}

/// Renders the record in combined log format:
/// `address - user [time] "method target version" status body_bytes "referrer" "user_agent"`.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{address}")?,
            None => f.write_str(ABSENT)?,
        }
        write!(f, " - {} [", self.user)?;
        match &self.time {
            Some(time) => write!(f, "{}", time.format(TIME_FORMAT))?,
            None => f.write_str(ABSENT)?,
        }
        f.write_str("] \"")?;
        match &self.request {
            Some(request) => write!(f, "{request}")?,
            None => write!(f, "  {}", HttpVersion::default())?,
        }
        write!(f, "\" {} {} \"", self.status, self.body_bytes)?;
        match &self.referrer {
            Some(referrer) => f.write_str(referrer.as_str())?,
            None => f.write_str(ABSENT)?,
        }
        write!(f, "\" \"{}\"", self.user_agent)
    }
}

// ---

/// Referring URL.
///
/// The text must be an absolute URL, it is kept as it appeared in the line
/// so that rendering does not normalize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referrer {
    url: Url,
    raw: String,
}

impl Referrer {
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Referrer {
    type Err = ConversionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self {
            url: Url::parse(s)?,
            raw: s.into(),
        })
    }
}

impl fmt::Display for Referrer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---

/// Request line, e.g. `GET /index.html HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub target: String,
    pub version: HttpVersion,
}

impl FromStr for Request {
    type Err = ConversionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ConversionError::RequestParts(parts.len()));
        };

        if method.is_empty() || !method.bytes().all(is_token_char) {
            return Err(ConversionError::RequestMethod(method.into()));
        }
        if target.is_empty() {
            return Err(ConversionError::RequestTarget);
        }

        Ok(Self {
            method: method.into(),
            target: target.into(),
            version: version.parse()?,
        })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

// tchar from RFC 7230
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

// ---

/// HTTP protocol version in `HTTP/<major>.<minor>` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpVersion {
    pub major: u8,
    pub minor: u8,
}

impl HttpVersion {
    pub const HTTP_1_0: Self = Self { major: 1, minor: 0 };
    pub const HTTP_1_1: Self = Self { major: 1, minor: 1 };
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

impl FromStr for HttpVersion {
    type Err = ConversionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ConversionError::HttpVersion(s.into());
        match s.strip_prefix("HTTP/").map(str::as_bytes) {
            Some(&[major, b'.', minor]) if major.is_ascii_digit() && minor.is_ascii_digit() => Ok(Self {
                major: major - b'0',
                minor: minor - b'0',
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}
