// local imports
use crate::error::{Error, Result};
use crate::field::FieldParser;
use crate::scanner::Producer;

// ---

/// Ordered list of field parsers describing one supported log line format.
///
/// A grammar is never modified after construction, share it between parsers with an `Arc`.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: &'static str,
    fields: Vec<FieldParser>,
}

impl Grammar {
    /// Names of the predefined grammars.
    pub const KNOWN: &'static [&'static str] = &["combined", "common"];

    pub fn new(name: &'static str, fields: Vec<FieldParser>) -> Self {
        Self { name, fields }
    }

    /// NCSA combined log format, the default format of nginx and a common choice for apache:
    /// `$remote_addr - $remote_user [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`.
    pub fn combined() -> Self {
        Self::new(
            "combined",
            vec![
                FieldParser::ADDRESS,
                FieldParser::IGNORE,
                FieldParser::USER,
                FieldParser::TIME,
                FieldParser::REQUEST,
                FieldParser::STATUS,
                FieldParser::BODY_BYTES,
                FieldParser::REFERRER,
                FieldParser::USER_AGENT,
            ],
        )
    }

    /// NCSA common log format, same as combined without referrer and user agent.
    pub fn common() -> Self {
        Self::new(
            "common",
            vec![
                FieldParser::ADDRESS,
                FieldParser::IGNORE,
                FieldParser::USER,
                FieldParser::TIME,
                FieldParser::REQUEST,
                FieldParser::STATUS,
                FieldParser::BODY_BYTES,
            ],
        )
    }

    /// Returns a predefined grammar by its name.
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "combined" => Ok(Self::combined()),
            "common" => Ok(Self::common()),
            _ => Err(Error::UnknownFormat {
                name: name.into(),
                known: Self::KNOWN.to_vec(),
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn fields(&self) -> &[FieldParser] {
        &self.fields
    }

    /// Flattened list of producers the scanner runs for one line.
    pub fn producers(&self) -> Vec<Producer> {
        self.fields.iter().flat_map(|f| f.shape()).copied().collect()
    }

    /// Number of tokens required by all fields, not counting automatic space tokens.
    pub fn token_count(&self) -> usize {
        self.fields.iter().map(|f| f.shape().len()).sum()
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::combined()
    }
}
