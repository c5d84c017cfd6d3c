// std imports
use std::io::{self, Write};

// third-party imports
use chrono::format::{Item, StrftimeItems};
use strum::{AsRefStr, Display, EnumIter};

// local imports
use crate::error::{Error, Result};
use crate::field::LineError;
use crate::pipeline;
use crate::record::Record;

// ---

pub type OutputStream = Box<dyn Write + Send>;

/// Part of a record to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Projection {
    /// Whole record in combined log format.
    #[default]
    Lines,
    Ips,
    Paths,
    /// `method target version`.
    Requests,
    Referrers,
    Statuses,
    /// `[time]`, formatted with the configured time format.
    Times,
    UserAgents,
}

impl Projection {
    /// Writes the projected field followed by a newline.
    /// Nothing is written if the field is absent in the record.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W, record: &Record, time_format: &str) -> io::Result<()> {
        match self {
            Self::Lines => writeln!(w, "{record}"),
            Self::Ips => match &record.address {
                Some(address) => writeln!(w, "{address}"),
                None => Ok(()),
            },
            Self::Paths => match &record.request {
                Some(request) => writeln!(w, "{}", request.target),
                None => Ok(()),
            },
            Self::Requests => match &record.request {
                Some(request) => writeln!(w, "{request}"),
                None => Ok(()),
            },
            Self::Referrers => match &record.referrer {
                Some(referrer) => writeln!(w, "{referrer}"),
                None => Ok(()),
            },
            Self::Statuses => writeln!(w, "{}", record.status),
            Self::Times => match &record.time {
                Some(time) => writeln!(w, "[{}]", time.format(time_format)),
                None => Ok(()),
            },
            Self::UserAgents => writeln!(w, "{}", record.user_agent),
        }
    }
}

// ---

/// Prints projected records to one stream and line errors to another.
#[derive(Debug)]
pub struct Printer<W, E> {
    projection: Projection,
    time_format: String,
    out: W,
    err: E,
}

impl<W: Write, E: Write> Printer<W, E> {
    /// Returns a new Printer, fails if the time format contains invalid specifiers.
    pub fn new(projection: Projection, time_format: impl Into<String>, out: W, err: E) -> Result<Self> {
        let time_format = time_format.into();
        if StrftimeItems::new(&time_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidTimeFormat(time_format));
        }

        Ok(Self {
            projection,
            time_format,
            out,
            err,
        })
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> pipeline::Output for Printer<W, E> {
    fn on_record(&mut self, record: Record) -> Result<()> {
        Ok(self.projection.write(&mut self.out, &record, &self.time_format)?)
    }

    fn on_error(&mut self, error: LineError) -> Result<()> {
        Ok(writeln!(self.err, "{error}")?)
    }
}
