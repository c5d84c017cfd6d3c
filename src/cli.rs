// std imports
use std::path::PathBuf;

// third-party imports
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};

// local imports
use crate::grammar::Grammar;
use crate::output::Projection;

// ---

/// Access log parser, reads web server access logs and prints the requested information.
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Opt {
    /// Configuration file, defaults to the per-user config.yaml if it exists.
    #[arg(long, short = 'c', env = "AXE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Number of parser threads, 0 means the number of available CPUs.
    #[arg(long, short = 'C', env = "AXE_CONCURRENCY", global = true)]
    pub concurrency: Option<usize>,

    /// Log line format.
    #[arg(long, short = 'F', env = "AXE_FORMAT", global = true, value_parser = PossibleValuesParser::new(Grammar::KNOWN))]
    pub format: Option<String>,

    /// Capacity of the internal line and record queues.
    #[arg(long, env = "AXE_QUEUE_CAPACITY", global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub queue_capacity: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print whole records in combined log format.
    Lines(Input),
    /// Print client addresses.
    Ips(Input),
    /// Print request targets.
    Paths(Input),
    /// Print request lines.
    Requests(Input),
    /// Print referring URLs.
    Referrers(Input),
    /// Print response status codes.
    Statuses(Input),
    /// Print request times.
    Times(TimesArgs),
    /// Print user agents.
    UserAgents(Input),
}

impl Command {
    pub fn projection(&self) -> Projection {
        match self {
            Self::Lines(_) => Projection::Lines,
            Self::Ips(_) => Projection::Ips,
            Self::Paths(_) => Projection::Paths,
            Self::Requests(_) => Projection::Requests,
            Self::Referrers(_) => Projection::Referrers,
            Self::Statuses(_) => Projection::Statuses,
            Self::Times(_) => Projection::Times,
            Self::UserAgents(_) => Projection::UserAgents,
        }
    }

    pub fn input(&self) -> &Input {
        match self {
            Self::Lines(input)
            | Self::Ips(input)
            | Self::Paths(input)
            | Self::Requests(input)
            | Self::Referrers(input)
            | Self::Statuses(input)
            | Self::UserAgents(input) => input,
            Self::Times(args) => &args.input,
        }
    }

    pub fn time_format(&self) -> Option<&str> {
        match self {
            Self::Times(args) => args.time_format.as_deref(),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    /// Files to process, standard input is used if none is given or for '-'.
    #[arg(name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TimesArgs {
    /// Time format, see https://docs.rs/chrono/latest/chrono/format/strftime/index.html.
    #[arg(long, short = 't', env = "AXE_TIME_FORMAT")]
    pub time_format: Option<String>,

    #[command(flatten)]
    pub input: Input,
}
