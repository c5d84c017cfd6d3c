// public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod field;
pub mod grammar;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod scanner;
pub mod settings;
pub mod token;

// public uses
pub use error::{Error, Result};
pub use field::{FieldError, FieldKind, LineError, Value};
pub use grammar::Grammar;
pub use output::{Printer, Projection};
pub use parser::Parser;
pub use pipeline::{Options, Output, Pipeline, Stats};
pub use record::{HttpVersion, Record, Referrer, Request};
pub use scanner::Scanner;
pub use settings::Settings;
pub use token::{Token, TokenKind};
