// std imports
use std::sync::Arc;

// local imports
use crate::error::{Error, Result};
use crate::field::FieldError;
use crate::grammar::Grammar;
use crate::record::Record;
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

// ---

/// Parses lines into records according to a grammar.
///
/// A parser keeps its scanner between lines, so a single instance should be reused
/// for all lines processed by the same thread.
#[derive(Debug)]
pub struct Parser {
    grammar: Arc<Grammar>,
    scanner: Scanner,
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(grammar: Arc<Grammar>) -> Self {
        let scanner = Scanner::new(grammar.producers());
        Self {
            grammar,
            scanner,
            tokens: Vec::new(),
        }
    }

    #[inline]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parses a single line.
    ///
    /// Malformed fields do not stop parsing: the remaining fields are still filled and
    /// the first failure in grammar order is stored in [`Record::error`].
    /// An error is returned only if the scanner and the field parsers went out of sync,
    /// which means the grammar itself is broken.
    pub fn parse(&mut self, line: &str) -> Result<Record> {
        self.scanner.run(line);
        let result = self.parse_fields();
        self.reset();
        result
    }

    fn parse_fields(&mut self) -> Result<Record> {
        let grammar = self.grammar.clone();
        let mut record = Record::default();

        for field in grammar.fields() {
            self.tokens.clear();
            for _ in 0..field.shape().len() {
                match self.next_ignoring_space() {
                    Some(token) => self.tokens.push(token),
                    None => break,
                }
            }

            match field.parse(&self.tokens) {
                Ok(parsed) => record.merge(field.kind(), parsed.value)?,
                Err(FieldError::ItemCount {
                    field,
                    expected,
                    actual,
                }) => {
                    return Err(Error::ItemCount {
                        field,
                        expected,
                        actual,
                    });
                }
                Err(err) => record.fail(err),
            }
        }

        Ok(record)
    }

    /// Returns the next token, skipping a single space token in front of it.
    fn next_ignoring_space(&mut self) -> Option<Token> {
        match self.scanner.next()? {
            token if token.kind == TokenKind::Space => self.scanner.next(),
            token => Some(token),
        }
    }

    fn reset(&mut self) {
        self.tokens.clear();
        self.scanner.reset();
    }
}
