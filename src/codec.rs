//! Reading of the whitespace-delimited numeric text formats used by
//! [`NeuralNet::load`](crate::neural::NeuralNet::load) and
//! [`Pattern::load`](crate::pattern::Pattern::load).
//!
//! Fields carry no type tags, so the caller asks for the kind of field it
//! expects next and gets a [`Error::Parse`] if the token doesn't fit.

use std::{collections::VecDeque, io::BufRead, str::FromStr};

use crate::prelude::*;

/// Pulls whitespace- or line-delimited tokens out of a buffered reader,
/// one line at a time.
pub struct FieldReader<R> {
    reader: R,
    pending: VecDeque<String>,
    line: usize,
}

impl<R: BufRead> FieldReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            line: 0,
        }
    }

    /// Line number of the most recently read line (1-based, 0 before any read).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Refills the token queue until it holds something or the reader is done.
    /// Returns false at end of input.
    fn fill(&mut self) -> Result<bool> {
        let mut buf = String::new();
        while self.pending.is_empty() {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(false);
            }
            self.line += 1;
            self.pending.extend(buf.split_whitespace().map(str::to_owned));
        }
        Ok(true)
    }

    /// True once only whitespace remains. Consumes trailing blank lines.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        Ok(!self.fill()?)
    }

    fn next_parsed<T: FromStr>(&mut self, expected: &'static str) -> Result<T> {
        if !self.fill()? {
            return Err(Error::UnexpectedEof { expected });
        }
        let token = self
            .pending
            .pop_front()
            .ok_or(Error::UnexpectedEof { expected })?;
        token.parse().map_err(|_| Error::Parse {
            line: self.line,
            token,
            expected,
        })
    }

    pub fn next_f64(&mut self) -> Result<f64> {
        self.next_parsed("a real number")
    }

    pub fn next_usize(&mut self) -> Result<usize> {
        self.next_parsed("a non-negative integer")
    }

    pub fn next_i64(&mut self) -> Result<i64> {
        self.next_parsed("an integer")
    }
}
