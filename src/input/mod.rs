//! Step input.
//!
//! Steps come either from positional arguments (one step) or from piped
//! standard input (one step per line). Which one applies is decided once,
//! up front, by [`InputSource::detect`].

use std::io::BufRead;

use crate::error::{Error, Result};

/// Where the steps of an authoring run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Positional arguments form a single step.
    Args(Vec<String>),
    /// Read one step per line from standard input.
    Pipe,
    /// No arguments and stdin is a terminal.
    RejectInteractive,
}

impl InputSource {
    /// Pick the input source from the positional arguments and whether stdin is a tty.
    pub fn detect(args: Vec<String>, stdin_is_terminal: bool) -> Self {
        if !args.is_empty() {
            Self::Args(args)
        } else if stdin_is_terminal {
            Self::RejectInteractive
        } else {
            Self::Pipe
        }
    }
}

/// Iterator over step argument lists read line by line.
///
/// Each line becomes a single-token list holding the line verbatim. Line
/// terminators (`\n` or `\r\n`) are stripped; a last line without one still
/// counts.
#[derive(Debug)]
pub struct StepLines<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> StepLines<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self { reader, done: false }
    }
}

impl<R: BufRead> Iterator for StepLines<R> {
    type Item = std::io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(Ok(vec![line]))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Gather every step argument list for the chosen input source.
///
/// `reader` is only consumed for [`InputSource::Pipe`].
pub fn collect_steps<R: BufRead>(source: InputSource, reader: R) -> Result<Vec<Vec<String>>> {
    match source {
        InputSource::Args(args) => Ok(vec![args]),
        InputSource::RejectInteractive => Err(Error::InteractiveUnsupported),
        InputSource::Pipe => {
            let lists = StepLines::new(reader)
                .collect::<std::io::Result<Vec<_>>>()
                .map_err(Error::Input)?;
            tracing::debug!(steps = lists.len(), "Read steps from stdin");
            Ok(lists)
        }
    }
}
