//! Line acquisition.
//!
//! A [`LineSource`] hands the interpreter one line at a time. `Ok(None)` means the
//! input ended before a line feed was seen; the driver treats that as fatal.

use crate::error::FatalFault;
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

/// Starting capacity of the line buffer; it doubles each time it fills up.
pub const INITIAL_LINE_CAPACITY: usize = 100;

/// Anything the REPL can pull command lines from.
pub trait LineSource {
    /// Read one line, without its terminator.
    ///
    /// `prompt` is shown by sources that own the terminal; others ignore it.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, FatalFault>;
}

/// Reads lines from any buffered byte stream (piped stdin, files, in-memory buffers).
pub struct StreamLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> StreamLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

/// Make room for `additional` more bytes, doubling the capacity as often as needed.
fn reserve_doubling(buf: &mut Vec<u8>, additional: usize) -> Result<(), FatalFault> {
    let needed = buf
        .len()
        .checked_add(additional)
        .ok_or(FatalFault::AllocationFailure)?;
    if needed <= buf.capacity() {
        return Ok(());
    }
    let mut target = buf.capacity().max(INITIAL_LINE_CAPACITY);
    while target < needed {
        target = target.checked_mul(2).ok_or(FatalFault::AllocationFailure)?;
    }
    buf.try_reserve_exact(target - buf.len())
        .map_err(|_| FatalFault::AllocationFailure)
}

impl<R: BufRead> LineSource for StreamLines<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, FatalFault> {
        self.buf.clear();
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                // End of stream, whether or not part of a line was read.
                return Ok(None);
            }
            let newline = available.iter().position(|&b| b == b'\n');
            let take = newline.unwrap_or(available.len());
            reserve_doubling(&mut self.buf, take)?;
            self.buf.extend_from_slice(&available[..take]);

            match newline {
                Some(_) => {
                    self.reader.consume(take + 1);
                    break;
                }
                None => self.reader.consume(take),
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// Interactive source backed by `rustyline`, with in-session history.
pub struct EditorLines {
    editor: DefaultEditor,
}

impl EditorLines {
    pub fn new() -> anyhow::Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialize line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorLines {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, FatalFault> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .map_err(|e| FatalFault::Editor(e.to_string()))?;
                }
                Ok(Some(line))
            }
            // Ctrl-C ends the session the same way Ctrl-D does.
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(FatalFault::Io(err)),
            Err(err) => Err(FatalFault::Editor(err.to_string())),
        }
    }
}
