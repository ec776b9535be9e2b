//! Fault taxonomy of the interpreter and the reporter that renders it.
//!
//! Faults come in two flavours. A [`ParseFault`] aborts the current line only and
//! leaves every register untouched. A [`FatalFault`] ends the whole session; only
//! the REPL driver acts on it, parsing code never terminates the process itself.

use std::io::{self, Write};

/// A recoverable input fault detected while classifying or parsing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseFault {
    /// The first word of the line is not a known command name.
    #[error("Undefined command name")]
    UndefinedCommand,
    /// A register is required but the text there is not one of `MAT_A`..`MAT_F`.
    #[error("Undefined matrix name")]
    UndefinedRegister,
    /// A comma appears right after the command name, before the first operand.
    #[error("Illegal comma")]
    IllegalComma,
    /// A separating comma is required but something else was found.
    #[error("Missing comma")]
    MissingComma,
    /// Two commas follow each other with no operand in between.
    #[error("Multiple consecutive commas")]
    UnnecessaryComma,
    /// The line ended where an operand was mandatory.
    #[error("Missing argument")]
    MissingArgument,
    /// Characters remain after the command's grammar was fully satisfied.
    #[error("Extraneous text after end of command")]
    ExtraneousText,
    /// A numeric scan consumed nothing.
    #[error("Argument is not a real number")]
    NotANumber,
}

/// A fault that ends the session with a failure status.
#[derive(Debug, thiserror::Error)]
pub enum FatalFault {
    /// The input ran out before a `stop` command was seen.
    #[error("Premature end of file encountered, missing stop command")]
    PrematureEndOfStream,
    /// The line buffer could not be grown.
    #[error("Memory allocation failed")]
    AllocationFailure,
    /// Reading input or writing output failed.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
    /// The interactive line editor failed for a reason other than end of input.
    #[error("line editor failure: {0}")]
    Editor(String),
}

/// Either kind of fault, as seen by the REPL driver.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    #[error(transparent)]
    Recoverable(#[from] ParseFault),
    #[error(transparent)]
    Fatal(#[from] FatalFault),
}

impl Fault {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Fault::Fatal(_))
    }
}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Self {
        Fault::Fatal(FatalFault::Io(err))
    }
}

/// Write a single `[Error]` line describing `fault`.
///
/// The reporter only renders; deciding whether the session continues is left to
/// the caller.
pub fn report(stderr: &mut dyn Write, fault: &Fault) -> io::Result<()> {
    writeln!(stderr, "[Error] {}", fault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_prefixes_error_tag() {
        let mut out = Vec::<u8>::new();
        report(&mut out, &ParseFault::UndefinedRegister.into()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[Error] Undefined matrix name\n");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Fault::from(FatalFault::PrematureEndOfStream).is_fatal());
        assert!(Fault::from(FatalFault::AllocationFailure).is_fatal());
        assert!(!Fault::from(ParseFault::ExtraneousText).is_fatal());
    }

    #[test]
    fn test_io_error_is_fatal() {
        let fault = Fault::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(fault.is_fatal());
        let mut out = Vec::<u8>::new();
        report(&mut out, &fault).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[Error] I/O failure: gone\n");
    }
}
