//! An interactive calculator for fixed 4x4 matrices.
//!
//! The crate reads one command per line, parses it by hand with a small set of
//! cursor primitives, and applies matrix algebra to six named registers
//! (`MAT_A` .. `MAT_F`). Malformed lines are reported and skipped; the session
//! ends on `stop` or, with a failure status, when the input runs out.
//!
//! The main entry point is [`Interpreter`]. Lines come from any [`LineSource`]:
//! [`StreamLines`] for piped input and tests, [`EditorLines`] for a terminal.

pub mod command;
pub mod error;
pub mod input;
mod interpreter;
pub mod matrix;
pub mod parser;
pub mod registers;
pub mod scanner;

pub use error::{FatalFault, Fault, ParseFault};
pub use input::{EditorLines, LineSource, StreamLines};
pub use interpreter::{Config, EXIT_FAILURE, EXIT_SUCCESS, ExitCode, Flow, Interpreter};
