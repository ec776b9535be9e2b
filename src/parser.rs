//! Per-command grammars.
//!
//! A line is fully validated into an [`Instruction`] before anything is executed,
//! so a fault anywhere in the line leaves the registers exactly as they were.

use crate::command::{CommandKind, classify};
use crate::error::ParseFault;
use crate::matrix::CELLS;
use crate::registers::{RegisterId, resolve};
use crate::scanner::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

/// A validated command, ready to run against the registers.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Load up to sixteen values row-major into `dst`.
    Read { dst: RegisterId, values: Vec<f64> },
    Print(RegisterId),
    Binary {
        op: BinaryOp,
        lhs: RegisterId,
        rhs: RegisterId,
        dst: RegisterId,
    },
    Scale {
        src: RegisterId,
        scalar: f64,
        dst: RegisterId,
    },
    Transpose { src: RegisterId, dst: RegisterId },
    Stop,
}

/// Walks the argument list of one command with a cursor.
struct ArgumentParser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> ArgumentParser<'a> {
    fn new(cursor: Cursor<'a>) -> Self {
        ArgumentParser { cursor }
    }

    /// A comma where the first operand should be.
    fn reject_illegal_comma(&self) -> Result<(), ParseFault> {
        if self.cursor.peek_is(b',') {
            return Err(ParseFault::IllegalComma);
        }
        Ok(())
    }

    /// Nothing but the terminator may remain.
    fn expect_end(&self) -> Result<(), ParseFault> {
        if !self.cursor.is_end_of_command() {
            return Err(ParseFault::ExtraneousText);
        }
        Ok(())
    }

    fn require_argument(&self) -> Result<(), ParseFault> {
        if self.cursor.is_end_of_command() {
            return Err(ParseFault::MissingArgument);
        }
        Ok(())
    }

    /// Consume a separating comma and the whitespace after it.
    ///
    /// A second comma right after the first is rejected here.
    fn expect_comma(&mut self) -> Result<(), ParseFault> {
        if !self.cursor.peek_is(b',') {
            return Err(ParseFault::MissingComma);
        }
        self.cursor.bump();
        self.cursor.skip_whitespace();
        if self.cursor.peek_is(b',') {
            return Err(ParseFault::UnnecessaryComma);
        }
        Ok(())
    }

    fn register(&mut self) -> Result<RegisterId, ParseFault> {
        self.require_argument()?;
        let id = resolve(&self.cursor).ok_or(ParseFault::UndefinedRegister)?;
        self.cursor.skip_fixed_width();
        self.cursor.skip_whitespace();
        Ok(id)
    }

    fn number(&mut self) -> Result<f64, ParseFault> {
        self.require_argument()?;
        let value = self.cursor.scan_number().ok_or(ParseFault::NotANumber)?;
        self.cursor.skip_whitespace();
        Ok(value)
    }

    fn parse(mut self, kind: CommandKind) -> Result<Instruction, ParseFault> {
        self.cursor.skip_whitespace();
        self.reject_illegal_comma()?;

        if kind == CommandKind::Stop {
            self.expect_end()?;
            return Ok(Instruction::Stop);
        }

        let first = self.register()?;
        match kind {
            CommandKind::PrintMat => {
                self.expect_end()?;
                Ok(Instruction::Print(first))
            }
            CommandKind::TransMat => {
                self.expect_comma()?;
                let dst = self.register()?;
                self.expect_end()?;
                Ok(Instruction::Transpose { src: first, dst })
            }
            CommandKind::MulScalar => {
                self.expect_comma()?;
                let scalar = self.number()?;
                self.expect_comma()?;
                let dst = self.register()?;
                self.expect_end()?;
                Ok(Instruction::Scale {
                    src: first,
                    scalar,
                    dst,
                })
            }
            CommandKind::AddMat | CommandKind::SubMat | CommandKind::MulMat => {
                self.expect_comma()?;
                let rhs = self.register()?;
                self.expect_comma()?;
                let dst = self.register()?;
                self.expect_end()?;
                let op = match kind {
                    CommandKind::AddMat => BinaryOp::Add,
                    CommandKind::SubMat => BinaryOp::Sub,
                    _ => BinaryOp::Mul,
                };
                Ok(Instruction::Binary {
                    op,
                    lhs: first,
                    rhs,
                    dst,
                })
            }
            CommandKind::ReadMat => self.parse_values(first),
            CommandKind::Stop => unreachable!("stop is handled before operands"),
        }
    }

    /// `, v1 [, v2 ...]` after the destination of `read_mat`.
    fn parse_values(mut self, dst: RegisterId) -> Result<Instruction, ParseFault> {
        self.require_argument()?;
        self.expect_comma()?;
        self.require_argument()?;

        let mut values = Vec::with_capacity(CELLS);
        loop {
            let value = self.cursor.scan_number().ok_or(ParseFault::NotANumber)?;
            // Values past the sixteenth are still validated, then dropped.
            if values.len() < CELLS {
                values.push(value);
            }
            self.cursor.skip_whitespace();
            if self.cursor.is_end_of_command() {
                break;
            }

            if !self.cursor.peek_is(b',') {
                // A lone stray character ending the line is leftover text; anything
                // longer means a separator was left out.
                self.cursor.bump();
                self.cursor.skip_whitespace();
                return Err(if self.cursor.is_end_of_command() {
                    ParseFault::ExtraneousText
                } else {
                    ParseFault::MissingComma
                });
            }
            self.expect_comma()?;
            self.require_argument()?;
        }

        Ok(Instruction::Read { dst, values })
    }
}

/// Classify the first word of a line.
///
/// Returns `None` for a blank line, otherwise the command and the position right
/// after its name.
pub fn classify_line(line: &str) -> Option<Result<(CommandKind, usize), ParseFault>> {
    let mut cursor = Cursor::new(line);
    cursor.skip_whitespace();
    if cursor.is_end_of_command() {
        return None;
    }
    let classified = classify(&cursor).ok_or(ParseFault::UndefinedCommand).map(|kind| {
        cursor.skip_to_next_token();
        (kind, cursor.pos())
    });
    Some(classified)
}

/// Parse one input line.
///
/// Returns `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<Instruction>, ParseFault> {
    let Some(classified) = classify_line(line) else {
        return Ok(None);
    };
    let (kind, pos) = classified?;
    parse_arguments(kind, Cursor::at(line, pos)).map(Some)
}

/// Parse the arguments of an already classified command.
///
/// `cursor` must sit right after the command word.
pub fn parse_arguments(kind: CommandKind, cursor: Cursor<'_>) -> Result<Instruction, ParseFault> {
    tracing::trace!(command = kind.name(), pos = cursor.pos(), "parsing arguments");
    ArgumentParser::new(cursor).parse(kind)
}
