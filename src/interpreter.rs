use crate::command::CommandKind;
use crate::error::{Fault, FatalFault, report};
use crate::input::LineSource;
use crate::matrix::Matrix;
use crate::parser::{BinaryOp, Instruction, classify_line, parse_arguments, parse_line};
use crate::registers::Registers;
use crate::scanner::Cursor;
use std::io::Write;

/// Status the session ends with, handed to `std::process::exit` by the binary.
pub type ExitCode = i32;

pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;

const GREETING: &str = "Hello,";
const PROMPT: &str = "Please enter a command.";
const EMPTY_LINE: &str = "The line is empty.";
const FAREWELL: &str = "Thank you for using the program. Have a great day!";

/// Session options, usually filled in from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repeat every non-blank line back as `The input is: ...` before running it.
    pub echo_input: bool,
    /// Print the greeting once at startup.
    pub banner: bool,
    /// Prompt handed to line sources that draw one (the line editor).
    pub editor_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            echo_input: true,
            banner: true,
            editor_prompt: "> ".to_string(),
        }
    }
}

/// What the caller should do after an instruction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug)]
enum ReplState {
    AwaitingLine,
    Classifying(String),
    Dispatching {
        kind: CommandKind,
        line: String,
        pos: usize,
    },
    Reporting(Fault),
    Terminated(ExitCode),
}

/// The matrix command interpreter: six registers plus the loop that feeds them.
///
/// Example
/// ```
/// use mainmat::{Flow, Interpreter};
/// let mut calc = Interpreter::default();
/// let mut out: Vec<u8> = Vec::new();
/// calc.execute_line("read_mat MAT_A, 1, 2", &mut out).unwrap();
/// assert_eq!(calc.execute_line("stop", &mut out).unwrap(), Flow::Stop);
/// ```
#[derive(Debug, Default)]
pub struct Interpreter {
    registers: Registers,
    config: Config,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Self {
            registers: Registers::new(),
            config,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Run a validated instruction against the registers.
    ///
    /// Every result is computed into a fresh matrix before the destination is
    /// replaced, so operands may alias the destination.
    pub fn execute(
        &mut self,
        instruction: &Instruction,
        stdout: &mut dyn Write,
    ) -> std::io::Result<Flow> {
        tracing::debug!(?instruction, "executing");
        match instruction {
            Instruction::Read { dst, values } => {
                self.registers.set(*dst, Matrix::load(values));
            }
            Instruction::Print(id) => {
                write!(stdout, "{}", self.registers.get(*id))?;
            }
            Instruction::Binary { op, lhs, rhs, dst } => {
                let a = self.registers.get(*lhs);
                let b = self.registers.get(*rhs);
                let result = match op {
                    BinaryOp::Add => a.add(b),
                    BinaryOp::Sub => a.sub(b),
                    BinaryOp::Mul => a.mul(b),
                };
                self.registers.set(*dst, result);
            }
            Instruction::Scale { src, scalar, dst } => {
                let result = self.registers.get(*src).scale(*scalar);
                self.registers.set(*dst, result);
            }
            Instruction::Transpose { src, dst } => {
                let result = self.registers.get(*src).transpose();
                self.registers.set(*dst, result);
            }
            Instruction::Stop => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    /// Parse and run one line. Blank lines do nothing.
    ///
    /// This goes through the same classification as [`Interpreter::run`] but writes
    /// no prompt, echo or empty-line notice.
    pub fn execute_line(&mut self, line: &str, stdout: &mut dyn Write) -> Result<Flow, Fault> {
        match parse_line(line)? {
            Some(instruction) => Ok(self.execute(&instruction, stdout)?),
            None => Ok(Flow::Continue),
        }
    }

    /// Read-eval-print loop.
    ///
    /// Runs until a `stop` command (exit code 0) or a fatal fault such as the input
    /// ending early (exit code 1). Malformed lines are reported on `stderr` and the
    /// loop carries on.
    pub fn run(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ExitCode {
        let mut state = if self.config.banner {
            match writeln!(stdout, "{}", GREETING) {
                Ok(()) => ReplState::AwaitingLine,
                Err(err) => ReplState::Reporting(err.into()),
            }
        } else {
            ReplState::AwaitingLine
        };

        loop {
            state = match state {
                ReplState::Terminated(code) => {
                    tracing::debug!(code, "session terminated");
                    let _ = stdout.flush();
                    return code;
                }
                ReplState::Reporting(fault) => self.report_fault(fault, stderr),
                other => self.step(other, source, stdout).unwrap_or_else(ReplState::Reporting),
            };
        }
    }

    fn step(
        &mut self,
        state: ReplState,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
    ) -> Result<ReplState, Fault> {
        match state {
            ReplState::AwaitingLine => {
                writeln!(stdout, "{}", PROMPT)?;
                stdout.flush()?;
                match source.read_line(&self.config.editor_prompt)? {
                    Some(line) => Ok(ReplState::Classifying(line)),
                    None => Err(FatalFault::PrematureEndOfStream.into()),
                }
            }
            ReplState::Classifying(line) => {
                let Some(classified) = classify_line(&line) else {
                    writeln!(stdout, "{}", EMPTY_LINE)?;
                    return Ok(ReplState::AwaitingLine);
                };
                if self.config.echo_input {
                    writeln!(stdout, "The input is: {}", line)?;
                }
                let (kind, pos) = classified?;
                tracing::debug!(command = kind.name(), "classified");
                Ok(ReplState::Dispatching { kind, line, pos })
            }
            ReplState::Dispatching { kind, line, pos } => {
                let instruction = parse_arguments(kind, Cursor::at(&line, pos))?;
                match self.execute(&instruction, stdout)? {
                    Flow::Stop => {
                        writeln!(stdout, "{}", FAREWELL)?;
                        Ok(ReplState::Terminated(EXIT_SUCCESS))
                    }
                    Flow::Continue => Ok(ReplState::AwaitingLine),
                }
            }
            ReplState::Reporting(fault) => Ok(ReplState::Reporting(fault)),
            ReplState::Terminated(code) => Ok(ReplState::Terminated(code)),
        }
    }

    fn report_fault(&self, fault: Fault, stderr: &mut dyn Write) -> ReplState {
        tracing::warn!(fatal = fault.is_fatal(), "{}", fault);
        // Nothing sensible is left to do if the error stream itself is gone.
        let _ = report(stderr, &fault);
        if fault.is_fatal() {
            ReplState::Terminated(EXIT_FAILURE)
        } else {
            ReplState::AwaitingLine
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseFault;
    use crate::input::StreamLines;
    use crate::registers::RegisterId;
    use proptest::prelude::*;
    use std::io::Cursor as IoCursor;

    struct Session {
        code: ExitCode,
        out: String,
        err: String,
        interpreter: Interpreter,
    }

    fn run_script(script: &str) -> Session {
        let mut interpreter = Interpreter::default();
        let mut source = StreamLines::new(IoCursor::new(script.as_bytes().to_vec()));
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let code = interpreter.run(&mut source, &mut out, &mut err);
        Session {
            code,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
            interpreter,
        }
    }

    fn run_lines(interpreter: &mut Interpreter, lines: &[&str]) -> String {
        let mut out = Vec::<u8>::new();
        for line in lines {
            interpreter.execute_line(line, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    fn values_line(register: &str, values: &[f64]) -> String {
        let joined: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
        format!("read_mat {}, {}", register, joined.join(", "))
    }

    #[test]
    fn test_read_then_print_renders_rows() {
        let session = run_script(
            "read_mat MAT_A, 1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16\nprint_mat MAT_A\nstop\n",
        );
        assert_eq!(session.code, EXIT_SUCCESS);
        let expected = "   1.00\t   2.00\t   3.00\t   4.00\n\
                        \x20  5.00\t   6.00\t   7.00\t   8.00\n\
                        \x20  9.00\t  10.00\t  11.00\t  12.00\n\
                        \x20 13.00\t  14.00\t  15.00\t  16.00\n";
        assert!(session.out.contains(expected), "output was:\n{}", session.out);
        assert!(session.err.is_empty());
    }

    #[test]
    fn test_add_of_fresh_registers_is_zero() {
        let session = run_script("add_mat MAT_A, MAT_B, MAT_C\nstop\n");
        assert_eq!(session.code, EXIT_SUCCESS);
        assert_eq!(*session.interpreter.registers().get(RegisterId::C), Matrix::zero());
    }

    #[test]
    fn test_undefined_register_keeps_going() {
        let session = run_script("print_mat MAT_Z\nstop\n");
        assert_eq!(session.code, EXIT_SUCCESS);
        assert_eq!(session.err, "[Error] Undefined matrix name\n");
        assert_eq!(session.out.matches(PROMPT).count(), 2);
        assert!(session.out.contains(FAREWELL));
    }

    #[test]
    fn test_stop_with_extra_text_does_not_stop() {
        let session = run_script("stop extra\n");
        assert_eq!(session.code, EXIT_FAILURE);
        assert!(session.err.starts_with("[Error] Extraneous text after end of command\n"));
        assert!(session.err.contains("[Error] Premature end of file"));
        assert!(!session.out.contains(FAREWELL));
    }

    #[test]
    fn test_stop_prints_farewell() {
        let session = run_script("stop\n");
        assert_eq!(session.code, EXIT_SUCCESS);
        assert!(session.out.starts_with("Hello,\nPlease enter a command.\n"));
        assert!(session.out.ends_with(&format!("{}\n", FAREWELL)));
        assert!(session.err.is_empty());
    }

    #[test]
    fn test_end_of_stream_without_stop_fails() {
        let session = run_script("print_mat MAT_A\n");
        assert_eq!(session.code, EXIT_FAILURE);
        assert_eq!(
            session.err,
            "[Error] Premature end of file encountered, missing stop command\n"
        );
    }

    /// Hands out its lines, then fails the way a buffer that cannot grow does.
    struct ExhaustedBuffer {
        lines: Vec<&'static str>,
    }

    impl LineSource for ExhaustedBuffer {
        fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, FatalFault> {
            if self.lines.is_empty() {
                return Err(FatalFault::AllocationFailure);
            }
            Ok(Some(self.lines.remove(0).to_string()))
        }
    }

    #[test]
    fn test_allocation_failure_ends_session() {
        let mut interpreter = Interpreter::default();
        let mut source = ExhaustedBuffer {
            lines: vec!["read_mat MAT_A, 5"],
        };
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let code = interpreter.run(&mut source, &mut out, &mut err);

        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(String::from_utf8(err).unwrap(), "[Error] Memory allocation failed\n");
        assert!(!String::from_utf8(out).unwrap().contains(FAREWELL));
        assert_eq!(interpreter.registers().get(RegisterId::A).get(0, 0), 5.0);
    }

    #[test]
    fn test_unterminated_stop_is_premature_end() {
        let session = run_script("stop");
        assert_eq!(session.code, EXIT_FAILURE);
        assert!(!session.out.contains(FAREWELL));
    }

    #[test]
    fn test_lines_after_stop_are_never_read() {
        let session = run_script("stop\nprint_mat MAT_Q\n");
        assert_eq!(session.code, EXIT_SUCCESS);
        assert!(session.err.is_empty());
    }

    #[test]
    fn test_blank_line_notice_and_echo() {
        let session = run_script("   \nundefined_cmd x\nstop\n");
        assert!(session.out.contains("The line is empty.\n"));
        assert!(session.out.contains("The input is: undefined_cmd x\n"));
        assert_eq!(session.err, "[Error] Undefined command name\n");
        assert_eq!(session.code, EXIT_SUCCESS);
    }

    #[test]
    fn test_quiet_config_skips_banner_and_echo() {
        let mut interpreter = Interpreter::new(Config {
            echo_input: false,
            banner: false,
            ..Config::default()
        });
        let mut source = StreamLines::new(IoCursor::new(b"stop\n".to_vec()));
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let code = interpreter.run(&mut source, &mut out, &mut err);
        assert_eq!(code, EXIT_SUCCESS);
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, format!("{}\n{}\n", PROMPT, FAREWELL));
    }

    #[test]
    fn test_failed_command_leaves_destination_untouched() {
        let mut calc = Interpreter::default();
        run_lines(&mut calc, &["read_mat MAT_B, 9, 9, 9"]);
        let before = *calc.registers().get(RegisterId::B);

        let mut out = Vec::<u8>::new();
        for line in [
            "read_mat MAT_B, 1, 2, x",
            "read_mat MAT_B, 1 2",
            "add_mat MAT_A, MAT_A, MAT_B extra",
            "mul_scalar MAT_A, 2, MAT_B,",
            "trans_mat MAT_A, MAT_B MAT_C",
        ] {
            assert!(matches!(
                calc.execute_line(line, &mut out),
                Err(Fault::Recoverable(_))
            ));
        }
        assert_eq!(*calc.registers().get(RegisterId::B), before);
    }

    #[test]
    fn test_self_aliased_multiply_squares() {
        let mut calc = Interpreter::default();
        run_lines(
            &mut calc,
            &["read_mat MAT_A, 1, 2, 0, 0, 3, 4", "mul_mat MAT_A, MAT_A, MAT_A"],
        );
        let a = calc.registers().get(RegisterId::A);
        assert_eq!(a.get(0, 0), 7.0);
        assert_eq!(a.get(0, 1), 10.0);
        assert_eq!(a.get(1, 0), 15.0);
        assert_eq!(a.get(1, 1), 22.0);
    }

    #[test]
    fn test_self_aliased_transpose() {
        let mut calc = Interpreter::default();
        run_lines(
            &mut calc,
            &["read_mat MAT_D, 1, 2, 3, 4, 5", "trans_mat MAT_D, MAT_D"],
        );
        let d = calc.registers().get(RegisterId::D);
        assert_eq!(d.get(0, 1), 5.0);
        assert_eq!(d.get(1, 0), 2.0);
        assert_eq!(d.get(3, 0), 4.0);
    }

    #[test]
    fn test_scientific_print_switch() {
        let mut calc = Interpreter::default();
        let fixed = run_lines(&mut calc, &["read_mat MAT_A, 1000", "print_mat MAT_A"]);
        assert!(fixed.starts_with("1000.00\t"));

        let sci = run_lines(&mut calc, &["read_mat MAT_A, 1000.01, 1", "print_mat MAT_A"]);
        assert!(sci.starts_with("  1.00e+03\t  1.00e+00\t"), "{}", sci);
    }

    #[test]
    fn test_register_followed_by_letter_is_positional() {
        let mut calc = Interpreter::default();
        let mut out = Vec::<u8>::new();
        assert!(matches!(
            calc.execute_line("print_mat MAT_AB", &mut out),
            Err(Fault::Recoverable(ParseFault::ExtraneousText))
        ));
    }

    proptest! {
        #[test]
        fn prop_read_then_print_is_independent_of_history(
            first in prop::collection::vec(-999.0..999.0f64, 1..=16),
            second in prop::collection::vec(-999.0..999.0f64, 1..=16),
        ) {
            let mut calc = Interpreter::default();
            let printed = run_lines(
                &mut calc,
                &[values_line("MAT_E", &first).as_str(), values_line("MAT_E", &second).as_str(), "print_mat MAT_E"],
            );
            prop_assert_eq!(printed, Matrix::load(&second).to_string());
        }

        #[test]
        fn prop_add_then_sub_restores_lhs(
            a in prop::collection::vec(-1000i32..1000, 16),
            b in prop::collection::vec(-1000i32..1000, 16),
        ) {
            let a: Vec<f64> = a.into_iter().map(f64::from).collect();
            let b: Vec<f64> = b.into_iter().map(f64::from).collect();
            let mut calc = Interpreter::default();
            run_lines(
                &mut calc,
                &[
                    values_line("MAT_A", &a).as_str(),
                    values_line("MAT_B", &b).as_str(),
                    "add_mat MAT_A, MAT_B, MAT_C",
                    "sub_mat MAT_C, MAT_B, MAT_C",
                ],
            );
            prop_assert_eq!(calc.registers().get(RegisterId::C), calc.registers().get(RegisterId::A));
        }

        #[test]
        fn prop_scale_by_one_copies(values in prop::collection::vec(-1.0e9..1.0e9f64, 16)) {
            let mut calc = Interpreter::default();
            run_lines(&mut calc, &[values_line("MAT_A", &values).as_str(), "mul_scalar MAT_A, 1.0, MAT_B"]);
            prop_assert_eq!(calc.registers().get(RegisterId::B), calc.registers().get(RegisterId::A));
        }
    }
}
