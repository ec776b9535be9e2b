use argh::FromArgs;
use mainmat::{Config, EditorLines, Interpreter, LineSource, StreamLines};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Interactive calculator for six named 4x4 matrices (MAT_A .. MAT_F).
struct Args {
    #[argh(switch)]
    /// read standard input as a plain stream even when it is a terminal.
    plain: bool,

    #[argh(switch, short = 'q')]
    /// do not echo each accepted line back.
    quiet: bool,

    #[argh(switch)]
    /// do not print the greeting at startup.
    no_banner: bool,

    #[argh(switch, short = 'v')]
    /// log debug diagnostics to standard error.
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    init_tracing(args.verbose);

    let stdin = std::io::stdin();
    let use_editor = !args.plain && stdin.is_terminal();
    let mut source: Box<dyn LineSource> = if use_editor {
        Box::new(EditorLines::new()?)
    } else {
        Box::new(StreamLines::new(stdin.lock()))
    };

    let config = Config {
        // The line editor already shows what was typed.
        echo_input: !args.quiet && !use_editor,
        banner: !args.no_banner,
        ..Config::default()
    };
    tracing::debug!(?config, use_editor, "starting session");

    let mut interpreter = Interpreter::new(config);
    let code = interpreter.run(
        source.as_mut(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    std::process::exit(code)
}
