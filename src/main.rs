// pupforth main program
//
// Boots the interpreter, loads the core and any specified files, and runs the Forth interpreter loop.
// The boot process is separated from the run process: a bye during boot ends the session before
// the prompt, while errors during a run are reported and the interpreter returns to the prompt
// with the data stack cleared.

mod config;
mod error;
mod files;
mod internals;
mod kernel;
mod runtime;

use config::{Config, VERSION};
use crossterm::style::Stylize;
use error::Interrupt;
use files::LineSource;
use internals::tui::ForthLineEditor;
use runtime::ForthRuntime;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

const WELCOME_MESSAGE: &str = "Welcome to pupforth.";
const EXIT_MESSAGE: &str = "Goodbye.";

/// Whether the session goes on after a step
enum Session {
    Continue,
    Ended,
}

fn init_logging(config: &Config) {
    let _res = tracing_subscriber::fmt()
        .with_max_level(config.level_filter())
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn report(message: &str) {
    eprintln!("{}", message.red());
}

fn load_file(forth: &mut ForthRuntime, file_name: &str) -> Session {
    let mut source = match LineSource::open(Path::new(file_name)) {
        Ok(source) => source,
        Err(e) => {
            report(&format!("Unable to open {}: {}", file_name, e));
            return Session::Continue;
        }
    };
    info!(file = file_name, "loading");
    loop {
        let line = match source.get_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                report(&format!("{}: {} --- rest of file ignored", file_name, e));
                break;
            }
        };
        match forth.process_line(&line) {
            Ok(()) => {}
            Err(Interrupt::Bye) => return Session::Ended,
            Err(Interrupt::Error(e)) => {
                report(&format!("{}:{}: {} --- rest of file ignored", file_name, source.line_number, e));
                break;
            }
        }
    }
    let _ = forth.f_flush();
    Session::Continue
}

fn boot_forth(config: &Config) -> (ForthRuntime, Session) {
    let mut forth = ForthRuntime::new();

    if !config.no_core {
        match forth.load_core() {
            Ok(()) => {}
            Err(Interrupt::Bye) => return (forth, Session::Ended),
            Err(Interrupt::Error(e)) => {
                debug!(error = %e, "core library failed to load");
                report(&format!("core library: {}", e));
            }
        }
    }

    for file_name in &config.files {
        if let Session::Ended = load_file(&mut forth, file_name) {
            return (forth, Session::Ended);
        }
    }
    (forth, Session::Continue)
}

/// Run one line and report what went wrong, if anything
fn run_line(forth: &mut ForthRuntime, line: &str) -> Session {
    let result = forth.process_line(line);
    let _ = forth.f_flush();
    match result {
        Ok(()) => Session::Continue,
        Err(Interrupt::Bye) => Session::Ended,
        Err(Interrupt::Error(e)) => {
            report(&e.to_string());
            Session::Continue
        }
    }
}

fn run_forth(forth: &mut ForthRuntime) -> io::Result<()> {
    if io::stdin().is_terminal() {
        let mut editor = ForthLineEditor::new();
        while let Some(line) = editor.get_line()? {
            if let Session::Ended = run_line(forth, &line) {
                break;
            }
        }
    } else {
        let mut source = LineSource::stdin();
        while let Some(line) = source.get_line()? {
            if let Session::Ended = run_line(forth, &line) {
                break;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let config = Config::from_env();
    init_logging(&config);

    let (mut forth, session) = boot_forth(&config);
    if let Session::Continue = session {
        if !config.quiet {
            println!("{}", format!("{WELCOME_MESSAGE} Version {VERSION}").yellow());
        }
        if let Err(e) = run_forth(&mut forth) {
            report(&format!("input failed: {}", e));
            return ExitCode::FAILURE;
        }
    }
    if !config.quiet {
        println!("{}", EXIT_MESSAGE.blue());
    }
    ExitCode::SUCCESS
}
