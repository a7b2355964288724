mod ast;
mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod lexer;
mod macros;
mod modify;
mod parser;
mod quote;
mod repl;
mod session;
mod token;
mod value;

use clap::Parser;
use error::ScriptError;
use session::Session;
use std::path::{Path, PathBuf};
use std::process;

/// Tamarin: a small scripting language with closures and compile-time macros
#[derive(Parser, Debug)]
#[command(name = "tamarin")]
#[command(version = config::VERSION)]
#[command(about = "A small scripting language with closures and compile-time macros")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Skip loading the bundled helper library
    #[arg(long = "no-prelude")]
    no_prelude: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let level = match args.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    let mut session = Session::new();
    if !args.no_prelude {
        if let Err(error) = session.load_prelude() {
            log::error!("failed to load prelude: {}", error);
        }
    }

    if let Some(script_path) = args.script {
        run_script(&script_path, &mut session);
        return Ok(());
    }

    repl::start(&mut session)?;
    Ok(())
}

/// Script mode: evaluate the whole file once. Parse failures, unreadable
/// files and runtime errors all print and fail the process.
fn run_script(path: &Path, session: &mut Session) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            let error = ScriptError::Read {
                path: path.to_path_buf(),
                source,
            };
            eprintln!("{}", error);
            process::exit(1);
        }
    };
    match session.run(&source) {
        Ok(value) if value.is_error() => {
            eprintln!("{}", value);
            process::exit(1);
        }
        Ok(_) => {}
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}
