// ABOUTME: Interactive read-eval-print loop over a persistent session

use crate::config;
use crate::session::Session;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

/// Runs the interactive loop until Ctrl-D. Bindings and macros live in
/// the session, so they persist from line to line.
pub fn start(session: &mut Session) -> rustyline::Result<()> {
    let config = Config::builder().auto_add_history(true).build();
    let mut editor = DefaultEditor::with_config(config)?;

    // History from previous sessions is nice to have, not required.
    let _ = editor.load_history(config::HISTORY_FILE);

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    loop {
        match editor.readline(config::PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match session.run(&line) {
                    Ok(value) => println!("=> {}", value),
                    Err(error) => eprintln!("{}", error),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(error) => {
                eprintln!("Error: {}", error);
                break;
            }
        }
    }

    let _ = editor.save_history(config::HISTORY_FILE);
    Ok(())
}
