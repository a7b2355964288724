// ABOUTME: Constants for the CLI and REPL: version, prompt, banner

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "Tamarin v1.0";
pub const WELCOME_SUBTITLE: &str = "A small scripting language with closures and macros";
pub const PROMPT: &str = ">> ";
pub const HISTORY_FILE: &str = ".tamarin_history";
