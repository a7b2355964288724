// ABOUTME: Error types for the driver seam around the interpreter core

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to whoever submits source text. Runtime errors are
/// not represented here: they travel in-band as `Value::Error` so that
/// evaluation can short-circuit through them.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The parser produced diagnostics; evaluation never started.
    #[error("parse error:\n\t{}", .0.join("\n\t"))]
    Parse(Vec<String>),

    /// A script file could not be read.
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_lists_each_diagnostic() {
        let error = ScriptError::Parse(vec![
            "expected next token to be =, got NUM instead".to_string(),
            "no prefix parse function for ; found".to_string(),
        ]);
        let rendered = error.to_string();
        assert!(rendered.starts_with("parse error:"));
        assert!(rendered.contains("\n\texpected next token to be =, got NUM instead"));
        assert!(rendered.contains("\n\tno prefix parse function for ; found"));
    }
}
