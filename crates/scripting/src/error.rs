//! Error types for the scripting crate

use gs1conv_core::ConvertError;
use std::fmt;

/// Script-specific error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// Parse error
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Unterminated string or comment
    #[error("Unterminated {what} starting at line {line}")]
    Unterminated { what: &'static str, line: usize },
}

impl ScriptError {
    /// Line the error was reported on
    pub fn line(&self) -> usize {
        match self {
            ScriptError::ParseError { line, .. } | ScriptError::Unterminated { line, .. } => *line,
        }
    }
}

impl From<ScriptError> for ConvertError {
    fn from(err: ScriptError) -> Self {
        ConvertError::Script(err.to_string())
    }
}

/// A non-fatal problem reported while parsing or expanding a script
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl From<ScriptError> for Diagnostic {
    fn from(err: ScriptError) -> Self {
        let line = err.line();
        let message = match err {
            ScriptError::ParseError { message, .. } => message,
            ScriptError::Unterminated { what, .. } => format!("unterminated {}", what),
        };
        Self { line, message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_from_error() {
        let diagnostic = Diagnostic::from(ScriptError::Unterminated { what: "string", line: 4 });
        assert_eq!(diagnostic.to_string(), "line 4: unterminated string");
    }

    #[test]
    fn test_into_convert_error() {
        let err = ConvertError::from(ScriptError::ParseError {
            line: 2,
            message: "expected ')'".into(),
        });
        assert!(matches!(err, ConvertError::Script(ref msg) if msg.contains("line 2")));
    }
}
