use std::fmt;

use owo_colors::OwoColorize;

/// A 1-based source position. Every character advances the column by one;
/// CR, LF and CRLF each advance the line and reset the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// One reported fault: an optional upper-cased context (the offending
/// command or keyword), a message, and the source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub context: Option<String>,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            context: None,
            message: message.into(),
            position,
        }
    }

    pub fn with_context(
        context: impl Into<String>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            context: Some(context.into().to_uppercase()),
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}: {} @ {}", context, self.message, self.position),
            None => write!(f, "{} @ {}", self.message, self.position),
        }
    }
}

/// Render diagnostics to stderr, one line per fault, in recorded order.
pub fn render_diagnostics(diagnostics: &[Diagnostic], use_color: bool) {
    for diagnostic in diagnostics {
        if use_color {
            eprintln!("{}", diagnostic.to_string().red());
        } else {
            eprintln!("{}", diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 7).to_string(), "line 3, column 7");
    }

    #[test]
    fn test_plain_diagnostic() {
        let d = Diagnostic::new("Undefined variable 'x'", Position::new(1, 4));
        assert_eq!(d.to_string(), "Undefined variable 'x' @ line 1, column 4");
    }

    #[test]
    fn test_context_is_uppercased() {
        let d = Diagnostic::with_context("fd", "need more arguments", Position::new(2, 1));
        assert_eq!(d.to_string(), "FD: need more arguments @ line 2, column 1");
    }
}
