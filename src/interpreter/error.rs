use crate::diagnostic::{Diagnostic, Position};
use crate::token::TokenKind;

/// How far a fault propagates: recoverable faults set the error flag and
/// let scanning continue; serious faults unwind the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Recoverable,
    Serious,
}

/// Every fault the interpreter can raise, each with the source position it
/// is reported at. One fault produces exactly one diagnostic line.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    // Top-level scanning.
    UnexpectedCharacter { text: String, at: Position },
    UnexpectedToken { kind: TokenKind, text: String, at: Position },
    UndefinedName { name: String, at: Position },
    UnexpectedEnd { at: Position },

    // Argument collection.
    NotEnoughArguments { context: String, at: Position },
    MissingControlArgument { context: String, expected: &'static str, at: Position },

    // Block extraction.
    BlockNotFound { context: String, at: Position },
    UnclosedBlock { context: String, at: Position },
    NestedProcedure { keyword: String, at: Position },

    // Control-construct argument validation.
    InvalidRepeatCount { at: Position },
    NonBooleanCondition { context: String, at: Position },

    // Expression evaluation.
    UndefinedVariable { name: String, at: Position },
    ExpressionSyntax { at: Position },
    InvalidExpression { at: Position },
    DivisionByZero { at: Position },

    // Procedure definition.
    NestedDefinition { at: Position },
    UnterminatedDefinition { at: Position },
    DefinitionNotAtLineStart { at: Position },
    InvalidProcedureName { name: String, at: Position },
    DuplicateParameter { name: String, at: Position },
    DefinitionSyntax { kind: TokenKind, text: String, at: Position },
    EndNotAtLineStart { at: Position },
    OverwritePrimitive { name: String, at: Position },

    // Runtime.
    PrimitiveFailed { context: String, message: String, at: Position },
    RecursionLimit { at: Position },
}

impl Fault {
    pub fn severity(&self) -> Severity {
        match self {
            Fault::UnexpectedCharacter { .. }
            | Fault::UnexpectedToken { .. }
            | Fault::UndefinedName { .. }
            | Fault::NotEnoughArguments { .. }
            | Fault::InvalidRepeatCount { .. }
            | Fault::NonBooleanCondition { .. }
            // A failed redefinition skips the definition but leaves the
            // built-in intact and scanning alive.
            | Fault::OverwritePrimitive { .. }
            | Fault::PrimitiveFailed { .. } => Severity::Recoverable,

            Fault::UnexpectedEnd { .. }
            | Fault::MissingControlArgument { .. }
            | Fault::BlockNotFound { .. }
            | Fault::UnclosedBlock { .. }
            | Fault::NestedProcedure { .. }
            | Fault::UndefinedVariable { .. }
            | Fault::ExpressionSyntax { .. }
            | Fault::InvalidExpression { .. }
            | Fault::DivisionByZero { .. }
            | Fault::NestedDefinition { .. }
            | Fault::UnterminatedDefinition { .. }
            | Fault::DefinitionNotAtLineStart { .. }
            | Fault::InvalidProcedureName { .. }
            | Fault::DuplicateParameter { .. }
            | Fault::DefinitionSyntax { .. }
            | Fault::EndNotAtLineStart { .. }
            | Fault::RecursionLimit { .. } => Severity::Serious,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Fault::UnexpectedCharacter { at, .. }
            | Fault::UnexpectedToken { at, .. }
            | Fault::UndefinedName { at, .. }
            | Fault::UnexpectedEnd { at }
            | Fault::NotEnoughArguments { at, .. }
            | Fault::MissingControlArgument { at, .. }
            | Fault::BlockNotFound { at, .. }
            | Fault::UnclosedBlock { at, .. }
            | Fault::NestedProcedure { at, .. }
            | Fault::InvalidRepeatCount { at }
            | Fault::NonBooleanCondition { at, .. }
            | Fault::UndefinedVariable { at, .. }
            | Fault::ExpressionSyntax { at }
            | Fault::InvalidExpression { at }
            | Fault::DivisionByZero { at }
            | Fault::NestedDefinition { at }
            | Fault::UnterminatedDefinition { at }
            | Fault::DefinitionNotAtLineStart { at }
            | Fault::InvalidProcedureName { at, .. }
            | Fault::DuplicateParameter { at, .. }
            | Fault::DefinitionSyntax { at, .. }
            | Fault::EndNotAtLineStart { at }
            | Fault::OverwritePrimitive { at, .. }
            | Fault::PrimitiveFailed { at, .. }
            | Fault::RecursionLimit { at } => *at,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let at = self.position();
        match self {
            Fault::UnexpectedCharacter { text, .. } => {
                Diagnostic::new(format!("Unexpected character '{}'", text), at)
            }
            Fault::UnexpectedToken { kind, text, .. } => {
                Diagnostic::new(format!("Unexpected {} '{}'", kind, text), at)
            }
            Fault::UndefinedName { name, .. } => Diagnostic::new(
                format!("Undefined procedure or primitive '{}'", name),
                at,
            ),
            Fault::UnexpectedEnd { .. } => {
                Diagnostic::new("Unexpected 'END' outside a procedure definition", at)
            }
            Fault::NotEnoughArguments { context, .. } => {
                Diagnostic::with_context(context, "need more arguments", at)
            }
            Fault::MissingControlArgument { context, expected, .. } => Diagnostic::new(
                format!("No '{}' {} specified", context.to_uppercase(), expected),
                at,
            ),
            Fault::BlockNotFound { context, .. } => Diagnostic::new(
                format!("'{}' expects a statement", context.to_uppercase()),
                at,
            ),
            Fault::UnclosedBlock { context, .. } => Diagnostic::new(
                format!("Unclosed '[' of '{}' statement", context.to_uppercase()),
                at,
            ),
            Fault::NestedProcedure { keyword, .. } => Diagnostic::new(
                format!("'{}' cannot be defined within a statement", keyword),
                at,
            ),
            Fault::InvalidRepeatCount { .. } => {
                Diagnostic::new("'REPEAT' expects a positive integer repeat count", at)
            }
            Fault::NonBooleanCondition { context, .. } => Diagnostic::new(
                format!("'{}' expects a bool expression", context.to_uppercase()),
                at,
            ),
            Fault::UndefinedVariable { name, .. } => {
                Diagnostic::new(format!("Undefined variable '{}'", name), at)
            }
            Fault::ExpressionSyntax { .. } => Diagnostic::new("Expression syntax error", at),
            Fault::InvalidExpression { .. } => Diagnostic::new("Invalid expression", at),
            Fault::DivisionByZero { .. } => {
                Diagnostic::new("Division by zero in expression", at)
            }
            Fault::NestedDefinition { .. } => {
                Diagnostic::new("Syntax error: nested 'TO' statement", at)
            }
            Fault::UnterminatedDefinition { .. } => {
                Diagnostic::new("Syntax error: incomplete 'TO' statement", at)
            }
            Fault::DefinitionNotAtLineStart { .. } => Diagnostic::new(
                "Syntax error: 'TO' statement should start from a new line",
                at,
            ),
            Fault::InvalidProcedureName { name, .. } => Diagnostic::new(
                format!("Syntax error: invalid procedure name '{}'", name),
                at,
            ),
            Fault::DuplicateParameter { name, .. } => Diagnostic::new(
                format!("Syntax error: duplicated parameter ':{}' in 'TO' statement", name),
                at,
            ),
            Fault::DefinitionSyntax { kind, text, .. } => {
                Diagnostic::new(format!("Syntax error: unexpected {} '{}'", kind, text), at)
            }
            Fault::EndNotAtLineStart { .. } => {
                Diagnostic::new("Syntax error: 'END' should start from a new line", at)
            }
            Fault::OverwritePrimitive { name, .. } => {
                Diagnostic::new(format!("Cannot overwrite primitive '{}'", name), at)
            }
            Fault::PrimitiveFailed { context, message, .. } => {
                Diagnostic::with_context(context, message.clone(), at)
            }
            Fault::RecursionLimit { .. } => {
                Diagnostic::new("Maximum recursion depth exceeded", at)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severities() {
        let at = Position::new(1, 1);
        assert_eq!(
            Fault::UndefinedName { name: "zz".into(), at }.severity(),
            Severity::Recoverable
        );
        assert_eq!(
            Fault::UnclosedBlock { context: "REPEAT".into(), at }.severity(),
            Severity::Serious
        );
        assert_eq!(
            Fault::DivisionByZero { at }.severity(),
            Severity::Serious
        );
        assert_eq!(
            Fault::PrimitiveFailed { context: "FD".into(), message: "invalid number".into(), at }
                .severity(),
            Severity::Recoverable
        );
    }

    #[test]
    fn test_command_fault_uses_context_prefix() {
        let fault = Fault::NotEnoughArguments {
            context: "fd".into(),
            at: Position::new(4, 2),
        };
        assert_eq!(
            fault.to_diagnostic().to_string(),
            "FD: need more arguments @ line 4, column 2"
        );
    }

    #[test]
    fn test_control_fault_message() {
        let fault = Fault::MissingControlArgument {
            context: "repeat".into(),
            expected: "times",
            at: Position::new(1, 1),
        };
        assert_eq!(
            fault.to_diagnostic().to_string(),
            "No 'REPEAT' times specified @ line 1, column 1"
        );
    }
}
