//! The control-flow interpreter: scans a token view, dispatches keywords,
//! commands and procedures, and threads the run state (error flag,
//! diagnostics, recursion depth) through every call.

use std::rc::Rc;

use crate::diagnostic::{Diagnostic, Position};
use crate::token::{BlockError, Token, TokenKind, TokenStream};
use crate::value::{is_valid_name, Value};

use super::callables::{
    Callable, Command, CommandError, CommandKind, Procedure, Registry, RegistryError,
};
use super::control_flow::Flow;
use super::environment::{Scope, ScopeChain};
use super::error::{Fault, Severity};
use super::expression;

pub const DEFAULT_MAX_DEPTH: usize = 128;

const KEYWORDS: &[&str] = &["if", "ifelse", "repeat", "to", "end"];

fn is_keyword(text: &str) -> bool {
    KEYWORDS.iter().any(|k| text.eq_ignore_ascii_case(k))
}

/// Why argument collection failed. Expression faults have already been
/// reported by the time this surfaces.
enum ArgsError {
    NotEnough,
    Expression,
}

/// What one `go()` produced: the had-error flag and every diagnostic in
/// the order it was raised.
#[derive(Debug)]
pub struct RunOutcome {
    pub had_error: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// A single-use interpreter over one lexed program. Commands are
/// registered before `go()`, which consumes the interpreter.
pub struct Interpreter {
    program: TokenStream,
    registry: Registry,
    chain: ScopeChain,
    diagnostics: Vec<Diagnostic>,
    error: bool,
    depth: usize,
    max_depth: usize,
}

impl Interpreter {
    pub fn new(program: TokenStream) -> Self {
        Self {
            program,
            registry: Registry::new(),
            chain: ScopeChain::new(),
            diagnostics: Vec::new(),
            error: false,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Register a host command. Must happen before `go()`; duplicate names
    /// are rejected.
    pub fn register(
        &mut self,
        name: &str,
        arity: usize,
        handler: impl Fn(&[Value]) -> Result<(), CommandError> + 'static,
    ) -> Result<(), RegistryError> {
        self.registry
            .register_command(name, arity, CommandKind::Host(Rc::new(handler)))
    }

    /// Interpret the whole program.
    pub fn go(mut self) -> RunOutcome {
        self.error = false;
        let program = self.program.clone();
        // A top-level `stop` is swallowed; a serious unwind has already
        // recorded its fault.
        match self.run(&program) {
            Flow::Completed | Flow::Stopped | Flow::Unwound => {}
        }
        RunOutcome {
            had_error: self.error,
            diagnostics: self.diagnostics,
        }
    }

    /// Record a recoverable fault; scanning continues.
    fn recover(&mut self, fault: Fault) {
        debug_assert_eq!(fault.severity(), Severity::Recoverable);
        self.report(&fault);
    }

    /// Record a serious fault and unwind.
    fn abort(&mut self, fault: Fault) -> Flow {
        debug_assert_eq!(fault.severity(), Severity::Serious);
        self.report(&fault);
        Flow::Unwound
    }

    fn report(&mut self, fault: &Fault) {
        self.error = true;
        self.diagnostics.push(fault.to_diagnostic());
    }

    /// Run one token view, guarding the recursion depth.
    fn run(&mut self, tokens: &TokenStream) -> Flow {
        if self.depth >= self.max_depth {
            let at = tokens
                .get(tokens.start_index())
                .map(Token::position)
                .unwrap_or_default();
            return self.abort(Fault::RecursionLimit { at });
        }
        self.depth += 1;
        let flow = self.scan(tokens);
        self.depth -= 1;
        flow
    }

    fn scan(&mut self, tokens: &TokenStream) -> Flow {
        let mut cursor = tokens.start_index();
        while let Some(token) = tokens.get(cursor) {
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {}
                TokenKind::Identifier => match self.statement(tokens, &mut cursor) {
                    Flow::Completed => {}
                    flow => return flow,
                },
                TokenKind::Unknown => {
                    let fault = Fault::UnexpectedCharacter {
                        text: token.text.clone(),
                        at: token.position(),
                    };
                    self.recover(fault);
                }
                _ => {
                    let fault = Fault::UnexpectedToken {
                        kind: token.kind,
                        text: token.text.clone(),
                        at: token.position(),
                    };
                    self.recover(fault);
                }
            }
            cursor += 1;
        }
        Flow::Completed
    }

    /// Dispatch one Identifier statement. On return the cursor rests on
    /// the last consumed token.
    fn statement(&mut self, tokens: &TokenStream, cursor: &mut usize) -> Flow {
        let Some(token) = tokens.get(*cursor).cloned() else {
            return Flow::Completed;
        };
        if token.is_word("repeat") {
            self.run_repeat(tokens, cursor, &token)
        } else if token.is_word("if") {
            self.run_conditional(tokens, cursor, &token, false)
        } else if token.is_word("ifelse") {
            self.run_conditional(tokens, cursor, &token, true)
        } else if token.is_word("to") {
            self.define_procedure(tokens, cursor, &token)
        } else if token.is_word("end") {
            self.abort(Fault::UnexpectedEnd {
                at: token.position(),
            })
        } else {
            match self.registry.lookup(&token.text).cloned() {
                Some(Callable::Command(command)) => {
                    self.run_command(tokens, cursor, &token, command)
                }
                Some(Callable::Procedure(procedure)) => {
                    self.run_procedure(tokens, cursor, &token, procedure)
                }
                None => {
                    self.recover(Fault::UndefinedName {
                        name: token.text.clone(),
                        at: token.position(),
                    });
                    Flow::Completed
                }
            }
        }
    }

    /// Collect exactly `count` argument expressions after the cursor,
    /// evaluating each maximal run as it is captured. All runs are scanned
    /// even after one fails, so every fault in the statement is reported.
    fn extract_arguments(
        &mut self,
        tokens: &TokenStream,
        cursor: &mut usize,
        count: usize,
    ) -> Result<Vec<Value>, ArgsError> {
        let mut values = Vec::with_capacity(count);
        let mut failed = false;
        for i in 0..count {
            *cursor += 1;
            let start = *cursor;
            match tokens.get(start) {
                Some(t) if is_expression_token(t) => {}
                _ => return Err(ArgsError::NotEnough),
            }

            let run_end;
            loop {
                let Some(token) = tokens.get(*cursor).filter(|t| t.kind != TokenKind::Eof)
                else {
                    run_end = *cursor;
                    break;
                };
                match token.kind {
                    TokenKind::Integer
                    | TokenKind::Float
                    | TokenKind::Variable
                    | TokenKind::QuotedString => match tokens.get(*cursor + 1) {
                        Some(next) if next.kind == TokenKind::Operator && next.text != "(" => {
                            *cursor += 1;
                        }
                        _ => {
                            run_end = *cursor + 1;
                            break;
                        }
                    },
                    TokenKind::Operator if token.text == ")" => match tokens.get(*cursor + 1) {
                        Some(next) if starts_new_expression(next) => {
                            run_end = *cursor + 1;
                            break;
                        }
                        None => {
                            run_end = *cursor + 1;
                            break;
                        }
                        _ => *cursor += 1,
                    },
                    TokenKind::Operator => *cursor += 1,
                    _ => {
                        // A token that cannot continue the expression; the
                        // cursor stays on it.
                        run_end = *cursor;
                        break;
                    }
                }
            }

            let run = tokens.run(start, run_end);
            match expression::evaluate(run, &self.chain, &format!("arg{}", i)) {
                Ok(value) => values.push(value),
                Err(faults) => {
                    for fault in &faults {
                        self.report(fault);
                    }
                    failed = true;
                }
            }
        }
        if failed {
            Err(ArgsError::Expression)
        } else {
            Ok(values)
        }
    }

    fn run_repeat(&mut self, tokens: &TokenStream, cursor: &mut usize, keyword: &Token) -> Flow {
        let args = match self.extract_arguments(tokens, cursor, 1) {
            Ok(args) => args,
            Err(ArgsError::NotEnough) => {
                return self.abort(Fault::MissingControlArgument {
                    context: "repeat".into(),
                    expected: "times",
                    at: keyword.position(),
                });
            }
            Err(ArgsError::Expression) => return Flow::Unwound,
        };
        let (block, close) = match tokens.extract_block(*cursor) {
            Ok(ok) => ok,
            Err(error) => return self.abort(block_fault(error, "repeat", keyword.position())),
        };
        *cursor = close;

        let Some(count) = repeat_count(&args[0]) else {
            self.recover(Fault::InvalidRepeatCount {
                at: keyword.position(),
            });
            return Flow::Completed;
        };
        for _ in 0..count {
            if self.error {
                break;
            }
            match self.run(&block) {
                Flow::Completed => {}
                flow => return flow,
            }
        }
        Flow::Completed
    }

    fn run_conditional(
        &mut self,
        tokens: &TokenStream,
        cursor: &mut usize,
        keyword: &Token,
        has_else: bool,
    ) -> Flow {
        let context = if has_else { "ifelse" } else { "if" };
        let args = match self.extract_arguments(tokens, cursor, 1) {
            Ok(args) => args,
            Err(ArgsError::NotEnough) => {
                return self.abort(Fault::MissingControlArgument {
                    context: context.into(),
                    expected: "condition",
                    at: keyword.position(),
                });
            }
            Err(ArgsError::Expression) => return Flow::Unwound,
        };
        let (then_block, close) = match tokens.extract_block(*cursor) {
            Ok(ok) => ok,
            Err(error) => return self.abort(block_fault(error, context, keyword.position())),
        };
        *cursor = close;
        let else_block = if has_else {
            let (block, close) = match tokens.extract_block(*cursor) {
                Ok(ok) => ok,
                Err(error) => return self.abort(block_fault(error, context, keyword.position())),
            };
            *cursor = close;
            Some(block)
        } else {
            None
        };

        let Some(condition) = args[0].as_bool() else {
            self.recover(Fault::NonBooleanCondition {
                context: context.into(),
                at: keyword.position(),
            });
            return Flow::Completed;
        };
        let chosen = if condition {
            Some(&then_block)
        } else {
            else_block.as_ref()
        };
        match chosen {
            Some(block) if !self.error => self.run(block),
            _ => Flow::Completed,
        }
    }

    fn run_command(
        &mut self,
        tokens: &TokenStream,
        cursor: &mut usize,
        token: &Token,
        command: Command,
    ) -> Flow {
        let args = match self.extract_arguments(tokens, cursor, command.arity) {
            Ok(args) => args,
            Err(ArgsError::NotEnough) => {
                self.recover(Fault::NotEnoughArguments {
                    context: token.text.clone(),
                    at: token.position(),
                });
                return Flow::Completed;
            }
            Err(ArgsError::Expression) => return Flow::Unwound,
        };
        // Arguments are validated even once the error flag is set, but
        // execution is suppressed.
        if self.error {
            return Flow::Completed;
        }
        match command.kind {
            CommandKind::Host(handler) => {
                if let Err(error) = handler.as_ref()(&args) {
                    self.recover(Fault::PrimitiveFailed {
                        context: token.text.clone(),
                        message: error.message,
                        at: token.position(),
                    });
                }
                Flow::Completed
            }
            CommandKind::Make => {
                if let Err(message) = self.make(&args) {
                    self.recover(Fault::PrimitiveFailed {
                        context: token.text.clone(),
                        message,
                        at: token.position(),
                    });
                }
                Flow::Completed
            }
            CommandKind::Stop => Flow::Stopped,
        }
    }

    fn make(&mut self, args: &[Value]) -> Result<(), String> {
        let name = args[0]
            .as_text()
            .ok_or_else(|| "cannot make number as variable name".to_string())?;
        if !is_valid_name(name) {
            return Err("invalid identifier as variable name".into());
        }
        self.chain.define_global(args[1].with_name(name));
        Ok(())
    }

    fn run_procedure(
        &mut self,
        tokens: &TokenStream,
        cursor: &mut usize,
        token: &Token,
        procedure: Procedure,
    ) -> Flow {
        let args = match self.extract_arguments(tokens, cursor, procedure.params.len()) {
            Ok(args) => args,
            Err(ArgsError::NotEnough) => {
                self.recover(Fault::NotEnoughArguments {
                    context: token.text.clone(),
                    at: token.position(),
                });
                return Flow::Completed;
            }
            Err(ArgsError::Expression) => return Flow::Unwound,
        };

        let mut scope = Scope::new();
        for (param, value) in procedure.params.iter().zip(&args) {
            scope.insert(value.with_name(param));
        }
        self.chain.push(scope);
        let flow = if self.error {
            Flow::Completed
        } else {
            self.run(&procedure.body)
        };
        self.chain.pop();

        match flow {
            // The stop signal unwinds exactly to this invocation.
            Flow::Stopped => Flow::Completed,
            other => other,
        }
    }

    fn define_procedure(
        &mut self,
        tokens: &TokenStream,
        cursor: &mut usize,
        keyword: &Token,
    ) -> Flow {
        let start = *cursor;

        // Find the matching `end`, counting nested `to`s.
        let mut nested: Option<Position> = None;
        let mut depth = 0usize;
        let mut index = start + 1;
        let end_index = loop {
            match tokens.get(index) {
                None => break None,
                Some(t) if t.kind == TokenKind::Eof => break None,
                Some(t) if t.is_word("to") => {
                    depth += 1;
                    if nested.is_none() {
                        nested = Some(t.position());
                    }
                }
                Some(t) if t.is_word("end") => {
                    if depth == 0 {
                        break Some(index);
                    }
                    depth -= 1;
                }
                Some(_) => {}
            }
            index += 1;
        };
        let Some(end_index) = end_index else {
            return self.abort(Fault::UnterminatedDefinition {
                at: keyword.position(),
            });
        };
        if let Some(at) = nested {
            return self.abort(Fault::NestedDefinition { at });
        }

        if start > tokens.start_index() {
            match tokens.get(start - 1) {
                Some(prev) if prev.kind == TokenKind::Newline => {}
                _ => {
                    return self.abort(Fault::DefinitionNotAtLineStart {
                        at: keyword.position(),
                    });
                }
            }
        }

        let name_index = start + 1;
        let name_token = match tokens.get(name_index) {
            Some(t)
                if name_index < end_index
                    && t.kind == TokenKind::Identifier
                    && !is_keyword(&t.text) =>
            {
                t.clone()
            }
            Some(t) => {
                return self.abort(Fault::InvalidProcedureName {
                    name: t.text.clone(),
                    at: t.position(),
                });
            }
            None => {
                return self.abort(Fault::InvalidProcedureName {
                    name: String::new(),
                    at: keyword.position(),
                });
            }
        };
        if self.registry.is_command(&name_token.text) {
            // The definition is dropped and the built-in stays callable;
            // scanning resumes after `end`.
            self.recover(Fault::OverwritePrimitive {
                name: name_token.text.clone(),
                at: name_token.position(),
            });
            *cursor = end_index;
            return Flow::Completed;
        }

        let mut params: Vec<String> = Vec::new();
        let mut index = name_index + 1;
        while let Some(token) = tokens.get(index) {
            if token.kind != TokenKind::Variable {
                break;
            }
            let param = token.text.to_lowercase();
            if params.contains(&param) {
                return self.abort(Fault::DuplicateParameter {
                    name: param,
                    at: token.position(),
                });
            }
            params.push(param);
            index += 1;
        }

        // A line break must follow the parameters, and `end` must sit
        // alone on a fresh line.
        let end_position = tokens
            .get(end_index)
            .map(Token::position)
            .unwrap_or_default();
        if index == end_index
            || tokens.get(end_index - 1).map(|t| t.kind) != Some(TokenKind::Newline)
        {
            return self.abort(Fault::EndNotAtLineStart { at: end_position });
        }
        match tokens.get(index) {
            Some(t) if t.kind == TokenKind::Newline => {}
            Some(t) => {
                return self.abort(Fault::DefinitionSyntax {
                    kind: t.kind,
                    text: t.text.clone(),
                    at: t.position(),
                });
            }
            None => return self.abort(Fault::EndNotAtLineStart { at: end_position }),
        }
        match tokens.get(end_index + 1) {
            None => {}
            Some(t) if matches!(t.kind, TokenKind::Newline | TokenKind::Eof) => {}
            Some(t) => {
                return self.abort(Fault::DefinitionSyntax {
                    kind: t.kind,
                    text: t.text.clone(),
                    at: t.position(),
                });
            }
        }

        self.registry.define_procedure(Procedure {
            name: name_token.text.to_lowercase(),
            params,
            body: tokens.slice(index + 1, end_index),
        });
        *cursor = end_index;
        Flow::Completed
    }
}

fn is_expression_token(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Variable
            | TokenKind::QuotedString
            | TokenKind::Operator
    )
}

/// After a closing paren, these begin a new expression rather than
/// continuing the current one.
fn starts_new_expression(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Integer | TokenKind::Float | TokenKind::Variable | TokenKind::QuotedString
    ) || (token.kind == TokenKind::Operator && token.text == "(")
}

/// A repeat count must round (ties to even) to a positive integer within
/// 0.01 of the original.
fn repeat_count(value: &Value) -> Option<i64> {
    let count = value.as_double()?;
    let rounded = count.round_ties_even();
    if (rounded - count).abs() > 0.01 {
        return None;
    }
    let n = rounded as i64;
    (n > 0).then_some(n)
}

fn block_fault(error: BlockError, context: &str, keyword_at: Position) -> Fault {
    match error {
        BlockError::NotFound { .. } => Fault::BlockNotFound {
            context: context.into(),
            at: keyword_at,
        },
        BlockError::Unclosed { at } => Fault::UnclosedBlock {
            context: context.into(),
            at,
        },
        BlockError::NestedProcedure { keyword, at } => Fault::NestedProcedure { keyword, at },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_count_validation() {
        assert_eq!(repeat_count(&Value::double("n", 4.0)), Some(4));
        assert_eq!(repeat_count(&Value::double("n", 3.999)), Some(4));
        assert_eq!(repeat_count(&Value::double("n", 2.5)), None);
        assert_eq!(repeat_count(&Value::double("n", 0.0)), None);
        assert_eq!(repeat_count(&Value::double("n", -3.0)), None);
        assert_eq!(repeat_count(&Value::text("n", "4")), None);
    }
}
