//! Evaluates one captured token run into a Value.
//!
//! Grammar, loosest to tightest: `xor`, `or`, `and`, `not`, comparison
//! (`= <> < > <= >=`), additive, multiplicative, unary sign, `^`;
//! left-to-right within a level. The comparison digraphs are assembled
//! from adjacent single-character operator tokens. Faults carry the run's
//! starting position, except undefined variables which are reported per
//! occurrence.

use crate::diagnostic::Position;
use crate::token::{Token, TokenKind};
use crate::value::Value;

use super::environment::ScopeChain;
use super::error::Fault;

const FUNCTION_WORDS: &[&str] = &[
    "sin", "cos", "tan", "cot", "abs", "round", "sqrt", "pow", "floor", "ceiling", "exp", "log",
    "log10",
];

fn is_function_word(text: &str) -> bool {
    FUNCTION_WORDS.iter().any(|word| text.eq_ignore_ascii_case(word))
}

/// Intermediate result before classification into a Value.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalError {
    /// Malformed structure: dangling operator, unbalanced parens, unknown
    /// function, wrong arity.
    Syntax,
    /// Structurally fine but ill-typed: arithmetic on text, boolean ops on
    /// numbers, a non-numeric non-boolean result.
    Invalid,
}

type Eval = Result<Operand, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Evaluate a token run against the scope chain, binding the result to
/// `name`. Undefined variables are all collected before failing; every
/// other fault is singular.
pub fn evaluate(run: &[Token], chain: &ScopeChain, name: &str) -> Result<Value, Vec<Fault>> {
    let missing: Vec<Fault> = run
        .iter()
        .filter(|t| t.kind == TokenKind::Variable && !chain.contains(&t.text))
        .map(|t| Fault::UndefinedVariable {
            name: t.text.clone(),
            at: t.position(),
        })
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let Some(first) = run.first() else {
        return Err(vec![Fault::ExpressionSyntax {
            at: Position::default(),
        }]);
    };
    let start = first.position();

    // Single-token fast path: a variable or string yields its Value
    // directly, re-bound to the target name.
    if run.len() == 1 {
        match first.kind {
            TokenKind::Variable => {
                if let Some(value) = chain.resolve(&first.text) {
                    return Ok(value.with_name(name));
                }
            }
            TokenKind::QuotedString => return Ok(Value::text(name, first.text.clone())),
            _ => {}
        }
    }

    let mut parser = ExprParser {
        run,
        index: 0,
        chain,
    };
    let parsed = parser.expression().and_then(|operand| {
        if parser.index < run.len() {
            Err(EvalError::Syntax)
        } else {
            Ok(operand)
        }
    });

    let operand = match parsed {
        Ok(operand) => operand,
        Err(EvalError::Syntax) => return Err(vec![Fault::ExpressionSyntax { at: start }]),
        Err(EvalError::Invalid) => return Err(vec![Fault::InvalidExpression { at: start }]),
    };
    classify(operand, name, start)
}

/// A boolean result (or the reserved boolean texts) becomes a Text
/// boolean; anything else must end up a finite double.
fn classify(operand: Operand, name: &str, start: Position) -> Result<Value, Vec<Fault>> {
    match operand {
        Operand::Bool(value) => Ok(Value::boolean(name, value)),
        Operand::Number(value) if value.is_finite() => Ok(Value::double(name, value)),
        Operand::Number(_) => Err(vec![Fault::DivisionByZero { at: start }]),
        Operand::Text(text) => {
            if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
                Ok(Value::boolean(name, text.eq_ignore_ascii_case("true")))
            } else {
                match text.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() => Ok(Value::double(name, value)),
                    _ => Err(vec![Fault::InvalidExpression { at: start }]),
                }
            }
        }
    }
}

struct ExprParser<'a> {
    run: &'a [Token],
    index: usize,
    chain: &'a ScopeChain,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.run.get(self.index)
    }

    fn peek_op(&self) -> Option<&'a str> {
        match self.run.get(self.index) {
            Some(t) if t.kind == TokenKind::Operator => Some(t.text.as_str()),
            _ => None,
        }
    }

    fn bump(&mut self) {
        self.index += 1;
    }

    fn eat_op(&mut self, op: &str) -> bool {
        match self.peek_op() {
            Some(text) if text.eq_ignore_ascii_case(op) => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn expression(&mut self) -> Eval {
        self.xor()
    }

    fn xor(&mut self) -> Eval {
        let mut left = self.or()?;
        while self.eat_op("xor") {
            let right = self.or()?;
            left = match (left, right) {
                (Operand::Bool(a), Operand::Bool(b)) => Operand::Bool(a ^ b),
                _ => return Err(EvalError::Invalid),
            };
        }
        Ok(left)
    }

    fn or(&mut self) -> Eval {
        let mut left = self.and()?;
        while self.eat_op("or") {
            let right = self.and()?;
            left = match (left, right) {
                (Operand::Bool(a), Operand::Bool(b)) => Operand::Bool(a || b),
                _ => return Err(EvalError::Invalid),
            };
        }
        Ok(left)
    }

    fn and(&mut self) -> Eval {
        let mut left = self.not()?;
        while self.eat_op("and") {
            let right = self.not()?;
            left = match (left, right) {
                (Operand::Bool(a), Operand::Bool(b)) => Operand::Bool(a && b),
                _ => return Err(EvalError::Invalid),
            };
        }
        Ok(left)
    }

    fn not(&mut self) -> Eval {
        if self.eat_op("not") {
            match self.not()? {
                Operand::Bool(value) => Ok(Operand::Bool(!value)),
                _ => Err(EvalError::Invalid),
            }
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> Eval {
        let mut left = self.additive()?;
        while let Some(op) = self.comparison_op() {
            let right = self.additive()?;
            left = compare(left, right, op)?;
        }
        Ok(left)
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek_op()? {
            "=" => {
                self.bump();
                CmpOp::Eq
            }
            "<" => {
                self.bump();
                match self.peek_op() {
                    Some(">") => {
                        self.bump();
                        CmpOp::Ne
                    }
                    Some("=") => {
                        self.bump();
                        CmpOp::Le
                    }
                    _ => CmpOp::Lt,
                }
            }
            ">" => {
                self.bump();
                match self.peek_op() {
                    Some("=") => {
                        self.bump();
                        CmpOp::Ge
                    }
                    _ => CmpOp::Gt,
                }
            }
            _ => return None,
        };
        Some(op)
    }

    fn additive(&mut self) -> Eval {
        let mut left = self.multiplicative()?;
        loop {
            if self.eat_op("+") {
                let (a, b) = numeric(left, self.multiplicative()?)?;
                left = Operand::Number(a + b);
            } else if self.eat_op("-") {
                let (a, b) = numeric(left, self.multiplicative()?)?;
                left = Operand::Number(a - b);
            } else {
                return Ok(left);
            }
        }
    }

    fn multiplicative(&mut self) -> Eval {
        let mut left = self.unary()?;
        loop {
            if self.eat_op("*") {
                let (a, b) = numeric(left, self.unary()?)?;
                left = Operand::Number(a * b);
            } else if self.eat_op("/") {
                let (a, b) = numeric(left, self.unary()?)?;
                left = Operand::Number(a / b);
            } else if self.eat_op("%") {
                let (a, b) = numeric(left, self.unary()?)?;
                left = Operand::Number(a % b);
            } else {
                return Ok(left);
            }
        }
    }

    // Recursive sign handling absorbs redundant sign runs: `3+-2`, `3 - -2`
    // and `--5` all read as expected.
    fn unary(&mut self) -> Eval {
        if self.eat_op("-") {
            match self.unary()? {
                Operand::Number(value) => Ok(Operand::Number(-value)),
                _ => Err(EvalError::Invalid),
            }
        } else if self.eat_op("+") {
            match self.unary()? {
                Operand::Number(value) => Ok(Operand::Number(value)),
                _ => Err(EvalError::Invalid),
            }
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Eval {
        let mut left = self.primary()?;
        while self.eat_op("^") {
            // The exponent admits a sign of its own: 2^-3.
            let (a, b) = numeric(left, self.unary()?)?;
            left = Operand::Number(a.powf(b));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Eval {
        let token = self.peek().ok_or(EvalError::Syntax)?;
        match token.kind {
            TokenKind::Integer | TokenKind::Float => {
                self.bump();
                token
                    .text
                    .parse::<f64>()
                    .map(Operand::Number)
                    .map_err(|_| EvalError::Syntax)
            }
            TokenKind::QuotedString => {
                self.bump();
                Ok(Operand::Text(token.text.clone()))
            }
            TokenKind::Variable => {
                self.bump();
                match self.chain.resolve(&token.text) {
                    Some(Value::Double { value, .. }) => Ok(Operand::Number(*value)),
                    Some(Value::Text { value, .. }) => Ok(Operand::Text(value.clone())),
                    // Resolution was pre-checked; a miss here is malformed.
                    None => Err(EvalError::Syntax),
                }
            }
            TokenKind::Operator if token.text == "(" => {
                self.bump();
                let inner = self.expression()?;
                if self.eat_op(")") {
                    Ok(inner)
                } else {
                    Err(EvalError::Syntax)
                }
            }
            TokenKind::Operator if is_function_word(&token.text) => {
                let name = token.text.clone();
                self.bump();
                self.function(&name)
            }
            _ => Err(EvalError::Syntax),
        }
    }

    fn function(&mut self, name: &str) -> Eval {
        if !self.eat_op("(") {
            return Err(EvalError::Syntax);
        }
        let mut args = vec![self.expression()?];
        while self.eat_op(",") {
            args.push(self.expression()?);
        }
        if !self.eat_op(")") {
            return Err(EvalError::Syntax);
        }
        apply_function(name, &args)
    }
}

fn numeric(left: Operand, right: Operand) -> Result<(f64, f64), EvalError> {
    match (left, right) {
        (Operand::Number(a), Operand::Number(b)) => Ok((a, b)),
        _ => Err(EvalError::Invalid),
    }
}

fn compare(left: Operand, right: Operand, op: CmpOp) -> Eval {
    let result = match (&left, &right) {
        (Operand::Number(a), Operand::Number(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Gt => a > b,
            CmpOp::Le => a <= b,
            CmpOp::Ge => a >= b,
        },
        (Operand::Text(a), Operand::Text(b)) => match op {
            CmpOp::Eq => a.eq_ignore_ascii_case(b),
            CmpOp::Ne => !a.eq_ignore_ascii_case(b),
            _ => return Err(EvalError::Invalid),
        },
        (Operand::Bool(a), Operand::Bool(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            _ => return Err(EvalError::Invalid),
        },
        _ => return Err(EvalError::Invalid),
    };
    Ok(Operand::Bool(result))
}

fn apply_function(name: &str, args: &[Operand]) -> Eval {
    fn unary(args: &[Operand]) -> Result<f64, EvalError> {
        match args {
            [Operand::Number(n)] => Ok(*n),
            [_] => Err(EvalError::Invalid),
            _ => Err(EvalError::Syntax),
        }
    }

    let value = match name.to_ascii_lowercase().as_str() {
        "sin" => unary(args)?.sin(),
        "cos" => unary(args)?.cos(),
        "tan" => unary(args)?.tan(),
        "cot" => {
            let n = unary(args)?;
            n.cos() / n.sin()
        }
        "abs" => unary(args)?.abs(),
        "round" => unary(args)?.round_ties_even(),
        "sqrt" => unary(args)?.sqrt(),
        "floor" => unary(args)?.floor(),
        "ceiling" => unary(args)?.ceil(),
        "exp" => unary(args)?.exp(),
        "log" => unary(args)?.ln(),
        "log10" => unary(args)?.log10(),
        "pow" => match args {
            [Operand::Number(base), Operand::Number(exp)] => base.powf(*exp),
            [_, _] => return Err(EvalError::Invalid),
            _ => return Err(EvalError::Syntax),
        },
        _ => return Err(EvalError::Syntax),
    };
    Ok(Operand::Number(value))
}
