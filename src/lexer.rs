use std::fmt;

use chumsky::prelude::*;

use crate::diagnostic::Position;
use crate::token::{Token, TokenKind};

/// Identifier-shaped words the lexer reclassifies as Operator tokens:
/// boolean connectives and the expression function names.
pub const OPERATOR_WORDS: &[&str] = &[
    "and", "or", "not", "xor", "sin", "cos", "tan", "cot", "abs", "round", "sqrt", "pow", "floor",
    "ceiling", "exp", "log", "log10",
];

pub fn is_operator_word(text: &str) -> bool {
    OPERATOR_WORDS.iter().any(|word| text.eq_ignore_ascii_case(word))
}

/// The one fatal lexing condition: a quoted literal interrupted by a raw
/// newline or end of input. Carries the literal's starting position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    BadQuote { position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::BadQuote { position } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::BadQuote { position } => {
                write!(f, "Bad quoted string @ {}", position)
            }
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone, PartialEq)]
enum RawToken {
    Ident(String),
    Int(String),
    Float(String),
    Str(String),
    Var(String),
    Op(String),
    LeftBracket,
    RightBracket,
    Newline,
    Unknown(String),
    BadQuote,
}

fn raw_lexer<'a>()
-> impl Parser<'a, &'a str, Vec<(RawToken, SimpleSpan)>, extra::Err<Simple<'a, char>>> {
    let newline = choice((just("\r\n"), just("\r"), just("\n"))).to(RawToken::Newline);

    // DIGIT+ ("." DIGIT*)? or "." DIGIT+; at most one decimal point, and a
    // point makes it a Float.
    let number = choice((
        text::digits(10)
            .then(just('.').then(text::digits(10).or_not()).or_not())
            .to_slice(),
        just('.').then(text::digits(10)).to_slice(),
    ))
    .map(|s: &str| {
        if s.contains('.') {
            RawToken::Float(s.to_string())
        } else {
            RawToken::Int(s.to_string())
        }
    });

    // `\"` and `\\` escape; a backslash before anything else stays literal.
    let escape = just('\\')
        .ignore_then(one_of("\\\""))
        .or(just('\\').to('\\'));
    let closed_char = escape.clone().or(none_of("\"\n"));
    let word_char = escape.or(none_of("\"\n\r \t"));

    // A literal ends at a closing quote, or Logo-style at a space/tab
    // boundary (not consumed). A newline or EOF inside it is a bad quote.
    let closed_string = just('"')
        .ignore_then(closed_char.clone().repeated().collect::<String>())
        .then_ignore(just('"'))
        .map(RawToken::Str);
    let word_string = just('"')
        .ignore_then(word_char.repeated().collect::<String>())
        .then_ignore(one_of(" \t").rewind())
        .map(RawToken::Str);
    let bad_quote = just('"')
        .ignore_then(closed_char.repeated())
        .to(RawToken::BadQuote);
    let string = closed_string.or(word_string).or(bad_quote);

    let variable = just(':')
        .ignore_then(text::ident())
        .map(|s: &str| RawToken::Var(s.to_string()));

    let ident = text::ident().map(|s: &str| {
        if is_operator_word(s) {
            RawToken::Op(s.to_string())
        } else {
            RawToken::Ident(s.to_string())
        }
    });

    let op = one_of("+-*/()<=>,^%").map(|c: char| RawToken::Op(c.to_string()));
    let bracket = just('[')
        .to(RawToken::LeftBracket)
        .or(just(']').to(RawToken::RightBracket));

    let comment = just(';').then(none_of("\r\n").repeated()).ignored();
    let inline_ws = one_of(" \t").ignored().or(comment).repeated();

    let token = choice((newline, number, string, variable, ident, op, bracket))
        .or(any().map(|c: char| RawToken::Unknown(c.to_string())))
        .map_with(|token, extra| (token, extra.span()))
        .padded_by(inline_ws);

    token.repeated().collect().then_ignore(end())
}

/// Walks the source once, translating ascending byte offsets into 1-based
/// line/column positions.
struct PositionWalker<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> PositionWalker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn advance_to(&mut self, target: usize) -> Position {
        while let Some(&(offset, c)) = self.chars.peek() {
            if offset >= target {
                break;
            }
            self.chars.next();
            match c {
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                '\r' => {
                    if let Some(&(_, '\n')) = self.chars.peek() {
                        self.chars.next();
                    }
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.column += 1,
            }
        }
        Position::new(self.line, self.column)
    }
}

/// Lex the whole program. The returned sequence always ends with exactly
/// one Eof token; stray characters become Unknown tokens for the
/// interpreter to report, and only a bad quote aborts lexing.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let raw = raw_lexer().parse(source).into_output().unwrap_or_default();

    let mut walker = PositionWalker::new(source);
    let mut tokens = Vec::with_capacity(raw.len() + 1);
    for (token, span) in raw {
        let position = walker.advance_to(span.start);
        let (kind, text) = match token {
            RawToken::Ident(text) => (TokenKind::Identifier, text),
            RawToken::Int(text) => (TokenKind::Integer, text),
            RawToken::Float(text) => (TokenKind::Float, text),
            RawToken::Str(text) => (TokenKind::QuotedString, text),
            RawToken::Var(text) => (TokenKind::Variable, text),
            RawToken::Op(text) => (TokenKind::Operator, text),
            RawToken::LeftBracket => (TokenKind::LeftBracket, "[".to_string()),
            RawToken::RightBracket => (TokenKind::RightBracket, "]".to_string()),
            RawToken::Newline => (TokenKind::Newline, String::new()),
            RawToken::Unknown(text) => (TokenKind::Unknown, text),
            RawToken::BadQuote => return Err(LexError::BadQuote { position }),
        };
        tokens.push(Token::new(kind, text, position.line, position.column));
    }
    let end = walker.advance_to(source.len());
    tokens.push(Token::new(TokenKind::Eof, "", end.line, end.column));
    Ok(tokens)
}
